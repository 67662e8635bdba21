use super::*;

#[test]
fn renders_basic_markdown() {
    let html = render_markdown_html("**bold** and _it_");
    assert!(html.contains("<strong>bold</strong>"));
    assert!(html.contains("<em>it</em>"));
}

#[test]
fn drops_raw_html() {
    let html = render_markdown_html("<script>alert(1)</script>\n\nhi <b>there</b>");
    assert!(!html.contains("<script"));
    assert!(!html.contains("<b>"));
    assert!(html.contains("there"));
}

#[test]
fn single_newline_is_line_break() {
    let html = render_markdown_html("line one\nline two");
    assert!(html.contains("line one<br />"));
    assert!(html.contains("line two"));
}

#[test]
fn gfm_extensions_enabled() {
    let html = render_markdown_html("~~gone~~\n\n- [x] done\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains(r#"type="checkbox""#));
    assert!(html.contains(r#"<div class="table-wrap"><table>"#));
    assert!(html.contains("</table>\n</div>") || html.contains("</table></div>"));
}

#[test]
fn fenced_code_gets_copy_button() {
    let html = render_markdown_html("```rust\nlet ok = 1 < 2;\n```\n");
    assert!(html.contains(r#"class="language-rust""#));
    assert!(html.contains(r#"data-copy="let ok = 1 &lt; 2;"#));
    assert!(html.contains(">Copy</button>"));
    assert!(html.contains("<pre><code"));
}

#[test]
fn code_block_markdown_is_not_interpreted() {
    let html = render_markdown_html("```\n**not bold**\n```\n");
    assert!(!html.contains("<strong>"));
    assert!(html.contains("**not bold**"));
}

#[test]
fn inline_code_has_no_copy_button() {
    let html = render_markdown_html("use `x` here");
    assert!(html.contains("<code>x</code>"));
    assert!(!html.contains("Copy"));
}

#[test]
fn escape_html_covers_attribute_characters() {
    assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
}

#[test]
fn code_block_copy_payload_is_attribute_safe() {
    let html = render_markdown_html("```html\n<a title=\"x\">it's</a>\n```\n");
    let payload = "data-copy=\"&lt;a title=&quot;x&quot;&gt;it&#39;s&lt;/a&gt;\n\"";
    assert!(html.contains(payload), "{html}");
    assert!(html.contains(r#"<code class="language-html">&lt;a title="#));
    assert!(!html.contains("<a title"));
}
