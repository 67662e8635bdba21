//! Assistant message rendering: markdown to HTML.
//!
//! GitHub-flavoured extensions (tables, strikethrough, task lists) are on.
//! Raw HTML in model output is dropped, single newlines render as `<br />`,
//! and code blocks get a copy button carrying the code as its payload.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

#[must_use]
pub fn render_markdown_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(String, String)> = None;

    for event in Parser::new_ext(markdown, options) {
        match event {
            // Safety: drop inline/block raw HTML from model output before rendering.
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::SoftBreak => events.push(Event::HardBreak),
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or_default().to_owned(),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((lang, String::new()));
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, body)) = code.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, body)) = code.take() {
                    events.push(Event::Html(code_block_html(&lang, &body).into()));
                }
            }
            Event::Start(Tag::Table(alignments)) => {
                events.push(Event::Html(r#"<div class="table-wrap">"#.into()));
                events.push(Event::Start(Tag::Table(alignments)));
            }
            Event::End(TagEnd::Table) => {
                events.push(Event::End(TagEnd::Table));
                events.push(Event::Html("</div>".into()));
            }
            other => events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn code_block_html(lang: &str, body: &str) -> String {
    let escaped = escape_html(body);
    let class = if lang.is_empty() {
        String::new()
    } else {
        format!(r#" class="language-{}""#, escape_html(lang))
    };
    format!(
        r#"<div class="code-block"><button type="button" class="copy" title="Copy code" data-copy="{escaped}">Copy</button><pre><code{class}>{escaped}</code></pre></div>"#
    )
}

/// Escape for text and double-quoted attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;
