//! Typewriter reveal of a complete reply.
//!
//! A reply that arrived in one piece is shown in roughly [`REVEAL_SLICES`]
//! equal character slices, one per [`REVEAL_TICK`]. Purely presentational:
//! the slices always concatenate back to the full reply.

use std::time::Duration;

pub const REVEAL_SLICES: usize = 60;
pub const REVEAL_TICK: Duration = Duration::from_millis(16);

/// Characters per slice for a reply of `char_count` characters.
#[must_use]
pub fn step_for(char_count: usize) -> usize {
    (char_count / REVEAL_SLICES).max(1)
}

/// Split `text` into consecutive slices of [`step_for`] characters each.
/// Slices never split a character.
#[must_use]
pub fn slices(text: &str) -> Vec<&str> {
    let step = step_for(text.chars().count());
    let mut out = Vec::new();
    let mut start = 0;
    let mut taken = 0;
    for (index, _) in text.char_indices() {
        if taken == step {
            out.push(&text[start..index]);
            start = index;
            taken = 0;
        }
        taken += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
#[path = "reveal_test.rs"]
mod tests;
