//! Fenced code tracking for the line scanner.
//!
//! Component tags inside fenced code are literal text, so the scanner feeds
//! every line through a [`FenceTracker`] before trying to recognize tags.

use crate::block::strip_block_indent;

/// An open code fence.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

/// Tracks whether the scanner is inside fenced code.
///
/// Follows the `CommonMark` fence rules: three or more backticks or tildes
/// open a fence (a backtick info string may not contain backticks), and the
/// fence closes on a line of the same character, at least as long, followed
/// only by whitespace. Fence lines are indented at most three columns; deeper
/// ones are indented code.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed the next line.
    ///
    /// Returns `true` if the line belongs to fenced code, including the
    /// opening and closing fence lines themselves.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        let content = strip_block_indent(line);
        match self.open {
            Some(fence) => {
                if content.is_some_and(|text| closes(text, fence)) {
                    self.open = None;
                }
                true
            }
            None => {
                self.open = content.and_then(opening_fence);
                self.open.is_some()
            }
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Forget an open fence whose enclosing container has ended.
    pub(crate) fn reset(&mut self) {
        self.open = None;
    }
}

fn run_length(text: &str, marker: char) -> usize {
    text.chars().take_while(|&c| c == marker).count()
}

fn opening_fence(trimmed: &str) -> Option<Fence> {
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = run_length(trimmed, marker);
    if len < 3 {
        return None;
    }
    // Markers are ASCII, so `len` is also the byte length
    if marker == '`' && trimmed[len..].contains('`') {
        return None;
    }
    Some(Fence { marker, len })
}

fn closes(trimmed: &str, fence: Fence) -> bool {
    let len = run_length(trimmed, fence.marker);
    len >= fence.len && trimmed[len..].trim().is_empty()
}
