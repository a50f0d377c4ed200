//! Block structure helpers for the line scanner.
//!
//! Tags are only recognized at the start of a block. Inside block quotes and
//! list items that start is found after the container markers, so the scanner
//! keeps a [`ContainerStack`] and matches tags against what remains of each
//! line.

/// Remove up to three columns of indentation.
///
/// Returns `None` for lines indented four or more columns (indented code).
pub(crate) fn strip_block_indent(line: &str) -> Option<&str> {
    let mut columns = 0;
    for (offset, ch) in line.char_indices() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += 4 - columns % 4,
            _ => return Some(&line[offset..]),
        }
        if columns > 3 {
            return None;
        }
    }
    Some("")
}

/// Remove at least `columns` columns of leading whitespace.
///
/// A tab that straddles the limit is consumed whole. Returns `None` if the
/// line is indented less than `columns`.
fn strip_columns(line: &str, columns: usize) -> Option<&str> {
    let mut seen = 0;
    for (offset, ch) in line.char_indices() {
        if seen >= columns {
            return Some(&line[offset..]);
        }
        match ch {
            ' ' => seen += 1,
            '\t' => seen += 4 - seen % 4,
            _ => return None,
        }
    }
    (seen >= columns).then_some("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Quote,
    /// List item whose content starts `indent` columns in.
    Item { indent: usize },
}

impl Container {
    /// The rest of `line` if it continues this container.
    fn continues<'a>(self, line: &'a str) -> Option<&'a str> {
        match self {
            Self::Quote => quote_marker(line),
            Self::Item { indent } => {
                if line.trim().is_empty() {
                    Some("")
                } else {
                    strip_columns(line, indent)
                }
            }
        }
    }
}

/// Block quotes and list items enclosing the current line, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ContainerStack {
    open: Vec<Container>,
}

impl ContainerStack {
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    /// Match `line` against the open containers and close the ones it does
    /// not continue. Returns the text after the matched prefixes.
    pub(crate) fn continue_line<'a>(&mut self, line: &'a str) -> &'a str {
        let mut rest = line;
        for (depth, container) in self.open.iter().enumerate() {
            match container.continues(rest) {
                Some(inner) => rest = inner,
                None => {
                    self.open.truncate(depth);
                    break;
                }
            }
        }
        rest
    }

    /// Open the containers whose markers start `text`. Returns the text after
    /// the markers.
    pub(crate) fn open_new<'a>(&mut self, text: &'a str) -> &'a str {
        let mut rest = text;
        loop {
            if let Some(inner) = quote_marker(rest) {
                self.open.push(Container::Quote);
                rest = inner;
            } else if let Some((inner, indent)) = list_marker(rest) {
                self.open.push(Container::Item { indent });
                rest = inner;
            } else {
                return rest;
            }
        }
    }

    /// Strip the prefixes of all open containers without changing the stack.
    ///
    /// Returns `None` if `line` falls outside any of them.
    pub(crate) fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.open
            .iter()
            .try_fold(line, |rest, container| container.continues(rest))
    }

    /// The leading lines of `lines` that stay inside all open containers,
    /// with their prefixes removed.
    pub(crate) fn section<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        lines.iter().map_while(|&line| self.strip(line)).collect()
    }
}

/// Text after a `>` marker and its optional following space.
fn quote_marker(line: &str) -> Option<&str> {
    let rest = strip_block_indent(line)?.strip_prefix('>')?;
    Some(
        rest.strip_prefix(' ')
            .or_else(|| rest.strip_prefix('\t'))
            .unwrap_or(rest),
    )
}

/// Text after a list item marker, with the item's content indent.
fn list_marker(line: &str) -> Option<(&str, usize)> {
    let content = strip_block_indent(line)?;
    if is_thematic_break(content) {
        return None;
    }
    let leading = line.len() - content.len();
    let digits = content.bytes().take_while(u8::is_ascii_digit).count();
    let width = match content.as_bytes().first()? {
        b'-' | b'*' | b'+' => 1,
        _ if (1..=9).contains(&digits)
            && matches!(content.as_bytes().get(digits), Some(b'.' | b')')) =>
        {
            digits + 1
        }
        _ => return None,
    };
    let after = &content[width..];
    if after.trim().is_empty() {
        return Some(("", leading + width + 1));
    }
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    let spaces = after.len() - after.trim_start_matches(' ').len();
    if after.starts_with('\t') || spaces > 4 {
        // Indented code starts the item; its content indent is one column in.
        return Some((&after[1..], leading + width + 1));
    }
    Some((&after[spaces..], leading + width + spaces))
}

/// A line of three or more `-`, `*` or `_` (and nothing else but spaces).
fn is_thematic_break(content: &str) -> bool {
    let Some(marker) = content.chars().next().filter(|c| matches!(c, '-' | '*' | '_')) else {
        return false;
    };
    let mut count = 0;
    for ch in content.chars() {
        match ch {
            c if c == marker => count += 1,
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    count >= 3
}
