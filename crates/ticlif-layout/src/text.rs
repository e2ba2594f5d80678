#![forbid(unsafe_code)]

//! Flowing text into fixed-width rows.
//!
//! Content is rendered in three steps: tabs are expanded to two-column tab
//! stops, the result is split into lines, and every line is hard-wrapped at
//! the element width with the final piece padded with spaces. Widths are
//! counted in `char`s; display width is not considered.

/// Tab stop distance used when rendering element content.
pub const TAB_SIZE: usize = 2;

/// Whether `c` ends a line.
///
/// This is the full set of line boundaries recognized by
/// [`split_lines`]; `\r\n` is treated as a single boundary.
#[must_use]
pub const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'
            | '\u{1D}'
            | '\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split `text` into lines.
///
/// A trailing line break does not produce an empty final line, and empty
/// input yields no lines at all.
///
/// ```
/// use ticlif_layout::text::split_lines;
///
/// assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b"]);
/// assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
/// assert!(split_lines("").is_empty());
/// ```
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        let mut end = idx + c.len_utf8();
        if c == '\r'
            && let Some(&(next_idx, '\n')) = chars.peek()
        {
            chars.next();
            end = next_idx + 1;
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Replace every tab with enough spaces to reach the next multiple of
/// `tab_size`. The column resets after `\n` and `\r`.
#[must_use]
pub fn expand_tabs(text: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for c in text.chars() {
        match c {
            '\t' => {
                if tab_size > 0 {
                    let fill = tab_size - column % tab_size;
                    out.extend(std::iter::repeat_n(' ', fill));
                    column += fill;
                }
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Pad `line` with spaces, or cut it, so it is exactly `width` chars long.
#[must_use]
pub fn fit_width(line: &str, width: usize) -> String {
    let mut out: String = line.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Flow `text` into rows of exactly `width` characters.
///
/// Every input line contributes at least one row. A zero width produces one
/// empty row per line.
///
/// ```
/// use ticlif_layout::text::flow_text;
///
/// assert_eq!(flow_text("abcdefg\nhi", 3), vec!["abc", "def", "g  ", "hi "]);
/// assert_eq!(flow_text("\tx", 4), vec!["  x "]);
/// ```
#[must_use]
pub fn flow_text(text: &str, width: usize) -> Vec<String> {
    let expanded = expand_tabs(text, TAB_SIZE);
    let mut rows = Vec::new();
    for line in split_lines(&expanded) {
        if width == 0 {
            rows.push(String::new());
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        let mut start = 0;
        while start + width < chars.len() {
            rows.push(chars[start..start + width].iter().collect());
            start += width;
        }
        let tail: String = chars[start..].iter().collect();
        rows.push(fit_width(&tail, width));
    }
    rows
}
