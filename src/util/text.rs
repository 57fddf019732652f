use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Elements whose content is never readable text.
const DROPPED_BLOCKS: &[&str] = &["script", "style"];

/// Calculates the display width of a string in terminal columns.
///
/// CJK characters and most emoji count as two columns.
///
/// ```
/// use dailynews::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("요약"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Turns an HTML fragment from a feed summary into plain text.
///
/// - `<script>` and `<style>` blocks are removed with their content
/// - every other tag becomes a word break
/// - HTML entities are decoded
/// - control characters are dropped
/// - whitespace runs collapse to a single space and the ends are trimmed
///
/// ```
/// use dailynews::util::clean_html;
///
/// assert_eq!(clean_html("<p>Hello&nbsp;<b>world</b></p>\n<p>again</p>"), "Hello world again");
/// ```
pub fn clean_html(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let without_blocks = drop_blocks(input);

    let mut text = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    let mut chars = without_blocks.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // A bare `<` (as in `1 < 2`) is text, not a tag opener.
            '<' if !in_tag && chars.peek().is_some_and(|&next| starts_tag(next)) => {
                in_tag = true
            }
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = html_escape::decode_html_entities(&text);
    collapse_whitespace(&decoded)
}

fn starts_tag(ch: char) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, '/' | '!' | '?')
}

/// Collapses whitespace runs (including non-breaking spaces) to one space,
/// drops control characters, and trims the result.
pub fn collapse_whitespace(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace())
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes `<script>...</script>` and `<style>...</style>` blocks,
/// case-insensitively. An unterminated block runs to the end of the input.
fn drop_blocks(input: &str) -> String {
    let mut buf = input.to_string();
    for tag in DROPPED_BLOCKS {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        loop {
            // ASCII lowercasing keeps byte offsets aligned with `buf`.
            let lower = buf.to_ascii_lowercase();
            let Some(start) = lower.find(&open) else {
                break;
            };
            let end = lower[start..]
                .find(&close)
                .map(|rel| start + rel + close.len())
                .unwrap_or(buf.len());
            buf.replace_range(start..end, " ");
        }
    }
    buf
}

/// Greedy word wrap by display width.
///
/// Words are separated by whitespace and joined with single spaces. A word
/// wider than `width` is broken across lines. Empty input yields no lines.
///
/// ```
/// use dailynews::util::wrap_text;
///
/// assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
/// assert!(wrap_text("   ", 80).is_empty());
/// ```
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = display_width(word);

        if word_width > width {
            // Fill the current line first, then hard-break the rest.
            let mut remaining_space = if line.is_empty() {
                width
            } else {
                width.saturating_sub(line_width + 1)
            };
            if !line.is_empty() && remaining_space > 0 {
                line.push(' ');
                line_width += 1;
            }
            for ch in word.chars() {
                let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                if ch_width > remaining_space && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                    remaining_space = width;
                }
                line.push(ch);
                line_width += ch_width;
                remaining_space = remaining_space.saturating_sub(ch_width);
            }
            continue;
        }

        if line.is_empty() {
            line.push_str(word);
            line_width = word_width;
        } else if line_width + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_width = word_width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
