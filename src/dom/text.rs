//! Text extraction helpers

use scraper::ElementRef;

use super::is_hidden;

/// Tags whose text never reads as part of a turn.
const SKIPPED_TAGS: &[&str] = &["svg", "button"];

/// Tags that flow inline; their text joins the surrounding words directly.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "i", "kbd", "mark", "s", "small", "span", "strong", "sub",
    "sup", "u",
];

/// Visible text of an element with whitespace collapsed.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_visible(element, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_visible(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let value = child_el.value();
            if is_hidden(value) || SKIPPED_TAGS.contains(&value.name()) {
                continue;
            }
            let block = !INLINE_TAGS.contains(&value.name());
            if block {
                out.push(' ');
            }
            collect_visible(child_el, out);
            if block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}

/// Shorten `text` to at most `max_chars` characters, ending with `…` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}
