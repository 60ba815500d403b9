use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Single-line preview of free text.
///
/// This function:
/// 1. Collapses every run of whitespace (including newlines) into one space
/// 2. Trims both ends
/// 3. Cuts to at most `max_chars` characters, ending with `…` when cut
///
/// # Examples
///
/// ```
/// use notehub::util::text::preview;
///
/// assert_eq!(preview("Buy milk\n\nand  eggs", 40), "Buy milk and eggs");
/// assert_eq!(preview("abcdefgh", 5), "abcd…");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = whitespace_re().replace_all(text.trim(), " ");
    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = collapsed.chars().take(max_chars - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
