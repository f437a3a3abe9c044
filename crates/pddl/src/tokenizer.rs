//! Tokenizer - PDDL text to a flat atom sequence

/// Marker that starts a comment running to the end of the line
pub const COMMENT_MARKER: char = ';';

/// Split PDDL text into atoms.
///
/// Comments are dropped, tabs and newlines become spaces, and parentheses are
/// padded so that each one is an atom of its own. Nesting is not tracked here.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut normalized = String::with_capacity(text.len() + text.len() / 4);
    for line in text.lines() {
        let code = match line.find(COMMENT_MARKER) {
            Some(pos) => &line[..pos],
            None => line,
        };
        for ch in code.chars() {
            match ch {
                '(' => normalized.push_str(" ( "),
                ')' => normalized.push_str(" ) "),
                '\t' | '\r' => normalized.push(' '),
                _ => normalized.push(ch),
            }
        }
        normalized.push(' ');
    }
    normalized.split_whitespace().map(str::to_string).collect()
}
