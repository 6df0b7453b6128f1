//! Position-advancing helpers over the markup's characters.
//!
//! All positions are indices into a `&[char]`. None of these functions fail;
//! running off the end is reported by returning `text.len()` (or `None` for
//! [`expression_end`]) and left to the caller to turn into a [`ParseError`].
//!
//! [`ParseError`]: crate::ParseError

/// First position at or after `pos` that is not whitespace.
pub fn skip_ws(text: &[char], pos: usize) -> usize {
    skip_while(text, pos, char::is_whitespace)
}

/// First position at or after `pos` that is whitespace.
pub fn skip_non_ws(text: &[char], pos: usize) -> usize {
    skip_while(text, pos, |c| !c.is_whitespace())
}

/// First position at or after `pos` where `pred` does not hold.
pub fn skip_while(text: &[char], pos: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = pos.min(text.len());
    while end < text.len() && pred(text[end]) {
        end += 1;
    }
    end
}

/// First position at or after `pos` holding `target`.
pub fn find_char(text: &[char], pos: usize, target: char) -> Option<usize> {
    let start = pos.min(text.len());
    text[start..]
        .iter()
        .position(|&c| c == target)
        .map(|i| start + i)
}

/// Position of the `}` closing an expression whose text starts at `start`
/// (just past the opening `{`).
///
/// Nested braces are balanced. Inside a `'` or `"` string braces are not
/// counted, and the string only ends at a matching quote that is not
/// directly preceded by a backslash.
pub fn expression_end(text: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut end = start;

    while end < text.len() {
        let c = text[end];
        match quote {
            Some(q) => {
                if c == q && (end == 0 || text[end - 1] != '\\') {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '{' => depth += 1,
                '}' if depth == 0 => return Some(end),
                '}' => depth -= 1,
                _ => {}
            },
        }
        end += 1;
    }
    None
}
