//! Delimiter-based tokenizer for console input.
//!
//! Tokens are maximal runs of characters for which the delimiter predicate is
//! false. Positions are byte offsets into the original text, so callers can
//! slice "everything from the second token on" without re-joining tokens.

use std::ops::Range;

/// The default delimiter predicate.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Iterator over the byte ranges of the tokens in a string.
#[derive(Debug, Clone)]
pub struct TokenBounds<'a, F> {
    text: &'a str,
    pos: usize,
    is_delimiter: F,
}

impl<'a, F: Fn(char) -> bool> TokenBounds<'a, F> {
    /// Iterate over the tokens of `text`.
    pub fn new(text: &'a str, is_delimiter: F) -> Self {
        Self {
            text,
            pos: 0,
            is_delimiter,
        }
    }
}

impl<F: Fn(char) -> bool> Iterator for TokenBounds<'_, F> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let is_delimiter = &self.is_delimiter;

        let start = self.pos + text[self.pos..].find(|c: char| !is_delimiter(c))?;
        let end = text[start..]
            .find(|c: char| is_delimiter(c))
            .map_or(text.len(), |len| start + len);

        self.pos = end;
        Some(start..end)
    }
}

/// Byte range of the token at index `n`, if there are that many tokens.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{is_whitespace, nth_token};
///
/// let input = "  sv_gravity   800 ";
/// assert_eq!(nth_token(input, 0, is_whitespace), Some(2..12));
/// assert_eq!(&input[nth_token(input, 1, is_whitespace).unwrap()], "800");
/// assert_eq!(nth_token(input, 2, is_whitespace), None);
/// ```
pub fn nth_token(text: &str, n: usize, is_delimiter: impl Fn(char) -> bool) -> Option<Range<usize>> {
    TokenBounds::new(text, is_delimiter).nth(n)
}

/// Split `text` into tokens, stopping after `max` tokens if given.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{is_whitespace, split};
///
/// assert_eq!(split("bind  F1 jump", is_whitespace, None), ["bind", "F1", "jump"]);
/// assert_eq!(split("a,b,,c", |c| c == ',', Some(2)), ["a", "b"]);
/// ```
pub fn split(text: &str, is_delimiter: impl Fn(char) -> bool, max: Option<usize>) -> Vec<&str> {
    TokenBounds::new(text, is_delimiter)
        .take(max.unwrap_or(usize::MAX))
        .map(|range| &text[range])
        .collect()
}
