//! Text normalization
//!
//! Punctuation characters are deleted in place (never replaced with a space),
//! the remainder is lower-cased, and the result is split on whitespace.
//! `"co-op"` therefore becomes the single token `"coop"`.

use std::collections::HashSet;
use std::str::SplitWhitespace;

/// The 32 ASCII punctuation characters stripped by default.
pub const ASCII_PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Set of characters removed from the text before tokenizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunctuationSet {
    chars: HashSet<char>,
}

impl PunctuationSet {
    /// Build a set from every character of `chars`
    pub fn from_chars(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for PunctuationSet {
    fn default() -> Self {
        Self::from_chars(ASCII_PUNCTUATION)
    }
}

/// Normalized text that can be iterated for tokens any number of times
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    normalized: String,
}

impl TokenStream {
    /// Fresh iterator over the tokens; tokens are produced lazily
    pub fn iter(&self) -> Tokens<'_> {
        Tokens {
            inner: self.normalized.split_whitespace(),
        }
    }

    /// Number of tokens; walks the stream
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Owned copies of every token in order
    pub fn to_tokens(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a str;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tokens of a [`TokenStream`]
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Strip punctuation, lower-case and prepare `text` for tokenizing
pub fn normalize(text: &str, punctuation: &PunctuationSet) -> TokenStream {
    let stripped: String = text.chars().filter(|c| !punctuation.contains(*c)).collect();
    // Lower-casing can produce characters from the set, e.g. when it holds letters
    let normalized = stripped
        .to_lowercase()
        .chars()
        .filter(|c| !punctuation.contains(*c))
        .collect();

    TokenStream { normalized }
}
