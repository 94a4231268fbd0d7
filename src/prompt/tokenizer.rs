//! Token length oracles used to bound blended requests

/// Measures the token length of a piece of text
///
/// Implementations must be pure: the same text always yields the same length.
pub trait Tokenizer: Send + Sync {
    fn token_length(&self, text: &str) -> u32;
}

/// Approximate word-piece tokenizer
///
/// Counts whitespace-separated words, splitting off punctuation as separate
/// tokens, and adds start/end markers the way CLIP-style encoders do.
#[derive(Debug, Clone, Copy)]
pub struct WordTokenizer {
    special_tokens: u32,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WordTokenizer {
    /// Tokenizer counting start and end markers
    pub fn new() -> Self {
        Self { special_tokens: 2 }
    }

    /// Tokenizer that counts only the text itself
    pub fn without_markers() -> Self {
        Self { special_tokens: 0 }
    }
}

impl Tokenizer for WordTokenizer {
    fn token_length(&self, text: &str) -> u32 {
        let mut count = 0u32;
        for word in text.split_whitespace() {
            let mut in_word = false;
            for ch in word.chars() {
                if ch.is_alphanumeric() || ch == '\'' {
                    if !in_word {
                        count += 1;
                        in_word = true;
                    }
                } else {
                    count += 1;
                    in_word = false;
                }
            }
        }
        count + self.special_tokens
    }
}
