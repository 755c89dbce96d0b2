//! Tokenizer and n-gram generation for hashed TF-IDF.
//!
//! Text is lowercased, split on non-alphanumeric characters, and English stop
//! words plus single-character tokens are dropped. The surviving tokens are
//! kept as byte spans into one lowercased buffer; n-grams are formed over
//! consecutive surviving tokens and joined with a single space.

use std::collections::HashSet;
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
        "been", "but", "by", "can", "did", "do", "does", "for", "from", "had", "has", "have",
        "he", "her", "his", "how", "if", "in", "into", "is", "it", "its", "no", "not", "of",
        "on", "or", "she", "so", "such", "than", "that", "the", "their", "them", "then",
        "there", "these", "they", "this", "to", "was", "were", "what", "when", "where",
        "which", "who", "whom", "why", "will", "with", "would", "you",
    ]
    .into_iter()
    .collect()
});

/// Tokenized text: owns the lowercased buffer, exposes `&str` slices via byte spans.
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>, // (start, end) byte offsets into buffer
}

impl Tokens {
    /// Returns an iterator over the token slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// N-grams of order `min..=max` over consecutive tokens, joined by a space.
    ///
    /// Order `n` contributes `len - n + 1` n-grams (none if the text is shorter).
    pub fn ngrams(&self, (min, max): (usize, usize)) -> Vec<String> {
        let words: Vec<&str> = self.iter().collect();
        let mut out = Vec::new();
        for n in min.max(1)..=max {
            if n > words.len() {
                break;
            }
            out.extend(words.windows(n).map(|w| w.join(" ")));
        }
        out
    }
}

fn keep(token: &str) -> bool {
    token.chars().nth(1).is_some() && !STOP_WORDS.contains(token)
}

/// Tokenize text: lowercase, split on non-alphanumeric, remove stop words.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start {
            if keep(&buffer[s..i]) {
                spans.push((s as u32, i as u32));
            }
            start = None;
        }
    }
    // Last token has no trailing separator
    if let Some(s) = start {
        if keep(&buffer[s..]) {
            spans.push((s as u32, buffer.len() as u32));
        }
    }

    Tokens { buffer, spans }
}
