use unicode_normalization::UnicodeNormalization;

/// Token with a hashing weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Word-level tokens for free text.
///
/// Token forms:
/// - w:<word>          (NFKC-lowercased alphanumeric run, `+#.` kept for c++/c#/node.js)
/// - bi:<word>_<word>  (adjacent pair)
pub fn tokenize_text(text: &str) -> Vec<WeightedToken> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    let words: Vec<&str> = normalized
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .collect();

    let mut tokens = Vec::with_capacity(words.len() * 2);
    for word in &words {
        tokens.push(WeightedToken::new(format!("w:{word}"), UNIGRAM_WEIGHT));
    }
    for pair in words.windows(2) {
        tokens.push(WeightedToken::new(
            format!("bi:{}_{}", pair[0], pair[1]),
            BIGRAM_WEIGHT,
        ));
    }

    tokens
}
