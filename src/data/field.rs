// ============================================================
// Layer 4 — Field
// ============================================================
// Describes one column of the input file: how raw text is
// tokenised, which special tokens it reserves, and how its
// tokens are turned into indices.
//
//   label field: one token per line, no <unk>, no <pad>
//   text field:  whitespace tokens, <unk> and <pad> reserved,
//                optional <EOS> appended to every sequence

use serde::{Deserialize, Serialize};

use crate::data::vocab::{SpecialTokens, Vocabulary};

pub const UNK_TOKEN: &str = "<unk>";
pub const PAD_TOKEN: &str = "<pad>";
pub const EOS_TOKEN: &str = "<EOS>";

/// How a raw column is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tokenization {
    /// The trimmed column is a single token
    Whole,
    /// Split on Unicode whitespace
    Whitespace,
}

/// Failure to turn a token into an index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("token '{0}' is not in the vocabulary and the field has no unknown token")]
    UnknownToken(String),

    #[error("token '{0}' is not a non-negative integer")]
    NotNumeric(String),
}

/// Schema of one input column. Immutable once the loader is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub use_vocab: bool,
    pub tokenization: Tokenization,
    pub specials: SpecialTokens,
}

impl Field {
    /// The categorical label column.
    pub fn label() -> Self {
        Self {
            use_vocab: true,
            tokenization: Tokenization::Whole,
            specials: SpecialTokens::default(),
        }
    }

    /// The free-form text column.
    pub fn text(use_eos: bool) -> Self {
        Self {
            use_vocab: true,
            tokenization: Tokenization::Whitespace,
            specials: SpecialTokens {
                unk: Some(UNK_TOKEN.to_string()),
                pad: Some(PAD_TOKEN.to_string()),
                eos: use_eos.then(|| EOS_TOKEN.to_string()),
            },
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.tokenization == Tokenization::Whitespace
    }

    pub fn allows_unknown(&self) -> bool {
        self.specials.unk.is_some()
    }

    /// Split a raw column into tokens, appending <EOS> if configured.
    pub fn tokenize(&self, raw: &str) -> Vec<String> {
        let mut tokens: Vec<String> = match self.tokenization {
            Tokenization::Whole => vec![raw.trim().to_string()],
            Tokenization::Whitespace => raw.split_whitespace().map(str::to_string).collect(),
        };
        if let Some(eos) = &self.specials.eos {
            tokens.push(eos.clone());
        }
        tokens
    }

    /// Build this field's vocabulary over already tokenised sequences.
    pub fn build_vocab<I, T>(&self, corpus: I, max_size: Option<usize>, min_freq: usize) -> Vocabulary
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[String]>,
    {
        Vocabulary::build(corpus, &self.specials, max_size, min_freq)
    }

    /// Map tokens to indices.
    ///
    /// Fields without a vocabulary parse each token as an integer instead.
    pub fn encode(&self, tokens: &[String], vocab: &Vocabulary) -> Result<Vec<usize>, EncodeError> {
        tokens
            .iter()
            .map(|t| {
                if self.use_vocab {
                    vocab
                        .encode(t)
                        .ok_or_else(|| EncodeError::UnknownToken(t.clone()))
                } else {
                    t.parse::<usize>()
                        .map_err(|_| EncodeError::NotNumeric(t.clone()))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_field_keeps_whole_column() {
        let f = Field::label();
        assert_eq!(f.tokenize(" very positive "), vec!["very positive"]);
        assert!(!f.allows_unknown());
        assert!(!f.is_sequential());
    }

    #[test]
    fn test_text_field_splits_and_appends_eos() {
        let f = Field::text(true);
        assert_eq!(f.tokenize("great  movie\t!"), vec!["great", "movie", "!", "<EOS>"]);
        assert_eq!(Field::text(false).tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn test_text_vocab_reserves_specials_in_order() {
        let f = Field::text(true);
        let corpus = vec![f.tokenize("a b")];
        let v = f.build_vocab(&corpus, None, 1);
        assert_eq!(v.tokens()[..3], ["<unk>", "<pad>", "<EOS>"]);
    }

    #[test]
    fn test_label_encode_rejects_unseen() {
        let f = Field::label();
        let corpus = vec![f.tokenize("positive"), f.tokenize("negative")];
        let v = f.build_vocab(&corpus, None, 1);
        assert!(f.encode(&f.tokenize("positive"), &v).is_ok());
        assert_eq!(
            f.encode(&f.tokenize("neutral"), &v),
            Err(EncodeError::UnknownToken("neutral".into()))
        );
    }

    #[test]
    fn test_text_encode_falls_back_to_unk() {
        let f = Field::text(false);
        let corpus = vec![f.tokenize("hello world")];
        let v = f.build_vocab(&corpus, None, 1);
        let ids = f.encode(&f.tokenize("hello there"), &v).unwrap();
        assert_eq!(ids[1], v.unk_index().unwrap());
    }

    #[test]
    fn test_non_vocab_field_parses_integers() {
        let f = Field {
            use_vocab: false,
            ..Field::label()
        };
        let v = Vocabulary::from_tokens(Vec::new(), &SpecialTokens::default());
        assert_eq!(f.encode(&["3".to_string()], &v), Ok(vec![3]));
        assert_eq!(
            f.encode(&["x".to_string()], &v),
            Err(EncodeError::NotNumeric("x".into()))
        );
    }
}
