// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Bidirectional token ↔ index mapping built once from the
// training split.
//
// Index layout:
//   [specials in order unk, pad, eos] [corpus tokens by rank]
//
// Corpus tokens are ranked by descending frequency; equal
// frequencies keep the order in which the tokens were first
// seen, so two builds over the same corpus always agree.
// `max_size` limits only the corpus tokens, never the specials.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved tokens of a field. `None` means the slot is not allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub unk: Option<String>,
    pub pad: Option<String>,
    pub eos: Option<String>,
}

impl SpecialTokens {
    /// Allocated specials in index order.
    pub fn ordered(&self) -> impl Iterator<Item = &str> {
        [&self.unk, &self.pad, &self.eos]
            .into_iter()
            .filter_map(|t| t.as_deref())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.ordered().any(|t| t == token)
    }
}

/// Immutable token ↔ index mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    itos: Vec<String>,
    stoi: HashMap<String, usize>,
    unk_index: Option<usize>,
    pad_index: Option<usize>,
    eos_index: Option<usize>,
}

impl Vocabulary {
    /// Count tokens over `corpus` and assign indices.
    ///
    /// Tokens seen fewer than `min_freq` times are dropped (a `min_freq`
    /// of 0 behaves like 1). At most `max_size` corpus tokens are kept.
    pub fn build<I, T>(
        corpus: I,
        specials: &SpecialTokens,
        max_size: Option<usize>,
        min_freq: usize,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[String]>,
    {
        let min_freq = min_freq.max(1);

        // token → (count, first-seen position)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;
        for sequence in corpus {
            for token in sequence.as_ref() {
                if specials.contains(token) {
                    continue;
                }
                match counts.get_mut(token.as_str()) {
                    Some((count, _)) => *count += 1,
                    None => {
                        counts.insert(token.clone(), (1, seen));
                        seen += 1;
                    }
                }
            }
        }

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .filter(|(_, (count, _))| *count >= min_freq)
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        if let Some(max_size) = max_size {
            ranked.truncate(max_size);
        }

        let itos: Vec<String> = specials
            .ordered()
            .map(str::to_string)
            .chain(ranked.into_iter().map(|(token, ..)| token))
            .collect();

        Self::from_tokens(itos, specials)
    }

    /// Build a vocabulary from an explicit index-ordered token list.
    pub fn from_tokens(itos: Vec<String>, specials: &SpecialTokens) -> Self {
        let stoi: HashMap<String, usize> = itos
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let lookup = |t: &Option<String>| t.as_deref().and_then(|t| stoi.get(t).copied());
        let unk_index = lookup(&specials.unk);
        let pad_index = lookup(&specials.pad);
        let eos_index = lookup(&specials.eos);

        Self {
            itos,
            stoi,
            unk_index,
            pad_index,
            eos_index,
        }
    }

    /// Exact lookup, no unknown fallback.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.stoi.get(token).copied()
    }

    /// Lookup falling back to the unknown index when the vocabulary has one.
    pub fn encode(&self, token: &str) -> Option<usize> {
        self.index_of(token).or(self.unk_index)
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.itos.get(index).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.itos
    }

    pub fn contains(&self, token: &str) -> bool {
        self.stoi.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.itos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    pub fn unk_index(&self) -> Option<usize> {
        self.unk_index
    }

    pub fn pad_index(&self) -> Option<usize> {
        self.pad_index
    }

    pub fn eos_index(&self) -> Option<usize> {
        self.eos_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn text_specials() -> SpecialTokens {
        SpecialTokens {
            unk: Some("<unk>".into()),
            pad: Some("<pad>".into()),
            eos: None,
        }
    }

    #[test]
    fn test_specials_come_first() {
        let corpus = vec![toks("a b")];
        let v = Vocabulary::build(&corpus, &text_specials(), None, 1);
        assert_eq!(v.token(0), Some("<unk>"));
        assert_eq!(v.token(1), Some("<pad>"));
        assert_eq!(v.unk_index(), Some(0));
        assert_eq!(v.pad_index(), Some(1));
        assert_eq!(v.eos_index(), None);
    }

    #[test]
    fn test_frequency_rank_then_first_seen() {
        let corpus = vec![toks("b a c"), toks("c a"), toks("a")];
        let v = Vocabulary::build(&corpus, &SpecialTokens::default(), None, 1);
        // a:3, c:2, b:1
        assert_eq!(v.tokens(), &["a", "c", "b"]);

        let ties = vec![toks("z y x")];
        let v = Vocabulary::build(&ties, &SpecialTokens::default(), None, 1);
        assert_eq!(v.tokens(), &["z", "y", "x"]);
    }

    #[test]
    fn test_min_freq_and_max_size_cutoffs() {
        let corpus = vec![toks("a a a b b c d")];
        let v = Vocabulary::build(&corpus, &text_specials(), None, 2);
        assert!(v.contains("a") && v.contains("b"));
        assert!(!v.contains("c"));
        assert_eq!(v.encode("c"), v.unk_index());

        let v = Vocabulary::build(&corpus, &text_specials(), Some(1), 1);
        // two specials plus one corpus token
        assert_eq!(v.len(), 3);
        assert!(v.contains("a"));
        assert!(!v.contains("b"));
    }

    #[test]
    fn test_unbounded_keeps_every_token() {
        let corpus = vec![toks("great movie"), toks("terrible film")];
        let v = Vocabulary::build(&corpus, &text_specials(), None, 1);
        for t in ["great", "movie", "terrible", "film"] {
            assert!(v.contains(t), "missing {t}");
        }
    }

    #[test]
    fn test_specials_in_corpus_are_not_counted() {
        let corpus = vec![toks("<pad> a <unk>")];
        let v = Vocabulary::build(&corpus, &text_specials(), None, 1);
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn test_round_trip_token_index() {
        let corpus = vec![toks("the quick brown fox"), toks("the lazy dog")];
        let v = Vocabulary::build(&corpus, &text_specials(), None, 1);
        for t in ["the", "quick", "lazy", "dog"] {
            let i = v.index_of(t).unwrap();
            assert_eq!(v.token(i), Some(t));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let corpus: Vec<Vec<String>> = (0..50)
            .map(|i| toks(&format!("w{} w{} common", i % 7, i % 11)))
            .collect();
        let a = Vocabulary::build(&corpus, &text_specials(), Some(10), 1);
        let b = Vocabulary::build(&corpus, &text_specials(), Some(10), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_unk_means_no_fallback() {
        let corpus = vec![toks("positive"), toks("negative")];
        let v = Vocabulary::build(&corpus, &SpecialTokens::default(), None, 1);
        assert_eq!(v.len(), 2);
        assert_eq!(v.encode("neutral"), None);
    }
}
