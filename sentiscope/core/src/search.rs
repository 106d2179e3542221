use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::segmenter::Sentence;

/// Lowercased keyword tokens taken from free-form user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    /// Splits `input` on whitespace and lowercases each token.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            tokens: input.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// Tokens in input order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when the input held no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Conjunctive, case-insensitive substring search over one sentence collection.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    sentences: Arc<[Sentence]>,
    folded: Vec<String>,
}

impl SearchIndex {
    /// Indexes `sentences`; the lowercase text is computed once.
    #[must_use]
    pub fn new(sentences: Arc<[Sentence]>) -> Self {
        let folded = sentences.iter().map(|s| s.text.to_lowercase()).collect();
        Self { sentences, folded }
    }

    /// Sentences containing every query token, in collection order.
    ///
    /// Tokens match anywhere inside the text, not only on word boundaries.
    /// A query without tokens matches nothing.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&Sentence> {
        if query.is_empty() {
            return Vec::new();
        }
        self.sentences
            .iter()
            .zip(&self.folded)
            .filter(|(_, text)| query.tokens().iter().all(|token| text.contains(token.as_str())))
            .map(|(sentence, _)| sentence)
            .collect()
    }

    /// Convenience wrapper that parses `input` first.
    #[must_use]
    pub fn search_str(&self, input: &str) -> Vec<&Sentence> {
        self.search(&SearchQuery::parse(input))
    }

    /// Indexed collection.
    #[must_use]
    pub fn sentences(&self) -> &Arc<[Sentence]> {
        &self.sentences
    }
}
