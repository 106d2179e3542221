//! Sentence polarity scoring.

/// Valence lexicon and its loaders.
pub mod lexicon;
/// Rule-based compound scorer.
pub mod scorer;

pub use lexicon::ValenceLexicon;
pub use scorer::LexiconSentimentScorer;

/// Maps a sentence to a compound polarity in `[-1, 1]`.
///
/// Implementations must be pure and safe to call concurrently: positive
/// values denote positive polarity, negative values negative polarity, and
/// zero means neutral or no signal.
pub trait SentimentScorer: Send + Sync {
    /// Scores one sentence.
    fn score(&self, sentence: &str) -> f64;
}
