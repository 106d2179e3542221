//! Emotion classification capability and the distributions it produces.

/// Offline cue-word classifier.
pub mod keyword;
/// Model-serving HTTP client.
pub mod remote;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use keyword::KeywordEmotionClassifier;
pub use remote::HttpEmotionClassifier;

/// Allowed deviation of a distribution's total from `1.0`.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-3;

/// Problems with a candidate label distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// No labels at all.
    #[error("distribution has no labels")]
    Empty,
    /// A probability was negative or not finite.
    #[error("label {label:?} has invalid probability {value}")]
    InvalidProbability {
        /// Offending label.
        label: String,
        /// Offending value.
        value: f64,
    },
    /// Every probability was zero.
    #[error("distribution has zero total mass")]
    ZeroMass,
}

/// Probability per emotion label, in classifier order, summing to `1 ± 1e-3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct EmotionDistribution(IndexMap<String, f64>);

impl EmotionDistribution {
    /// Validates and, if the total drifts beyond tolerance, renormalizes.
    /// Repeated labels accumulate.
    pub fn new<I, S>(entries: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map: IndexMap<String, f64> = IndexMap::new();
        for (label, value) in entries {
            let label = label.into();
            if !value.is_finite() || value < 0.0 {
                return Err(DistributionError::InvalidProbability { label, value });
            }
            *map.entry(label).or_insert(0.0) += value;
        }
        if map.is_empty() {
            return Err(DistributionError::Empty);
        }
        let total: f64 = map.values().sum();
        if total <= 0.0 {
            return Err(DistributionError::ZeroMass);
        }
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            map.values_mut().for_each(|value| *value /= total);
        }
        Ok(Self(map))
    }

    /// Probability of `label`, if present.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Entries in classifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, value)| (label.as_str(), *value))
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed distribution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all probabilities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Highest-probability label; ties resolve to the earliest label.
    #[must_use]
    pub fn dominant(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, value) in self.iter() {
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((label, value));
            }
        }
        best
    }
}

impl TryFrom<IndexMap<String, f64>> for EmotionDistribution {
    type Error = DistributionError;

    fn try_from(map: IndexMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<EmotionDistribution> for IndexMap<String, f64> {
    fn from(distribution: EmotionDistribution) -> Self {
        distribution.0
    }
}

/// Errors surfaced by classifier backends.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Backend cannot serve requests.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    /// Network or client failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Endpoint answered with a non-success status.
    #[error("endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// Body could not be interpreted as label scores.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Scores did not form a valid distribution.
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Sentence → emotion distribution capability.
///
/// Calls may block on I/O; the pipeline bounds each call with a timeout and
/// never runs it on a caller's thread.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classifies one sentence.
    async fn classify(&self, sentence: &str) -> Result<EmotionDistribution, ClassifierError>;

    /// Short backend name used in telemetry.
    fn name(&self) -> &str {
        "classifier"
    }
}
