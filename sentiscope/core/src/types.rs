//! Index-aligned result collections shared by the pipeline, search, and charts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a per-sentence value could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The call exceeded its deadline.
    #[error("timed out after {after_ms} ms")]
    Timeout {
        /// Deadline that elapsed, in milliseconds.
        after_ms: u64,
    },
    /// The backing capability reported an error.
    #[error("capability failed: {message}")]
    Capability {
        /// Error text from the capability.
        message: String,
    },
    /// The capability answered with an unusable value.
    #[error("invalid output: {message}")]
    Invalid {
        /// What was wrong with the value.
        message: String,
    },
    /// The worker running the call panicked or was cancelled.
    #[error("worker aborted: {message}")]
    Aborted {
        /// Join error text.
        message: String,
    },
}

/// A per-sentence outcome: either a value or the "unavailable" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Scored<T> {
    /// The value was produced.
    Available(T),
    /// The value could not be produced; the sentence keeps its slot.
    Unavailable(Failure),
}

impl<T> Scored<T> {
    /// Returns the value when available.
    pub const fn available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }

    /// Returns the failure when unavailable.
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(failure) => Some(failure),
        }
    }

    /// Whether a value was produced.
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Maps the available value, keeping the failure untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scored<U> {
        match self {
            Self::Available(value) => Scored::Available(f(value)),
            Self::Unavailable(failure) => Scored::Unavailable(failure),
        }
    }
}

/// Compound sentiment per sentence, each in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Scored<f64>>", into = "Vec<Scored<f64>>")]
pub struct SentimentSeries(Vec<Scored<f64>>);

impl From<Vec<Scored<f64>>> for SentimentSeries {
    fn from(entries: Vec<Scored<f64>>) -> Self {
        Self::new(entries)
    }
}

impl From<SentimentSeries> for Vec<Scored<f64>> {
    fn from(series: SentimentSeries) -> Self {
        series.0
    }
}

impl SentimentSeries {
    /// Builds the series, clamping values into `[-1, 1]` and marking
    /// non-finite values as invalid.
    #[must_use]
    pub fn new(entries: Vec<Scored<f64>>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|entry| match entry {
                    Scored::Available(value) if value.is_finite() => {
                        Scored::Available(value.clamp(-1.0, 1.0))
                    }
                    Scored::Available(value) => Scored::Unavailable(Failure::Invalid {
                        message: format!("non-finite sentiment score {value}"),
                    }),
                    unavailable @ Scored::Unavailable(_) => unavailable,
                })
                .collect(),
        )
    }

    /// Number of sentences covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry for sentence `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Scored<f64>> {
        self.0.get(index)
    }

    /// Iterates entries in sentence order.
    pub fn iter(&self) -> impl Iterator<Item = &Scored<f64>> {
        self.0.iter()
    }

    /// Plain float view; unavailable entries read as neutral `0.0`.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.0
            .iter()
            .map(|entry| entry.available().copied().unwrap_or(0.0))
            .collect()
    }

    /// Indices whose score is unavailable.
    #[must_use]
    pub fn unavailable_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_available())
            .map(|(index, _)| index)
            .collect()
    }
}

impl From<Vec<f64>> for SentimentSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values.into_iter().map(Scored::Available).collect())
    }
}

/// Denoised sentiment trend, same length as its source series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SmoothedSeries(Vec<f64>);

impl SmoothedSeries {
    /// Wraps already-smoothed values.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrowed values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_clamps_and_rejects_non_finite() {
        let series = SentimentSeries::new(vec![
            Scored::Available(1.7),
            Scored::Available(f64::NAN),
            Scored::Available(-0.25),
        ]);
        assert_eq!(series.get(0), Some(&Scored::Available(1.0)));
        assert!(matches!(
            series.get(1),
            Some(Scored::Unavailable(Failure::Invalid { .. }))
        ));
        assert_eq!(series.values(), vec![1.0, 0.0, -0.25]);
        assert_eq!(series.unavailable_indices(), vec![1]);
    }

    #[test]
    fn scored_serializes_with_status_tag() {
        let ok = serde_json::to_value(Scored::Available(0.5)).unwrap();
        assert_eq!(ok["status"], "available");
        let failed: Scored<f64> = Scored::Unavailable(Failure::Timeout { after_ms: 250 });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["value"]["kind"], "timeout");
        assert_eq!(json["value"]["after_ms"], 250);
    }

    #[test]
    fn deserialized_series_is_clamped() {
        let json = r#"[
            {"status":"available","value":3.5},
            {"status":"unavailable","value":{"kind":"timeout","after_ms":5}},
            {"status":"available","value":-2.0}
        ]"#;
        let series: SentimentSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.values(), vec![1.0, 0.0, -1.0]);
        assert_eq!(series.unavailable_indices(), vec![1]);
        let back = serde_json::to_value(&series).unwrap();
        assert_eq!(back[0]["value"], 1.0);
    }
}
