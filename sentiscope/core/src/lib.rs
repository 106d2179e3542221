#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Sentiscope core: per-sentence sentiment and emotion analysis of a
//! transcript, keyword search, trend smoothing, and chart-data derivation.

/// Chart payloads and the emotion palette.
pub mod charts;
/// TOML configuration.
pub mod config;
/// Emotion classifier capability and backends.
pub mod emotion;
/// Session and renderer errors.
pub mod error;
/// Concurrent analysis pipeline.
pub mod pipeline;
/// Chart surfaces and the replaceable renderer.
pub mod render;
/// Conjunctive keyword search.
pub mod search;
/// Sentence segmentation.
pub mod segmenter;
/// Sentiment scoring.
pub mod sentiment;
/// External interface over one analysed transcript.
pub mod session;
/// Savitzky–Golay trend smoothing.
pub mod smoothing;
/// Structured telemetry for analysis runs.
pub mod telemetry;
/// Index-aligned result types.
pub mod types;

pub use charts::{BarChart, ChartDataBuilder, ChartPayload, EmotionPalette, LineChart};
pub use config::AppConfig;
pub use emotion::{
    ClassifierError, EmotionClassifier, EmotionDistribution, HttpEmotionClassifier,
    KeywordEmotionClassifier,
};
pub use error::{RenderError, SessionError};
pub use pipeline::{AnalysisPipeline, AnalysisResult, AnalysisStats, PipelineOptions};
pub use render::{ChartRenderer, ChartSurface, JsonFileSurface};
pub use search::{SearchIndex, SearchQuery};
pub use segmenter::{Sentence, TextSegmenter};
pub use sentiment::{LexiconSentimentScorer, SentimentScorer};
pub use session::{SelectionCharts, TranscriptSession};
pub use smoothing::SavitzkyGolay;
pub use telemetry::AnalysisTelemetry;
pub use types::{Failure, Scored, SentimentSeries, SmoothedSeries};
