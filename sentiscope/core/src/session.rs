//! Stateful entry point used by presentation layers.
//!
//! A session owns one analysis result at a time plus the charts built for
//! the last selection. Both live behind a single lock so readers never see
//! a result from one run paired with charts from another.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    charts::{BarChart, ChartDataBuilder, EmotionPalette, LineChart},
    config::AppConfig,
    emotion::EmotionDistribution,
    error::SessionError,
    pipeline::{AnalysisPipeline, AnalysisResult},
    search::{SearchIndex, SearchQuery},
    segmenter::Sentence,
    telemetry::AnalysisTelemetry,
    types::{Scored, SentimentSeries, SmoothedSeries},
};

/// Charts derived from one selected sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionCharts {
    /// Selected index.
    pub index: usize,
    /// Selected sentence.
    pub sentence: Sentence,
    /// Emotion bars, unavailable when classification failed.
    pub emotion: Scored<BarChart>,
    /// Sentiment trend with the selection highlighted.
    pub sentiment: LineChart,
}

#[derive(Debug)]
struct SessionState {
    analysis: Arc<AnalysisResult>,
    search: Arc<SearchIndex>,
    charts: Option<Arc<SelectionCharts>>,
}

impl SessionState {
    fn new(analysis: AnalysisResult) -> Self {
        let search = Arc::new(SearchIndex::new(analysis.sentences()));
        Self {
            analysis: Arc::new(analysis),
            search,
            charts: None,
        }
    }
}

/// One analysed transcript and the user's current selection.
#[derive(Debug)]
pub struct TranscriptSession {
    pipeline: AnalysisPipeline,
    builder: ChartDataBuilder,
    state: RwLock<SessionState>,
}

impl TranscriptSession {
    /// Analyses `text` and returns a ready session.
    pub async fn initialize(
        text: &str,
        pipeline: AnalysisPipeline,
        builder: ChartDataBuilder,
    ) -> Result<Self, SessionError> {
        let analysis = pipeline.analyze(text).await;
        Ok(Self {
            pipeline,
            builder,
            state: RwLock::new(SessionState::new(analysis)),
        })
    }

    /// Builds the pipeline and palette from `config`, then initialises.
    pub async fn from_config(text: &str, config: &AppConfig) -> Result<Self, SessionError> {
        let pipeline = AnalysisPipeline::from_config(config)?;
        let builder = ChartDataBuilder::new(EmotionPalette::with_overrides(&config.palette));
        Self::initialize(text, pipeline, builder).await
    }

    /// Current result.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AnalysisResult> {
        Arc::clone(&self.state.read().analysis)
    }

    /// Sentences of the current result.
    #[must_use]
    pub fn sentences(&self) -> Arc<[Sentence]> {
        self.state.read().analysis.sentences()
    }

    /// Sentences matching every keyword of `query`, in transcript order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Sentence> {
        let index = Arc::clone(&self.state.read().search);
        index
            .search(&SearchQuery::parse(query))
            .into_iter()
            .cloned()
            .collect()
    }

    /// Emotion distribution of sentence `index`.
    pub fn emotion_distribution(
        &self,
        index: usize,
    ) -> Result<Scored<EmotionDistribution>, SessionError> {
        let state = self.state.read();
        state
            .analysis
            .emotions()
            .get(index)
            .cloned()
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: state.analysis.len(),
            })
    }

    /// Raw sentiment series.
    #[must_use]
    pub fn sentiment_series(&self) -> SentimentSeries {
        self.state.read().analysis.sentiment().clone()
    }

    /// Smoothed sentiment series.
    #[must_use]
    pub fn smoothed_series(&self) -> SmoothedSeries {
        self.state.read().analysis.smoothed().clone()
    }

    /// Rebuilds both charts for sentence `index`.
    ///
    /// An out-of-range index fails and leaves the previous charts in place.
    pub fn on_select(&self, index: usize) -> Result<Arc<SelectionCharts>, SessionError> {
        let mut state = self.state.write();
        let analysis = Arc::clone(&state.analysis);
        let sentence = analysis
            .sentence(index)
            .cloned()
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: analysis.len(),
            })?;

        let emotion = self
            .builder
            .build_scored_emotion_chart(&analysis.emotions()[index], &sentence.text);
        let sentiment =
            self.builder
                .build_sentiment_chart(analysis.sentiment(), analysis.smoothed(), Some(index));
        let charts = Arc::new(SelectionCharts {
            index,
            sentence,
            emotion,
            sentiment,
        });
        state.charts = Some(Arc::clone(&charts));
        drop(state);

        let _ = self.pipeline.telemetry().log_run(
            LogLevel::Info,
            "session.select",
            analysis.run_id(),
            json!({ "index": index, "emotion_available": charts.emotion.is_available() }),
        );
        Ok(charts)
    }

    /// Charts from the most recent successful selection, if still current.
    #[must_use]
    pub fn current_charts(&self) -> Option<Arc<SelectionCharts>> {
        self.state.read().charts.clone()
    }

    /// Analyses `text` and swaps the new result in, discarding stale charts.
    pub async fn reanalyze(&self, text: &str) -> Arc<AnalysisResult> {
        let next = SessionState::new(self.pipeline.analyze(text).await);
        let analysis = Arc::clone(&next.analysis);
        *self.state.write() = next;
        let _ = self.pipeline.telemetry().log_run(
            LogLevel::Info,
            "session.reanalyzed",
            analysis.run_id(),
            json!({ "sentences": analysis.len() }),
        );
        analysis
    }

    /// Chart builder in use.
    #[must_use]
    pub const fn chart_builder(&self) -> &ChartDataBuilder {
        &self.builder
    }

    /// Telemetry shared with the pipeline.
    #[must_use]
    pub const fn telemetry(&self) -> &AnalysisTelemetry {
        self.pipeline.telemetry()
    }
}
