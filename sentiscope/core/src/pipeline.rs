//! Fan-out/fan-in analysis of a whole transcript.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
    config::{AppConfig, ClassifierKind},
    emotion::{
        ClassifierError, EmotionClassifier, EmotionDistribution, HttpEmotionClassifier,
        KeywordEmotionClassifier,
    },
    segmenter::{Sentence, TextSegmenter},
    sentiment::{LexiconSentimentScorer, SentimentScorer, ValenceLexicon},
    smoothing::SavitzkyGolay,
    telemetry::AnalysisTelemetry,
    types::{Failure, Scored, SentimentSeries, SmoothedSeries},
};

/// Tunables for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Sentences processed concurrently.
    pub max_concurrency: usize,
    /// Deadline for each classifier call.
    pub classify_timeout: Duration,
    /// Trend smoother applied to the sentiment series.
    pub smoothing: SavitzkyGolay,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            classify_timeout: Duration::from_secs(5),
            smoothing: SavitzkyGolay::default(),
        }
    }
}

impl PipelineOptions {
    /// Options taken from the `[pipeline]` and `[smoothing]` tables.
    #[must_use]
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrency: config.pipeline.max_concurrency,
            classify_timeout: config.pipeline.classify_timeout(),
            smoothing: SavitzkyGolay::new(config.smoothing.max_window, config.smoothing.poly_order),
        }
    }
}

/// Counters and timing for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Sentences produced by segmentation.
    pub sentences: usize,
    /// Sentences without a sentiment score.
    pub sentiment_unavailable: usize,
    /// Sentences without an emotion distribution.
    pub emotion_unavailable: usize,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
    /// When the run began.
    pub started_at: DateTime<Utc>,
}

/// Index-aligned output of one pipeline run.
///
/// Only [`AnalysisPipeline::analyze`] creates values of this type, so every
/// collection has exactly one entry per sentence.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    run_id: Uuid,
    sentences: Arc<[Sentence]>,
    sentiment: SentimentSeries,
    emotions: Vec<Scored<EmotionDistribution>>,
    smoothed: SmoothedSeries,
    stats: AnalysisStats,
}

impl AnalysisResult {
    /// Run correlation id.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Sentences in transcript order.
    #[must_use]
    pub fn sentences(&self) -> Arc<[Sentence]> {
        Arc::clone(&self.sentences)
    }

    /// Sentence at `index`.
    #[must_use]
    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Raw sentiment per sentence.
    #[must_use]
    pub const fn sentiment(&self) -> &SentimentSeries {
        &self.sentiment
    }

    /// Emotion distribution per sentence.
    #[must_use]
    pub fn emotions(&self) -> &[Scored<EmotionDistribution>] {
        &self.emotions
    }

    /// Smoothed sentiment trend.
    #[must_use]
    pub const fn smoothed(&self) -> &SmoothedSeries {
        &self.smoothed
    }

    /// Run statistics.
    #[must_use]
    pub const fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    /// Number of sentences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether the transcript had no sentences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

type SentenceOutcome = (Scored<f64>, Scored<EmotionDistribution>);

/// Segments a transcript and scores every sentence concurrently.
#[derive(Clone)]
pub struct AnalysisPipeline {
    segmenter: Arc<TextSegmenter>,
    scorer: Arc<dyn SentimentScorer>,
    classifier: Arc<dyn EmotionClassifier>,
    options: PipelineOptions,
    telemetry: AnalysisTelemetry,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("classifier", &self.classifier.name())
            .field("options", &self.options)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    /// Pipeline with default segmenter, options, and no telemetry.
    #[must_use]
    pub fn new(scorer: Arc<dyn SentimentScorer>, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            segmenter: Arc::new(TextSegmenter::new()),
            scorer,
            classifier,
            options: PipelineOptions::default(),
            telemetry: AnalysisTelemetry::disabled(),
        }
    }

    /// Lexicon scorer with the offline keyword classifier.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(
            Arc::new(LexiconSentimentScorer::new()),
            Arc::new(KeywordEmotionClassifier::new()),
        )
    }

    /// Builds scorer, classifier, options, and telemetry from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let classifier: Arc<dyn EmotionClassifier> = match config.classifier.kind {
            ClassifierKind::Keyword => Arc::new(KeywordEmotionClassifier::new()),
            ClassifierKind::Http => {
                let endpoint = config
                    .classifier
                    .endpoint
                    .clone()
                    .context("classifier.endpoint is required for the http backend")?;
                let mut client = HttpEmotionClassifier::new(endpoint)?;
                if let Some(var) = &config.classifier.token_env {
                    let token = std::env::var(var)
                        .with_context(|| format!("reading classifier token from ${var}"))?;
                    client = client.with_bearer_token(token);
                }
                Arc::new(client)
            }
        };

        let scorer = match &config.sentiment.lexicon_path {
            Some(path) => LexiconSentimentScorer::with_lexicon(ValenceLexicon::load(path)?),
            None => LexiconSentimentScorer::new(),
        };

        let mut telemetry = AnalysisTelemetry::builder("sentiscope").min_level(config.logging.min_level);
        if let Some(path) = &config.logging.path {
            telemetry = telemetry.log_path(path);
        }

        Ok(Self::new(Arc::new(scorer), classifier)
            .with_options(PipelineOptions::from_config(config))
            .with_telemetry(telemetry.build()?))
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the segmenter.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: TextSegmenter) -> Self {
        self.segmenter = Arc::new(segmenter);
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: AnalysisTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Options in use.
    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Telemetry handle.
    #[must_use]
    pub const fn telemetry(&self) -> &AnalysisTelemetry {
        &self.telemetry
    }

    /// Analyses `text` as one batch.
    ///
    /// Per-sentence failures become [`Scored::Unavailable`] entries; the run
    /// itself never fails. Results are placed by sentence index regardless
    /// of completion order.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let run_id = Uuid::new_v4();
        let sentences: Arc<[Sentence]> = self.segmenter.segment(text).into();
        let _ = self.telemetry.log_run(
            LogLevel::Info,
            "analysis.start",
            run_id,
            json!({
                "sentences": sentences.len(),
                "classifier": self.classifier.name(),
                "max_concurrency": self.options.max_concurrency,
            }),
        );

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let deadline = self.options.classify_timeout;
        let tasks = sentences.iter().map(|sentence| {
            let text: Arc<str> = Arc::from(sentence.text.as_str());
            let scorer = Arc::clone(&self.scorer);
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                analyze_sentence(text, scorer, classifier, deadline).await
            })
        });

        let (sentiment, emotions): (Vec<_>, Vec<_>) = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|err| {
                    let failure = Failure::Aborted {
                        message: err.to_string(),
                    };
                    (
                        Scored::Unavailable(failure.clone()),
                        Scored::Unavailable(failure),
                    )
                })
            })
            .unzip();

        let sentiment = SentimentSeries::new(sentiment);
        self.report_unavailable(run_id, "sentiment", sentiment.iter().map(Scored::failure));
        self.report_unavailable(run_id, "emotion", emotions.iter().map(Scored::failure));

        let smoothed = SmoothedSeries::new(self.smooth(run_id, &sentiment));

        let stats = AnalysisStats {
            sentences: sentences.len(),
            sentiment_unavailable: sentiment.unavailable_indices().len(),
            emotion_unavailable: emotions.iter().filter(|e| !e.is_available()).count(),
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            started_at,
        };
        let _ = self.telemetry.log_run(
            LogLevel::Info,
            "analysis.complete",
            run_id,
            json!({
                "sentences": stats.sentences,
                "sentiment_unavailable": stats.sentiment_unavailable,
                "emotion_unavailable": stats.emotion_unavailable,
                "elapsed_ms": stats.elapsed_ms,
            }),
        );

        AnalysisResult {
            run_id,
            sentences,
            sentiment,
            emotions,
            smoothed,
            stats,
        }
    }

    fn smooth(&self, run_id: Uuid, sentiment: &SentimentSeries) -> Vec<f64> {
        let values = sentiment.values();
        match self.options.smoothing.try_smooth(&values) {
            Some(smoothed) => smoothed,
            None => {
                let _ = self.telemetry.log_run(
                    LogLevel::Debug,
                    "smoothing.fallback",
                    run_id,
                    json!({
                        "points": values.len(),
                        "poly_order": self.options.smoothing.poly_order,
                    }),
                );
                values
            }
        }
    }

    fn report_unavailable<'a>(
        &self,
        run_id: Uuid,
        which: &str,
        failures: impl Iterator<Item = Option<&'a Failure>>,
    ) {
        for (index, failure) in failures.enumerate() {
            if let Some(failure) = failure {
                let _ = self.telemetry.log_run(
                    LogLevel::Warn,
                    "analysis.sentence_unavailable",
                    run_id,
                    json!({ "index": index, "series": which, "failure": failure }),
                );
            }
        }
    }
}

async fn analyze_sentence(
    text: Arc<str>,
    scorer: Arc<dyn SentimentScorer>,
    classifier: Arc<dyn EmotionClassifier>,
    deadline: Duration,
) -> SentenceOutcome {
    let scoring = {
        let text = Arc::clone(&text);
        tokio::task::spawn_blocking(move || scorer.score(&text))
    };
    let classifying = tokio::time::timeout(deadline, classifier.classify(&text));
    let (score, emotion) = tokio::join!(scoring, classifying);

    let sentiment = match score {
        Ok(value) => Scored::Available(value),
        Err(err) => Scored::Unavailable(Failure::Aborted {
            message: err.to_string(),
        }),
    };
    let emotion = match emotion {
        Ok(Ok(distribution)) => Scored::Available(distribution),
        Ok(Err(ClassifierError::Distribution(err))) => Scored::Unavailable(Failure::Invalid {
            message: err.to_string(),
        }),
        Ok(Err(err)) => Scored::Unavailable(Failure::Capability {
            message: err.to_string(),
        }),
        Err(_) => Scored::Unavailable(Failure::Timeout {
            after_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }),
    };
    (sentiment, emotion)
}
