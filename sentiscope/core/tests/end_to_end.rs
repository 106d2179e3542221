use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sentiscope_core::{
    charts::ChartPayload, pipeline::PipelineOptions, AnalysisPipeline, AppConfig,
    ChartDataBuilder, ChartRenderer, ClassifierError, EmotionClassifier, EmotionDistribution,
    Failure, JsonFileSurface, KeywordEmotionClassifier, LexiconSentimentScorer, SavitzkyGolay,
    Scored, SessionError, TranscriptSession,
};
use tempfile::tempdir;

/// Keyword classifier that refuses sentences mentioning "static".
struct FlakyClassifier(KeywordEmotionClassifier);

#[async_trait]
impl EmotionClassifier for FlakyClassifier {
    async fn classify(&self, sentence: &str) -> Result<EmotionDistribution, ClassifierError> {
        if sentence.contains("static") {
            return Err(ClassifierError::Unavailable("line noise".into()));
        }
        self.0.classify(sentence).await
    }
}

fn flaky_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(
        Arc::new(LexiconSentimentScorer::new()),
        Arc::new(FlakyClassifier(KeywordEmotionClassifier::new())),
    )
    .with_options(PipelineOptions {
        max_concurrency: 2,
        classify_timeout: Duration::from_secs(2),
        smoothing: SavitzkyGolay::default(),
    })
}

const TRANSCRIPT: &str = "Dr. Smith was so happy to see you!\n\nThere was static on the line. \
                          I'm scared of the dark... but the night was calm. Was it? Yes.";

#[tokio::test]
async fn failed_classification_keeps_collections_aligned() {
    let session = TranscriptSession::initialize(TRANSCRIPT, flaky_pipeline(), ChartDataBuilder::default())
        .await
        .unwrap();

    let sentences = session.sentences();
    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Dr. Smith was so happy to see you!",
            "There was static on the line.",
            "I'm scared of the dark... but the night was calm.",
            "Was it?",
            "Yes.",
        ]
    );
    assert!(sentences.iter().enumerate().all(|(i, s)| s.index == i));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.sentiment().len(), 5);
    assert_eq!(snapshot.emotions().len(), 5);
    assert_eq!(snapshot.smoothed().len(), 5);
    assert!(matches!(
        session.emotion_distribution(1).unwrap(),
        Scored::Unavailable(Failure::Capability { .. })
    ));
    assert!(session.emotion_distribution(0).unwrap().is_available());
    assert_eq!(snapshot.stats().emotion_unavailable, 1);

    let charts = session.on_select(1).unwrap();
    assert!(!charts.emotion.is_available());
    assert_eq!(charts.sentiment.highlight.map(|h| h.index), Some(1));
}

#[tokio::test]
async fn second_of_three_sentences_fails_classification() {
    let text = "What a lovely morning. Then static took over the call. We laughed about it later.";
    let result = flaky_pipeline().analyze(text).await;
    assert_eq!(result.len(), 3);
    assert_eq!(result.sentiment().len(), 3);
    assert_eq!(result.emotions().len(), 3);
    assert!(result.emotions()[0].is_available());
    assert!(!result.emotions()[1].is_available());
    assert!(result.emotions()[2].is_available());
    assert!(result.sentiment().iter().all(Scored::is_available));
    for emotion in result.emotions().iter().filter_map(Scored::available) {
        assert!((emotion.total() - 1.0).abs() < 1e-3);
    }
    assert!(result
        .sentiment()
        .values()
        .iter()
        .all(|v| (-1.0..=1.0).contains(v)));
}

#[tokio::test]
async fn search_matches_are_a_subset_in_order() {
    let session = TranscriptSession::initialize(TRANSCRIPT, flaky_pipeline(), ChartDataBuilder::default())
        .await
        .unwrap();
    let all = session.sentences();

    for query in ["the", "WAS", "the was", "dark night", "smith", "zebra", ""] {
        let hits = session.search(query);
        let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let positions: Vec<usize> = hits.iter().map(|s| s.index).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{query:?} out of order");
        for hit in &hits {
            assert_eq!(&all[hit.index], hit);
            let folded = hit.text.to_lowercase();
            assert!(tokens.iter().all(|t| folded.contains(t.as_str())));
        }
        let expected = if tokens.is_empty() {
            0
        } else {
            all.iter()
                .filter(|s| tokens.iter().all(|t| s.text.to_lowercase().contains(t.as_str())))
                .count()
        };
        assert_eq!(hits.len(), expected, "{query:?}");
    }
    assert_eq!(session.search("dark night").len(), 1);
}

#[tokio::test]
async fn selection_errors_leave_state_untouched() {
    let session = TranscriptSession::initialize(TRANSCRIPT, flaky_pipeline(), ChartDataBuilder::default())
        .await
        .unwrap();
    assert!(session.current_charts().is_none());
    assert!(matches!(
        session.on_select(usize::MAX),
        Err(SessionError::IndexOutOfRange { len: 5, .. })
    ));
    assert!(session.current_charts().is_none());

    let chosen = session.on_select(0).unwrap();
    assert!(session.on_select(99).is_err());
    assert_eq!(session.current_charts(), Some(chosen));
}

#[tokio::test]
async fn selected_charts_render_to_json_files() {
    let tmp = tempdir().unwrap();
    let session = TranscriptSession::initialize(TRANSCRIPT, flaky_pipeline(), ChartDataBuilder::default())
        .await
        .unwrap();
    let charts = session.on_select(0).unwrap();

    let mut bars = ChartRenderer::new(JsonFileSurface::with_prefix(tmp.path(), "emotion").unwrap());
    let mut lines = ChartRenderer::new(JsonFileSurface::with_prefix(tmp.path(), "sentiment").unwrap());
    let bar = charts.emotion.available().unwrap().clone();
    let bar_path = bars.update(&ChartPayload::Bar(bar)).unwrap().clone();
    let line_path = lines
        .update(&ChartPayload::Line(charts.sentiment.clone()))
        .unwrap()
        .clone();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&bar_path).unwrap()).unwrap();
    assert_eq!(written["kind"], "bar");
    assert_eq!(written["caption"], "Dr. Smith was so happy to see you!");
    assert!(line_path.exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn session_from_config_applies_palette() {
    let config = AppConfig::from_toml("[palette]\njoy = \"#123456\"\n").unwrap();
    let session = TranscriptSession::from_config("I am so happy today.", &config)
        .await
        .unwrap();
    let charts = session.on_select(0).unwrap();
    let bar = charts.emotion.available().unwrap();
    let joy = bar.labels.iter().position(|l| l == "joy").unwrap();
    assert_eq!(bar.colors[joy], "#123456");
}
