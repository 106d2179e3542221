use async_trait::async_trait;
use indexmap::IndexMap;

use super::{ClassifierError, EmotionClassifier, EmotionDistribution};

const NEUTRAL: &str = "neutral";

const CUES: &[(&str, &[&str])] = &[
    (
        "anger",
        &[
            "angry", "anger", "mad", "furious", "rage", "hate", "hated", "annoyed", "irritated",
            "outraged", "fight", "damn", "yell", "shut",
        ],
    ),
    (
        "disgust",
        &[
            "disgusting", "disgust", "gross", "nasty", "yuck", "eww", "revolting", "vile",
            "filthy", "sick", "creepy",
        ],
    ),
    (
        "fear",
        &[
            "afraid", "scared", "fear", "terrified", "frightened", "nervous", "worried", "danger",
            "dangerous", "panic", "scary", "help", "die",
        ],
    ),
    (
        "joy",
        &[
            "happy", "joy", "love", "glad", "great", "wonderful", "fun", "laugh", "smile",
            "excited", "delighted", "beautiful", "enjoy", "thanks", "nice", "good",
        ],
    ),
    (NEUTRAL, &[]),
    (
        "sadness",
        &[
            "sad", "cry", "crying", "tears", "lonely", "alone", "miss", "sorry", "grief",
            "depressed", "lost", "hurt", "unhappy", "dead", "goodbye",
        ],
    ),
    (
        "surprise",
        &[
            "wow", "surprised", "surprise", "unbelievable", "shocked", "suddenly", "whoa",
            "incredible", "unexpected", "amazing", "believe",
        ],
    ),
];

/// Offline classifier that counts cue words per label.
///
/// Every label keeps a small floor so the distribution always covers the
/// full label set; cue-free sentences lean neutral.
#[derive(Debug, Clone)]
pub struct KeywordEmotionClassifier {
    cues: IndexMap<String, Vec<String>>,
    neutral_weight: f64,
    floor: f64,
}

impl KeywordEmotionClassifier {
    /// Classifier over the seven-label English cue table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cues: CUES
                .iter()
                .map(|(label, words)| {
                    (
                        (*label).to_string(),
                        words.iter().map(|word| (*word).to_string()).collect(),
                    )
                })
                .collect(),
            neutral_weight: 1.0,
            floor: 0.05,
        }
    }

    /// Adds cue words to `label`, creating the label if it is new.
    #[must_use]
    pub fn with_cues(mut self, label: &str, words: &[&str]) -> Self {
        let entry = self.cues.entry(label.to_string()).or_default();
        entry.extend(words.iter().map(|word| word.to_lowercase()));
        self
    }

    /// Distribution for one sentence; never fails.
    #[must_use]
    pub fn distribution(&self, sentence: &str) -> EmotionDistribution {
        let tokens: Vec<String> = sentence
            .split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|word| !word.is_empty())
            .collect();

        let weights = self.cues.iter().map(|(label, words)| {
            let hits = tokens.iter().filter(|token| words.contains(*token)).count();
            let base = if label == NEUTRAL { self.neutral_weight } else { 0.0 };
            (label.clone(), self.floor + base + hits as f64)
        });
        // floor keeps every weight positive
        EmotionDistribution::new(weights).unwrap_or_else(|_| uniform_neutral())
    }
}

fn uniform_neutral() -> EmotionDistribution {
    EmotionDistribution(IndexMap::from([(NEUTRAL.to_string(), 1.0)]))
}

impl Default for KeywordEmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmotionClassifier for KeywordEmotionClassifier {
    async fn classify(&self, sentence: &str) -> Result<EmotionDistribution, ClassifierError> {
        Ok(self.distribution(sentence))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
