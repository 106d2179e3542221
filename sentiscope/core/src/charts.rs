//! Renderer-agnostic chart payloads and the emotion colour palette.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    emotion::EmotionDistribution,
    types::{Scored, SentimentSeries, SmoothedSeries},
};

const DEFAULT_COLORS: &[(&str, &str)] = &[
    ("anger", "#FF6347"),
    ("joy", "#FFD700"),
    ("sadness", "#1E90FF"),
    ("fear", "#9370DB"),
    ("surprise", "#FFA500"),
    ("disgust", "#32CD32"),
    ("neutral", "#A9A9A9"),
];

const FALLBACK_COLORS: &[&str] = &[
    "#808080", "#8B4513", "#2E8B57", "#4682B4", "#D2691E", "#C71585", "#708090", "#B8860B",
];

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Label → colour mapping with a stable fallback for unknown labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionPalette {
    colors: IndexMap<String, String>,
}

impl Default for EmotionPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|(label, color)| ((*label).to_string(), (*color).to_string()))
                .collect(),
        }
    }
}

impl EmotionPalette {
    /// Default palette with `overrides` applied on top.
    #[must_use]
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut palette = Self::default();
        for (label, color) in overrides {
            palette.colors.insert(label.to_lowercase(), color.clone());
        }
        palette
    }

    /// Colour for `label`; unknown labels hash into a fixed fallback list, so
    /// the same label always gets the same colour.
    #[must_use]
    pub fn color_for(&self, label: &str) -> &str {
        let label = label.to_lowercase();
        self.colors
            .get(&label)
            .map_or_else(|| fallback_color(&label), String::as_str)
    }
}

fn fallback_color(label: &str) -> &'static str {
    let hash = label.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    let slot = usize::try_from(hash % FALLBACK_COLORS.len() as u64).unwrap_or(0);
    FALLBACK_COLORS[slot]
}

/// Emotion distribution of one sentence as bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    /// Labels in distribution order.
    pub labels: Vec<String>,
    /// Probabilities aligned with `labels`.
    pub values: Vec<f64>,
    /// Hex colours aligned with `labels`.
    pub colors: Vec<String>,
    /// Caption, usually the selected sentence.
    pub caption: String,
}

/// Marked point on the sentiment line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightPoint {
    /// Sentence index.
    pub index: usize,
    /// Raw sentiment at that index.
    pub value: f64,
}

/// Raw and smoothed sentiment trend across the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    /// Raw scores; unavailable entries read as `0.0`.
    pub raw: Vec<f64>,
    /// Smoothed scores, same length as `raw`.
    pub smoothed: Vec<f64>,
    /// Selected point, if its index was in range.
    pub highlight: Option<HighlightPoint>,
    /// Indices whose raw score was unavailable.
    pub gaps: Vec<usize>,
}

/// Any chart a surface can display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    /// Emotion bars.
    Bar(BarChart),
    /// Sentiment trend.
    Line(LineChart),
}

impl ChartPayload {
    /// Short name of the chart kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bar(_) => "bar",
            Self::Line(_) => "line",
        }
    }
}

impl From<BarChart> for ChartPayload {
    fn from(chart: BarChart) -> Self {
        Self::Bar(chart)
    }
}

impl From<LineChart> for ChartPayload {
    fn from(chart: LineChart) -> Self {
        Self::Line(chart)
    }
}

/// Turns analysis output into chart payloads.
#[derive(Debug, Clone, Default)]
pub struct ChartDataBuilder {
    palette: EmotionPalette,
}

impl ChartDataBuilder {
    /// Builder using `palette`.
    #[must_use]
    pub const fn new(palette: EmotionPalette) -> Self {
        Self { palette }
    }

    /// Palette in use.
    #[must_use]
    pub const fn palette(&self) -> &EmotionPalette {
        &self.palette
    }

    /// One bar per label, in distribution order.
    #[must_use]
    pub fn build_emotion_chart(
        &self,
        distribution: &EmotionDistribution,
        caption: impl Into<String>,
    ) -> BarChart {
        let (labels, values): (Vec<String>, Vec<f64>) = distribution
            .iter()
            .map(|(label, value)| (label.to_string(), value))
            .unzip();
        let colors = labels
            .iter()
            .map(|label| self.palette.color_for(label).to_string())
            .collect();
        BarChart {
            labels,
            values,
            colors,
            caption: caption.into(),
        }
    }

    /// Raw and smoothed lines; `highlight` outside `[0, len)` is ignored.
    #[must_use]
    pub fn build_sentiment_chart(
        &self,
        series: &SentimentSeries,
        smoothed: &SmoothedSeries,
        highlight: Option<usize>,
    ) -> LineChart {
        let raw = series.values();
        let highlight = highlight
            .filter(|index| *index < raw.len())
            .map(|index| HighlightPoint {
                index,
                value: raw[index],
            });
        LineChart {
            raw,
            smoothed: smoothed.as_slice().to_vec(),
            highlight,
            gaps: series.unavailable_indices(),
        }
    }

    /// Bar chart for an entry that may be unavailable.
    #[must_use]
    pub fn build_scored_emotion_chart(
        &self,
        distribution: &Scored<EmotionDistribution>,
        caption: &str,
    ) -> Scored<BarChart> {
        distribution
            .clone()
            .map(|dist| self.build_emotion_chart(&dist, caption))
    }
}
