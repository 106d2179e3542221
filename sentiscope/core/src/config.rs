//! TOML application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use shared_logging::LogLevel;

use crate::smoothing::{DEFAULT_MAX_WINDOW, DEFAULT_POLY_ORDER};

/// Complete configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Pipeline concurrency and deadlines.
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Trend smoothing parameters.
    #[serde(default)]
    pub smoothing: SmoothingSettings,
    /// Sentiment lexicon source.
    #[serde(default)]
    pub sentiment: SentimentSettings,
    /// Emotion classifier backend.
    #[serde(default)]
    pub classifier: ClassifierSettings,
    /// Structured logging.
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Colour overrides, label → `#RRGGBB`.
    #[serde(default)]
    pub palette: IndexMap<String, String>,
}

impl AppConfig {
    /// Loads and validates configuration from a TOML file. Relative log and
    /// lexicon paths resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config =
            Self::from_toml(&raw).with_context(|| format!("loading {}", path.display()))?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        for relative in [
            config.logging.path.as_mut(),
            config.sentiment.lexicon_path.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            if relative.is_relative() {
                *relative = source_dir.join(&*relative);
            }
        }
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and cross-field requirements.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_concurrency == 0 {
            bail!("pipeline.max_concurrency must be at least 1");
        }
        if self.pipeline.classify_timeout_ms == 0 {
            bail!("pipeline.classify_timeout_ms must be positive");
        }
        if self.smoothing.poly_order >= self.smoothing.max_window {
            bail!(
                "smoothing.poly_order ({}) must be below smoothing.max_window ({})",
                self.smoothing.poly_order,
                self.smoothing.max_window
            );
        }
        if self.classifier.kind == ClassifierKind::Http && self.classifier.endpoint.is_none() {
            bail!("classifier.kind = \"http\" requires classifier.endpoint");
        }
        for (label, color) in &self.palette {
            if !is_hex_color(color) {
                bail!("palette colour for {label:?} must be #RRGGBB, got {color:?}");
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// `[pipeline]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// Sentences analysed concurrently.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deadline for one classifier call, in milliseconds.
    #[serde(default = "default_classify_timeout_ms")]
    pub classify_timeout_ms: u64,
}

impl PipelineSettings {
    /// Classifier deadline as a [`Duration`].
    #[must_use]
    pub const fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            classify_timeout_ms: default_classify_timeout_ms(),
        }
    }
}

/// `[smoothing]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SmoothingSettings {
    /// Largest Savitzky–Golay window.
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    /// Fitted polynomial order.
    #[serde(default = "default_poly_order")]
    pub poly_order: usize,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            max_window: default_max_window(),
            poly_order: default_poly_order(),
        }
    }
}

/// `[sentiment]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentSettings {
    /// VADER-format lexicon replacing the built-in word list.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

/// Supported classifier backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Offline cue-word classifier.
    #[default]
    Keyword,
    /// Remote model endpoint.
    Http,
}

/// `[classifier]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierSettings {
    /// Backend to use.
    #[serde(default)]
    pub kind: ClassifierKind,
    /// Endpoint URL for the `http` backend.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Environment variable holding a bearer token.
    #[serde(default)]
    pub token_env: Option<String>,
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file; logging is off when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Lowest level written.
    #[serde(default)]
    pub min_level: LogLevel,
}

fn default_max_concurrency() -> usize {
    8
}

fn default_classify_timeout_ms() -> u64 {
    5_000
}

fn default_max_window() -> usize {
    DEFAULT_MAX_WINDOW
}

fn default_poly_order() -> usize {
    DEFAULT_POLY_ORDER
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.pipeline.max_concurrency, 8);
        assert_eq!(config.pipeline.classify_timeout(), Duration::from_secs(5));
        assert_eq!(config.smoothing.max_window, 200);
        assert_eq!(config.smoothing.poly_order, 3);
        assert_eq!(config.classifier.kind, ClassifierKind::Keyword);
        assert!(config.logging.path.is_none());
        assert_eq!(config.logging.min_level, LogLevel::Info);
    }

    #[test]
    fn parses_full_document() {
        let config = AppConfig::from_toml(
            r##"
            [pipeline]
            max_concurrency = 2
            classify_timeout_ms = 250

            [smoothing]
            max_window = 31

            [sentiment]
            lexicon_path = "/opt/lexicons/vader.txt"

            [classifier]
            kind = "http"
            endpoint = "http://localhost:8080/classify"
            token_env = "EMOTION_TOKEN"

            [logging]
            min_level = "debug"

            [palette]
            joy = "#00FF00"
            "##,
        )
        .unwrap();
        assert_eq!(config.pipeline.max_concurrency, 2);
        assert_eq!(config.smoothing.max_window, 31);
        assert_eq!(config.smoothing.poly_order, 3);
        assert_eq!(
            config.sentiment.lexicon_path,
            Some(PathBuf::from("/opt/lexicons/vader.txt"))
        );
        assert_eq!(config.classifier.kind, ClassifierKind::Http);
        assert_eq!(config.logging.min_level, LogLevel::Debug);
        assert_eq!(config.palette["joy"], "#00FF00");
    }

    #[test]
    fn rejects_invalid_values() {
        for raw in [
            "[pipeline]\nmax_concurrency = 0",
            "[pipeline]\nclassify_timeout_ms = 0",
            "[smoothing]\nmax_window = 3\npoly_order = 3",
            "[classifier]\nkind = \"http\"",
            "[palette]\njoy = \"gold\"",
            "[unknown]\nx = 1",
        ] {
            assert!(AppConfig::from_toml(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn load_resolves_relative_log_path() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sentiscope.toml");
        std::fs::write(
            &path,
            "[logging]\npath = \"logs/run.log\"\n[sentiment]\nlexicon_path = \"vader.txt\"\n",
        )
        .unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.logging.path, Some(tmp.path().join("logs/run.log")));
        assert_eq!(config.sentiment.lexicon_path, Some(tmp.path().join("vader.txt")));
    }
}
