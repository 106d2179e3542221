use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Builder for analysis telemetry.
pub struct AnalysisTelemetryBuilder {
    component: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl AnalysisTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            log_path: None,
            min_level: LogLevel::default(),
        }
    }

    /// Sets the log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<AnalysisTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(JsonLogger::new(path)?.with_min_level(self.min_level)),
            None => None,
        };
        Ok(AnalysisTelemetry {
            inner: Arc::new(TelemetryInner {
                component: self.component,
                logger,
            }),
        })
    }
}

/// Telemetry handle shared by the pipeline and session.
#[derive(Clone)]
pub struct AnalysisTelemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    component: String,
    logger: Option<JsonLogger>,
}

impl fmt::Debug for AnalysisTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisTelemetry")
            .field("component", &self.inner.component)
            .field("logging", &self.inner.logger.is_some())
            .finish()
    }
}

impl AnalysisTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(component: impl Into<String>) -> AnalysisTelemetryBuilder {
        AnalysisTelemetryBuilder::new(component)
    }

    /// Handle that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                component: "sentiscope".into(),
                logger: None,
            }),
        }
    }

    /// Logs structured metadata.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        self.write(level, message, None, metadata)
    }

    /// Logs structured metadata tagged with an analysis run id.
    pub fn log_run(
        &self,
        level: LogLevel,
        message: &str,
        run_id: impl fmt::Display,
        metadata: Value,
    ) -> Result<()> {
        self.write(level, message, Some(run_id.to_string()), metadata)
    }

    fn write(
        &self,
        level: LogLevel,
        message: &str,
        run_id: Option<String>,
        metadata: Value,
    ) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let mut record = LogRecord::new(&self.inner.component, level, message).with_fields(metadata);
            record.run_id = run_id;
            logger.log(&record)?;
        }
        Ok(())
    }
}
