//! JSON-lines command console over an analysed transcript.

use anyhow::{Context, Result};
use sentiscope_core::{AnalysisTelemetry, TranscriptSession};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_logging::LogLevel;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc::UnboundedSender,
};

/// Commands accepted from the console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleCommand {
    /// Keyword search.
    Search {
        /// Space-separated keywords.
        query: String,
    },
    /// Select a sentence and build its charts.
    Select {
        /// Sentence index.
        index: usize,
    },
    /// Print run statistics.
    Summary,
    /// Exit the loop.
    Quit,
}

/// Reads JSON-line commands and forwards them to the dispatcher.
pub struct ConsoleCommandReceiver {
    sender: UnboundedSender<ConsoleCommand>,
    telemetry: Option<AnalysisTelemetry>,
}

impl ConsoleCommandReceiver {
    /// Creates a new receiver.
    pub fn new(sender: UnboundedSender<ConsoleCommand>, telemetry: Option<AnalysisTelemetry>) -> Self {
        Self { sender, telemetry }
    }

    /// Runs until `quit` or end of input.
    pub async fn run<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let cmd: ConsoleCommand =
                serde_json::from_str(&line).with_context(|| format!("invalid console command JSON: {line}"))?;
            if matches!(cmd, ConsoleCommand::Quit) {
                break;
            }
            self.sender.send(cmd)?;
        }
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(LogLevel::Info, "console.receiver_shutdown", json!({}));
        }
        Ok(())
    }
}

/// Executes one command against the session and returns the JSON reply.
pub fn respond(session: &TranscriptSession, command: &ConsoleCommand) -> Value {
    match command {
        ConsoleCommand::Search { query } => {
            let hits = session.search(query);
            json!({ "type": "search", "query": query, "matches": hits })
        }
        ConsoleCommand::Select { index } => match session.on_select(*index) {
            Ok(charts) => json!({ "type": "select", "charts": &*charts }),
            Err(err) => json!({ "type": "error", "message": err.to_string() }),
        },
        ConsoleCommand::Summary => {
            let snapshot = session.snapshot();
            json!({ "type": "summary", "run_id": snapshot.run_id(), "stats": snapshot.stats() })
        }
        ConsoleCommand::Quit => json!({ "type": "quit" }),
    }
}
