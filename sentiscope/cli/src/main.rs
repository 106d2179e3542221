mod console;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sentiscope_core::{
    AppConfig, ChartPayload, ChartRenderer, JsonFileSurface, Scored, TranscriptSession,
};
use serde_json::json;
use tokio::{runtime::Runtime, sync::mpsc};

use crate::console::{respond, ConsoleCommandReceiver};

#[derive(Parser, Debug)]
#[command(name = "sentiscope", version, about = "Sentence-level sentiment and emotion analysis for transcripts")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Transcript file; read from stdin when omitted.
    #[arg(long, short, global = true)]
    input: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints every sentence with its scores and the run statistics.
    Summary,
    /// Lists sentences containing all keywords.
    Search {
        /// Keywords; matched case-insensitively as substrings.
        terms: Vec<String>,
    },
    /// Builds the charts for one sentence.
    Select {
        index: usize,
        /// Also write the chart payloads as JSON files into this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Reads JSON-line commands from stdin; requires --input.
    Console,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if matches!(cli.command, Commands::Console) && cli.input.is_none() {
        bail!("console mode reads commands from stdin; pass the transcript with --input");
    }
    let text = read_transcript(cli.input.as_deref())?;

    let runtime = Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async move {
        let session = TranscriptSession::from_config(&text, &config).await?;
        match cli.command {
            Commands::Summary => print_summary(&session),
            Commands::Search { terms } => {
                let reply = respond(
                    &session,
                    &console::ConsoleCommand::Search {
                        query: terms.join(" "),
                    },
                );
                println!("{}", serde_json::to_string_pretty(&reply)?);
                Ok(())
            }
            Commands::Select { index, out_dir } => select(&session, index, out_dir.as_deref()),
            Commands::Console => run_console(&session).await,
        }
    })
}

fn read_transcript(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading transcript {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading transcript from stdin")?;
            Ok(text)
        }
    }
}

fn print_summary(session: &TranscriptSession) -> Result<()> {
    let snapshot = session.snapshot();
    let smoothed = snapshot.smoothed().as_slice();
    let rows: Vec<_> = snapshot
        .sentences()
        .iter()
        .map(|sentence| {
            let i = sentence.index;
            let dominant = match &snapshot.emotions()[i] {
                Scored::Available(dist) => dist.dominant().map(|(label, p)| json!({ "label": label, "p": p })),
                Scored::Unavailable(_) => None,
            };
            json!({
                "index": i,
                "text": sentence.text,
                "sentiment": snapshot.sentiment().get(i),
                "smoothed": smoothed[i],
                "dominant_emotion": dominant,
            })
        })
        .collect();
    let report = json!({
        "run_id": snapshot.run_id(),
        "stats": snapshot.stats(),
        "sentences": rows,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn select(session: &TranscriptSession, index: usize, out_dir: Option<&Path>) -> Result<()> {
    let charts = session.on_select(index)?;
    let mut written = Vec::new();
    if let Some(dir) = out_dir {
        let mut sentiment = ChartRenderer::new(JsonFileSurface::with_prefix(dir, "sentiment")?);
        written.push(sentiment.update(&ChartPayload::Line(charts.sentiment.clone()))?.clone());
        if let Scored::Available(bar) = &charts.emotion {
            let mut emotion = ChartRenderer::new(JsonFileSurface::with_prefix(dir, "emotion")?);
            written.push(emotion.update(&ChartPayload::Bar(bar.clone()))?.clone());
        }
    }
    let reply = json!({ "charts": &*charts, "files": written });
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn run_console(session: &TranscriptSession) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let receiver = ConsoleCommandReceiver::new(tx, Some(session.telemetry().clone()));
    let reader = tokio::spawn(async move {
        receiver
            .run(tokio::io::BufReader::new(tokio::io::stdin()))
            .await
    });
    while let Some(command) = rx.recv().await {
        println!("{}", serde_json::to_string(&respond(session, &command))?);
    }
    reader.await.context("console reader task failed")?
}
