//! Append-only side channel recording tool invocations.
//!
//! Implementations must never fail the caller: write errors are handled
//! inside `record` and only surface as debug-level diagnostics.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::debug;

const SEPARATOR_WIDTH: usize = 50;
const BANNER_WIDTH: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One tool call as written to the side channel.
#[derive(Debug, Clone)]
pub struct InvocationLogEntry {
    pub tool: String,
    pub arguments: Option<Map<String, Value>>,
    pub timestamp: DateTime<Local>,
}

impl InvocationLogEntry {
    pub fn now(tool: impl Into<String>, arguments: Option<Map<String, Value>>) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            timestamp: Local::now(),
        }
    }

    fn arguments_text(&self) -> String {
        match &self.arguments {
            Some(args) => serde_json::to_string(args).unwrap_or_else(|_| "<unprintable>".to_string()),
            None => "null".to_string(),
        }
    }
}

/// Events accepted by an invocation log.
#[derive(Debug, Clone, Copy)]
pub enum LogEvent<'a> {
    Startup { painel_url: &'a str, mapa_url: &'a str },
    Invocation(&'a InvocationLogEntry),
}

impl LogEvent<'_> {
    fn render(&self) -> String {
        match self {
            LogEvent::Startup {
                painel_url,
                mapa_url,
            } => {
                let line = "=".repeat(BANNER_WIDTH);
                format!(
                    "\n{line}\nServidor iniciado: {}\nPainel: {}\nMapa: {}\n{line}\n",
                    Local::now().format(TIMESTAMP_FORMAT),
                    painel_url,
                    mapa_url,
                )
            }
            LogEvent::Invocation(entry) => {
                let line = "=".repeat(SEPARATOR_WIDTH);
                format!(
                    "\n{line}\nFerramenta: {}\nArgumentos: {}\nHorário: {}\n{line}\n",
                    entry.tool,
                    entry.arguments_text(),
                    entry.timestamp.format(TIMESTAMP_FORMAT),
                )
            }
        }
    }
}

/// Best-effort sink for invocation records.
pub trait InvocationLog: Send + Sync {
    fn record(&self, event: LogEvent<'_>);
}

/// Appends free-text records to a file, creating it on first write.
#[derive(Debug, Clone)]
pub struct FileInvocationLog {
    path: PathBuf,
}

impl FileInvocationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }
}

impl InvocationLog for FileInvocationLog {
    fn record(&self, event: LogEvent<'_>) {
        if let Err(e) = self.append(&event.render()) {
            debug!(path = %self.path.display(), "Invocation log write failed: {}", e);
        }
    }
}
