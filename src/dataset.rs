//! Monitored-municipality dataset.
//!
//! The dataset is a JSON object mapping a two-letter state code to the ordered
//! list of monitored municipality names. A copy is compiled into the binary;
//! an override file may replace it. The source is read at most once per
//! loader, and a missing or malformed file yields an empty table instead of
//! an error.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{info, warn};

/// Errors raised while reading the dataset file. Never escapes the loader.
#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read dataset: {}", e),
            Self::Parse(e) => write!(f, "failed to parse dataset: {}", e),
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Immutable mapping from state code to its monitored municipalities.
///
/// State codes are kept sorted; municipality order within a state is the
/// order of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MunicipalityTable {
    states: BTreeMap<String, Vec<String>>,
}

/// Trim and uppercase a user- or file-supplied state code.
pub fn normalize_state_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn is_state_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

impl MunicipalityTable {
    /// Build a table, normalizing keys and dropping entries that are not
    /// two-letter state codes.
    pub fn from_states<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        let mut states: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, municipios) in entries {
            let code = normalize_state_code(key.as_ref());
            if !is_state_code(&code) {
                warn!(key = key.as_ref(), "Ignoring dataset entry with invalid state code");
                continue;
            }
            states.entry(code).or_default().extend(municipios);
        }
        Self { states }
    }

    /// Parse the JSON representation of the dataset.
    pub fn parse(raw: &str) -> Result<Self, DatasetError> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut parsed = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let municipios: Vec<String> = serde_json::from_value(value)?;
            parsed.push((key, municipios));
        }
        Ok(Self::from_states(parsed))
    }

    /// Read and parse the dataset at `path`.
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of states in the table.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Sum of all per-state list lengths.
    pub fn municipality_count(&self) -> usize {
        self.states.values().map(Vec::len).sum()
    }

    /// State codes in lexicographic order.
    pub fn state_codes(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    /// Municipalities for an already-normalized state code.
    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.states.get(code).map(Vec::as_slice)
    }
}

/// Dataset compiled into the binary, used when no override file is given.
pub const BUNDLED_DATASET: &str = include_str!("../data/municipios_monitorados.json");

/// Where a loader takes its table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Bundled,
    File(PathBuf),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => write!(f, "<bundled>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the dataset on first use and hands out the cached table afterwards.
#[derive(Debug)]
pub struct DatasetLoader {
    source: DatasetSource,
    table: OnceLock<Arc<MunicipalityTable>>,
}

impl DatasetLoader {
    /// A loader reading the dataset file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DatasetSource::File(path.into()),
            table: OnceLock::new(),
        }
    }

    /// A loader parsing the dataset compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            source: DatasetSource::Bundled,
            table: OnceLock::new(),
        }
    }

    /// A loader whose table is already populated; nothing is ever parsed.
    pub fn preloaded(table: MunicipalityTable) -> Self {
        Self {
            source: DatasetSource::Bundled,
            table: OnceLock::from(Arc::new(table)),
        }
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    fn read_source(&self) -> Result<MunicipalityTable, DatasetError> {
        match &self.source {
            DatasetSource::Bundled => MunicipalityTable::parse(BUNDLED_DATASET),
            DatasetSource::File(path) => MunicipalityTable::read(path),
        }
    }

    /// Return the table, reading the source only on the first call.
    ///
    /// A failed read is cached as an empty table, so it is not retried.
    pub fn load(&self) -> Arc<MunicipalityTable> {
        self.table
            .get_or_init(|| {
                let table = match self.read_source() {
                    Ok(table) => {
                        info!(
                            source = %self.source,
                            states = table.state_count(),
                            municipalities = table.municipality_count(),
                            "Loaded municipality dataset"
                        );
                        table
                    }
                    Err(e) => {
                        warn!(source = %self.source, "Municipality dataset unavailable: {}", e);
                        MunicipalityTable::default()
                    }
                };
                Arc::new(table)
            })
            .clone()
    }
}
