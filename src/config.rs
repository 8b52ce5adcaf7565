//! Fixed endpoints and runtime configuration for the CEMADEN server.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the public alerts panel.
pub const CEMADEN_PAINEL_BASE: &str = "https://painelalertas.cemaden.gov.br";

/// Base URL of the interactive rain-gauge map.
pub const CEMADEN_MAPA_BASE: &str = "https://mapainterativo.cemaden.gov.br";

/// Institutional website.
pub const CEMADEN_SITE: &str = "http://www.cemaden.gov.br";

/// Outbound timeout for the panel reachability check, in seconds.
pub const TIMEOUT_SEGUNDOS: u64 = 15;

/// Number of municipalities monitored nationwide.
pub const TOTAL_MUNICIPIOS_MONITORADOS: u32 = 959;

/// Server name announced during the MCP handshake.
pub const SERVER_NAME: &str = "cemaden-monitor-server";

/// Default side-channel log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "cemaden_mcp_debug.log";

/// Runtime configuration shared by the composition root.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub painel_url: String,
    pub mapa_url: String,
    pub timeout: Duration,
    /// Dataset file overriding the one compiled into the binary.
    pub dataset_path: Option<PathBuf>,
    pub log_path: PathBuf,
}

impl ServerConfig {
    /// Panel URL with a trailing slash, as handed out to users.
    pub fn painel_page(&self) -> String {
        format!("{}/", self.painel_url.trim_end_matches('/'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            painel_url: CEMADEN_PAINEL_BASE.to_string(),
            mapa_url: CEMADEN_MAPA_BASE.to_string(),
            timeout: Duration::from_secs(TIMEOUT_SEGUNDOS),
            dataset_path: None,
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}
