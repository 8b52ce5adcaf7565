// Core modules
pub mod config;
pub mod dataset;
pub mod invocation_log;
pub mod panel;

pub mod server;
pub mod tools;

// Re-export key types and functions
pub use config::ServerConfig;
pub use dataset::{DatasetLoader, MunicipalityTable};
pub use invocation_log::{FileInvocationLog, InvocationLog, InvocationLogEntry, LogEvent};
pub use panel::{HttpPanelProbe, PanelProbe, ProbeError};
pub use server::CemadenServer;
pub use tools::{DispatchError, ToolDescriptor, ToolHandler, ToolRegistry, ToolResult};

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use tools::{LinkCatalogHandler, MunicipalityListHandler, PanelCheckHandler, SystemInfoHandler};

/// Build the fixed, ordered set of CEMADEN tools.
pub fn build_registry(
    config: &ServerConfig,
    dataset: Arc<DatasetLoader>,
    probe: Arc<dyn PanelProbe>,
    log: Arc<dyn InvocationLog>,
) -> ToolRegistry {
    ToolRegistry::new(log)
        .register_handler(PanelCheckHandler::new(probe, config.painel_page()))
        .register_handler(MunicipalityListHandler::new(dataset))
        .register_handler(SystemInfoHandler::new())
        .register_handler(LinkCatalogHandler::new())
}

/// Convenience function to create a fully configured MCP server.
///
/// Loads the municipality dataset up front so the first tool call does no I/O.
pub fn create_server(config: &ServerConfig) -> Result<CemadenServer> {
    let dataset = Arc::new(match &config.dataset_path {
        Some(path) => DatasetLoader::new(path),
        None => DatasetLoader::bundled(),
    });
    let table = dataset.load();
    info!(
        states = table.state_count(),
        municipalities = table.municipality_count(),
        "Municipality dataset ready"
    );

    let probe = Arc::new(HttpPanelProbe::new(config.timeout)?);
    let log = Arc::new(FileInvocationLog::new(&config.log_path));
    let registry = build_registry(config, dataset, probe, log);

    Ok(CemadenServer::new(Arc::new(registry)))
}

/// Write the startup banner to the invocation log and the diagnostic stream.
pub fn announce_startup(config: &ServerConfig) {
    FileInvocationLog::new(&config.log_path).record(LogEvent::Startup {
        painel_url: &config.painel_url,
        mapa_url: &config.mapa_url,
    });
    info!(
        painel = %config.painel_url,
        mapa = %config.mapa_url,
        log = %config.log_path.display(),
        "CEMADEN MCP server started"
    );
}
