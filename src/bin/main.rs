use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::model::JsonObject;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use cemaden_monitor::config::{CEMADEN_PAINEL_BASE, DEFAULT_LOG_FILE, TIMEOUT_SEGUNDOS};
use cemaden_monitor::{ServerConfig, announce_startup, create_server};

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "cemaden-monitor")]
#[command(about = "MCP server with CEMADEN alert and monitoring information")]
struct Cli {
    /// Municipality dataset (JSON object of state code -> names)
    #[arg(long, global = true, env = "CEMADEN_DATASET")]
    dataset: Option<PathBuf>,
    /// Append-only invocation log
    #[arg(long, global = true, env = "CEMADEN_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
    /// Alerts panel base URL
    #[arg(long, global = true, env = "CEMADEN_PAINEL_URL", default_value = CEMADEN_PAINEL_BASE)]
    painel_url: String,
    /// Panel check timeout in seconds
    #[arg(long, global = true, env = "CEMADEN_TIMEOUT_SECS", default_value_t = TIMEOUT_SEGUNDOS)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (for use in the host's MCP config)
    McpStdio,
    /// Run as an MCP HTTP server
    McpHttp {
        /// Bind address, e.g. 127.0.0.1:3943
        #[arg(long, default_value = "127.0.0.1:3943")]
        bind: String,
    },
    /// Print the tool descriptors
    Tools,
    /// Invoke one tool and print its payload
    Call {
        tool: String,
        /// Arguments as a JSON object, e.g. '{"estado": "SP"}'
        #[arg(long)]
        args: Option<String>,
    },
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            painel_url: self.painel_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            dataset_path: self.dataset.clone(),
            log_path: self.log_file.clone(),
            mapa_url: defaults.mapa_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stdio transport, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cemaden_monitor=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = cli.server_config();

    match cli.command {
        Commands::McpStdio => {
            let server = create_server(&config)?;
            announce_startup(&config);

            let service = server
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            tokio::select! {
                quit = service.waiting() => {
                    quit?;
                    info!("MCP stdio server session ended");
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                }
            }
        }
        Commands::McpHttp { bind } => {
            let server = create_server(&config)?;
            announce_startup(&config);
            cemaden_monitor::server::start_mcp_http(server, &bind).await?;
        }
        Commands::Tools => {
            let server = create_server(&config)?;
            let descriptors = server.tool_registry().descriptors();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Commands::Call { tool, args } => {
            let args: Option<JsonObject> = args
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("--args must be a JSON object")?;

            let server = create_server(&config)?;
            let text = server.tool_registry().call_tool(&tool, args).await?;
            println!("{}", text);
        }
    }

    Ok(())
}
