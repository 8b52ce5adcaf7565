//! MCP server implementation using rmcp.
//!
//! Exposes the tool registry over the stdio transport (via `ServiceExt::serve`)
//! or as a streamable HTTP endpoint.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};

use crate::config::SERVER_NAME;
use crate::tools::{DispatchError, ToolRegistry};

const INSTRUCTIONS: &str = "Servidor de consulta ao CEMADEN (Centro Nacional de Monitoramento e \
     Alertas de Desastres Naturais). Ferramentas: consultar_painel_alertas verifica o painel de \
     alertas; listar_municipios_monitorados lista municípios monitorados, opcionalmente por estado; \
     info_sistema_monitoramento descreve tipos e níveis de alerta; links_cemaden retorna links úteis.";

/// MCP server that delegates every tool call to the registry.
#[derive(Clone)]
pub struct CemadenServer {
    tool_registry: Arc<ToolRegistry>,
}

impl CemadenServer {
    pub fn new(tool_registry: Arc<ToolRegistry>) -> Self {
        Self { tool_registry }
    }

    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Dispatch a tool call and wrap the text payload for the host.
    ///
    /// An unknown tool name is returned as an `invalid_params` protocol error.
    pub async fn invoke(
        &self,
        name: &str,
        args: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match self.tool_registry.call_tool(name, args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e @ DispatchError::UnknownTool(_)) => {
                tracing::warn!("{}", e);
                Err(McpError::invalid_params(e.to_string(), None))
            }
        }
    }
}

impl ServerHandler for CemadenServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments;

        async move { self.invoke(&tool_name, args).await }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

/// Serve the MCP streamable HTTP endpoint at `/mcp` until Ctrl-C.
pub async fn start_mcp_http(server: CemadenServer, bind: &str) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new().nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("MCP HTTP server listening on http://{}/mcp", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Interrupt received, shutting down HTTP server");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetLoader, MunicipalityTable};
    use crate::invocation_log::FileInvocationLog;
    use crate::panel::{PanelProbe, ProbeError};
    use async_trait::async_trait;
    use rmcp::ServiceExt;
    use serde_json::{Value, json};

    struct UnreachableProbe;

    #[async_trait]
    impl PanelProbe for UnreachableProbe {
        async fn probe(&self, _url: &str) -> std::result::Result<(), ProbeError> {
            Err(ProbeError::Request("dns error".to_string()))
        }
    }

    fn test_server(dir: &tempfile::TempDir) -> CemadenServer {
        let config = crate::config::ServerConfig {
            log_path: dir.path().join("debug.log"),
            ..Default::default()
        };
        let table = MunicipalityTable::from_states(vec![
            ("SP", vec!["Santos".to_string(), "Campinas".to_string()]),
            ("PE", vec!["Recife".to_string()]),
        ]);
        let registry = crate::build_registry(
            &config,
            Arc::new(DatasetLoader::preloaded(table)),
            Arc::new(UnreachableProbe),
            Arc::new(FileInvocationLog::new(&config.log_path)),
        );
        CemadenServer::new(Arc::new(registry))
    }

    fn payload(result: &CallToolResult) -> Value {
        let text = &result.content[0].as_text().unwrap().text;
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_invoke_returns_single_text_block() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let mut args = JsonObject::new();
        args.insert("estado".to_string(), json!("pe"));
        let result = server
            .invoke("listar_municipios_monitorados", Some(args))
            .await
            .unwrap();

        assert_eq!(result.content.len(), 1);
        let value = payload(&result);
        assert_eq!(value["sucesso"], json!(true));
        assert_eq!(value["municipios"], json!(["Recife"]));
    }

    #[tokio::test]
    async fn test_recovered_failure_is_still_a_payload() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let result = server.invoke("consultar_painel_alertas", None).await.unwrap();
        let value = payload(&result);
        assert_eq!(value["sucesso"], json!(false));
        assert_eq!(value["tipo_erro"], json!("conexao"));
        assert_eq!(value["url_alternativa"], json!("https://painelalertas.cemaden.gov.br/"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let err = server.invoke("apagar_tudo", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("Ferramenta desconhecida: apagar_tudo"));

        let log = std::fs::read_to_string(dir.path().join("debug.log")).unwrap();
        assert!(log.contains("Ferramenta: apagar_tudo"));
    }

    #[tokio::test]
    async fn test_tools_are_listed_over_the_transport() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let (client_stream, server_stream) = tokio::io::duplex(8192);
        let (server_read, server_write) = tokio::io::split(server_stream);
        let (client_read, client_write) = tokio::io::split(client_stream);

        let server_handle = tokio::spawn(async move {
            let running = server.serve((server_read, server_write)).await.unwrap();
            let _ = running.waiting().await;
        });

        let client = ().serve((client_read, client_write)).await.unwrap();
        let info = client.peer_info().cloned().unwrap();
        assert_eq!(info.server_info.name, SERVER_NAME);

        let tools = client.list_all_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();
        assert_eq!(
            names,
            vec![
                "consultar_painel_alertas",
                "listar_municipios_monitorados",
                "info_sistema_monitoramento",
                "links_cemaden",
            ]
        );
        let municipios = &tools[1];
        assert_eq!(
            municipios.input_schema["properties"]["estado"]["type"],
            json!("string")
        );

        client.cancel().await.unwrap();
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), server_handle).await;
    }
}
