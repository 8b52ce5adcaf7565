//! Handler for the `consultar_painel_alertas` tool.

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::json;
use tracing::warn;

use crate::config::TOTAL_MUNICIPIOS_MONITORADOS;
use crate::panel::{PanelProbe, ProbeError};
use crate::tools::{ToolFuture, ToolHandler, ToolResult};

const NOTA_NAVEGADOR: &str =
    "Acesse o link diretamente no navegador para visualizar alertas ativos";

/// Check that the alerts panel at `url` answers, and describe it.
///
/// The response body is not inspected; the metadata block is constant.
pub async fn check_alerts_panel(probe: &dyn PanelProbe, url: &str) -> ToolResult {
    match probe.probe(url).await {
        Ok(()) => ToolResult::success(json!({
            "url_painel": url,
            "mensagem": format!(
                "O CEMADEN disponibiliza alertas através do painel interativo. \
                 Acesse {} para visualizar alertas ativos de movimento de massa \
                 e riscos hidrológicos.",
                url
            ),
            "info": {
                "descricao": "Painel mostra alertas por UF e município",
                "niveis": ["Moderado", "Alto", "Muito Alto"],
                "tipos": ["Movimento de Massa", "Risco Hidrológico"],
                "total_municipios_monitorados": TOTAL_MUNICIPIOS_MONITORADOS,
            },
            "acesso_direto": url,
        })),
        Err(e) => {
            warn!(url, "Alerts panel unreachable: {}", e);
            let (erro, tipo_erro) = match &e {
                ProbeError::Timeout(_) => (
                    format!("Tempo esgotado ao acessar painel de alertas ({})", e),
                    "timeout",
                ),
                ProbeError::Request(msg) => (
                    format!("Erro ao acessar painel de alertas: {}", msg),
                    "conexao",
                ),
            };
            ToolResult::failure(erro)
                .with("tipo_erro", tipo_erro)
                .with("url_alternativa", url)
                .with("nota", NOTA_NAVEGADOR)
        }
    }
}

/// Handler for the `consultar_painel_alertas` tool.
pub struct PanelCheckHandler {
    probe: Arc<dyn PanelProbe>,
    painel_url: String,
}

impl PanelCheckHandler {
    pub fn new(probe: Arc<dyn PanelProbe>, painel_url: impl Into<String>) -> Self {
        Self {
            probe,
            painel_url: painel_url.into(),
        }
    }
}

impl ToolHandler for PanelCheckHandler {
    fn name(&self) -> &'static str {
        "consultar_painel_alertas"
    }

    fn title(&self) -> Option<&'static str> {
        Some("Painel de Alertas do CEMADEN")
    }

    fn description(&self) -> &'static str {
        "Acessa o painel de alertas do CEMADEN para obter informações sobre alertas ativos \
         de desastres naturais no Brasil. O CEMADEN emite alertas de Movimento de Massa \
         (deslizamentos) e Risco Hidrológico (enchentes, enxurradas), com níveis Moderado, \
         Alto e Muito Alto. Retorna link direto para o painel interativo onde podem ser \
         consultados alertas por estado e município."
    }

    fn execute(&self, _args: JsonObject) -> ToolFuture<'_> {
        Box::pin(async move { Ok(check_alerts_panel(self.probe.as_ref(), &self.painel_url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubProbe(Result<(), ProbeError>);

    #[async_trait]
    impl PanelProbe for StubProbe {
        async fn probe(&self, _url: &str) -> Result<(), ProbeError> {
            self.0.clone()
        }
    }

    const URL: &str = "https://painelalertas.cemaden.gov.br/";

    #[tokio::test]
    async fn test_reachable_panel_returns_constant_metadata() {
        let result = check_alerts_panel(&StubProbe(Ok(())), URL).await;

        assert!(result.is_success());
        assert_eq!(result.get("url_painel"), Some(&json!(URL)));
        assert_eq!(result.get("acesso_direto"), Some(&json!(URL)));
        let info = result.get("info").unwrap();
        assert_eq!(info["total_municipios_monitorados"], json!(959));
        assert_eq!(info["niveis"], json!(["Moderado", "Alto", "Muito Alto"]));
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable() {
        let probe = StubProbe(Err(ProbeError::Timeout(Duration::from_secs(15))));
        let result = check_alerts_panel(&probe, URL).await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("timeout"));
        assert_eq!(result.get("tipo_erro"), Some(&json!("timeout")));
        assert_eq!(result.get("url_alternativa"), Some(&json!(URL)));
    }

    #[tokio::test]
    async fn test_connection_error_keeps_message_and_fallback() {
        let probe = StubProbe(Err(ProbeError::Request("connection refused".to_string())));
        let result = check_alerts_panel(&probe, URL).await;

        assert!(!result.is_success());
        assert_eq!(
            result.error(),
            Some("Erro ao acessar painel de alertas: connection refused")
        );
        assert_eq!(result.get("tipo_erro"), Some(&json!("conexao")));
        assert_eq!(result.get("url_alternativa"), Some(&json!(URL)));
        assert!(result.get("nota").is_some());
    }

    #[tokio::test]
    async fn test_handler_uses_configured_url() {
        let handler = PanelCheckHandler::new(Arc::new(StubProbe(Ok(()))), "http://localhost:1/");
        let result = handler.execute(JsonObject::new()).await.unwrap();
        assert_eq!(result.get("url_painel"), Some(&json!("http://localhost:1/")));
    }
}
