//! Handler for the `info_sistema_monitoramento` tool.

use rmcp::model::JsonObject;
use serde_json::json;

use crate::config::{CEMADEN_MAPA_BASE, CEMADEN_PAINEL_BASE, CEMADEN_SITE, TOTAL_MUNICIPIOS_MONITORADOS};
use crate::tools::{ToolFuture, ToolHandler, ToolResult};

/// Static description of CEMADEN's monitoring system. Always succeeds.
pub fn system_info() -> ToolResult {
    let painel = format!("{}/", CEMADEN_PAINEL_BASE);
    let mapa = format!("{}/", CEMADEN_MAPA_BASE);

    ToolResult::success(json!({
        "cemaden": {
            "nome_completo": "Centro Nacional de Monitoramento e Alertas de Desastres Naturais",
            "website": CEMADEN_SITE,
            "painel_alertas": painel,
            "mapa_interativo": mapa,
        },
        "monitoramento": {
            "total_municipios": TOTAL_MUNICIPIOS_MONITORADOS,
            "tipos_alerta": [
                {
                    "tipo": "Movimento de Massa",
                    "descricao": "Deslizamentos de terra, corridas de massa e outros movimentos geológicos",
                },
                {
                    "tipo": "Risco Hidrológico",
                    "descricao": "Enchentes, enxurradas, inundações e alagamentos",
                },
            ],
            "niveis_alerta": [
                {
                    "nivel": "Moderado",
                    "cor": "Amarelo",
                    "descricao": "Potencial de ocorrência de desastres",
                },
                {
                    "nivel": "Alto",
                    "cor": "Laranja",
                    "descricao": "Risco elevado de ocorrência de desastres",
                },
                {
                    "nivel": "Muito Alto",
                    "cor": "Vermelho",
                    "descricao": "Risco muito elevado de ocorrência de desastres",
                },
            ],
        },
        "rede_observacional": {
            "pluviometros_automaticos": "Medem chuva a cada 10 minutos",
            "pluviometros_comunitarios": "~1150 distribuídos em +300 municípios",
            "radares_meteorologicos": "9 radares de dupla polarização",
            "estacoes_hidrologicas": "Monitoram nível de rios",
        },
        "como_usar": {
            "alertas": format!("Acesse {} para ver alertas ativos", painel),
            "dados_chuva": format!("Acesse {} para dados de pluviômetros", mapa),
            "download_dados": "Disponível no Mapa Interativo por UF e município",
        },
    }))
}

/// Handler for the `info_sistema_monitoramento` tool.
#[derive(Debug, Default)]
pub struct SystemInfoHandler;

impl SystemInfoHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ToolHandler for SystemInfoHandler {
    fn name(&self) -> &'static str {
        "info_sistema_monitoramento"
    }

    fn title(&self) -> Option<&'static str> {
        Some("Sistema de Monitoramento do CEMADEN")
    }

    fn description(&self) -> &'static str {
        "Retorna informações completas sobre o sistema de monitoramento do CEMADEN, \
         incluindo tipos de alerta, níveis, rede observacional e como acessar os dados. \
         Útil para entender como funciona o sistema de alertas e monitoramento."
    }

    fn execute(&self, _args: JsonObject) -> ToolFuture<'_> {
        Box::pin(async { Ok(system_info()) })
    }
}
