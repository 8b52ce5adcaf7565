//! Handler for the `listar_municipios_monitorados` tool.

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::json;

use crate::config::TOTAL_MUNICIPIOS_MONITORADOS;
use crate::dataset::{DatasetLoader, MunicipalityTable, normalize_state_code};
use crate::tools::{ParamKind, ParamSpec, ToolFuture, ToolHandler, ToolResult, optional_str};

const FONTE: &str = "CEMADEN - Centro Nacional de Monitoramento e Alertas de Desastres Naturais";

const PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "estado",
    kind: ParamKind::String,
    description: "Sigla do estado (SP, RJ, MG, RS, PR, SC, BA, PE, CE, ES, etc.). Opcional.",
    required: false,
}];

/// List monitored municipalities, for one state or for all of them.
///
/// `estado` is trimmed and uppercased before lookup; the table is never
/// modified.
pub fn list_municipalities(table: &MunicipalityTable, estado: Option<&str>) -> ToolResult {
    if table.is_empty() {
        return ToolResult::failure(
            "Base de municípios monitorados indisponível: o arquivo de dados não pôde ser carregado.",
        )
        .with(
            "nota",
            format!(
                "O CEMADEN monitora {} municípios em todo o Brasil. \
                 Para a lista completa, acesse http://www2.cemaden.gov.br/",
                TOTAL_MUNICIPIOS_MONITORADOS
            ),
        );
    }

    let Some(estado) = estado else {
        return ToolResult::success(json!({
            "total_nacional": TOTAL_MUNICIPIOS_MONITORADOS,
            "total_municipal": table.municipality_count(),
            "total_estados": table.state_count(),
            "estados_disponiveis": table.state_codes(),
            "municipios_por_estado": table,
            "fonte": FONTE,
        }));
    };

    let code = normalize_state_code(estado);
    match table.get(&code) {
        Some(municipios) => ToolResult::success(json!({
            "estado": code,
            "total": municipios.len(),
            "municipios": municipios,
            "nota": format!(
                "Lista parcial de municípios monitorados. Total nacional: {} municípios.",
                TOTAL_MUNICIPIOS_MONITORADOS
            ),
            "fonte": FONTE,
        })),
        None => ToolResult::failure(format!(
            "Estado '{}' não encontrado na base de municípios monitorados.",
            code
        ))
        .with("estados_disponiveis", json!(table.state_codes())),
    }
}

/// Handler for the `listar_municipios_monitorados` tool.
pub struct MunicipalityListHandler {
    dataset: Arc<DatasetLoader>,
}

impl MunicipalityListHandler {
    pub fn new(dataset: Arc<DatasetLoader>) -> Self {
        Self { dataset }
    }
}

impl ToolHandler for MunicipalityListHandler {
    fn name(&self) -> &'static str {
        "listar_municipios_monitorados"
    }

    fn title(&self) -> Option<&'static str> {
        Some("Municípios Monitorados")
    }

    fn description(&self) -> &'static str {
        "Lista municípios brasileiros monitorados pelo CEMADEN. O CEMADEN monitora 959 \
         municípios vulneráveis a desastres naturais. Pode filtrar por estado específico \
         (use sigla: SP, RJ, MG, etc.)."
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn execute(&self, args: JsonObject) -> ToolFuture<'_> {
        Box::pin(async move {
            let table = self.dataset.load();
            Ok(list_municipalities(&table, optional_str(&args, "estado")))
        })
    }
}
