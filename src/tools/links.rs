//! Handler for the `links_cemaden` tool.

use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::{Map, json};

use crate::tools::{ParamKind, ParamSpec, ToolFuture, ToolHandler, ToolResult, optional_str};

#[derive(Debug, Serialize)]
struct Link {
    nome: &'static str,
    url: &'static str,
    descricao: &'static str,
}

#[derive(Debug, Serialize)]
struct LinkCategory {
    #[serde(skip)]
    key: &'static str,
    titulo: &'static str,
    links: &'static [Link],
}

const CATALOG: &[LinkCategory] = &[
    LinkCategory {
        key: "alertas",
        titulo: "Sistema de Alertas",
        links: &[Link {
            nome: "Painel de Alertas",
            url: "https://painelalertas.cemaden.gov.br/",
            descricao: "Visualização de alertas ativos por estado e município",
        }],
    },
    LinkCategory {
        key: "dados",
        titulo: "Dados e Monitoramento",
        links: &[
            Link {
                nome: "Mapa Interativo",
                url: "https://mapainterativo.cemaden.gov.br/",
                descricao: "Dados de pluviômetros em tempo real e download de histórico",
            },
            Link {
                nome: "Site Oficial",
                url: "http://www.cemaden.gov.br",
                descricao: "Portal principal do CEMADEN",
            },
        ],
    },
    LinkCategory {
        key: "educacao",
        titulo: "CEMADEN Educação",
        links: &[Link {
            nome: "Portal Educação",
            url: "https://educacao.cemaden.gov.br/",
            descricao: "Projeto educacional sobre percepção de riscos",
        }],
    },
];

const PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "tipo",
    kind: ParamKind::String,
    description: "Categoria de links: 'alertas', 'dados' ou 'educacao'. Opcional.",
    required: false,
}];

/// Links for one category (matched case-insensitively), or the whole catalog.
pub fn useful_links(tipo: Option<&str>) -> ToolResult {
    let wanted = tipo.map(|t| t.trim().to_lowercase());
    if let Some(category) = wanted
        .as_deref()
        .and_then(|w| CATALOG.iter().find(|c| c.key == w))
    {
        return ToolResult::success(json!({
            "categoria": category.key,
            "titulo": category.titulo,
            "links": category.links,
        }));
    }

    let mut todas = Map::new();
    for category in CATALOG {
        todas.insert(category.key.to_string(), json!(category));
    }
    ToolResult::success(json!({ "todas_categorias": todas }))
}

/// Handler for the `links_cemaden` tool.
#[derive(Debug, Default)]
pub struct LinkCatalogHandler;

impl LinkCatalogHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ToolHandler for LinkCatalogHandler {
    fn name(&self) -> &'static str {
        "links_cemaden"
    }

    fn title(&self) -> Option<&'static str> {
        Some("Links Úteis do CEMADEN")
    }

    fn description(&self) -> &'static str {
        "Retorna links úteis do CEMADEN organizados por categoria. Categorias disponíveis: \
         alertas (painel de alertas ativos), dados (mapa interativo e dados de pluviômetros), \
         educacao (portal educacional sobre percepção de riscos). Se não especificar \
         categoria, retorna todos os links."
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn execute(&self, args: JsonObject) -> ToolFuture<'_> {
        Box::pin(async move { Ok(useful_links(optional_str(&args, "tipo"))) })
    }
}
