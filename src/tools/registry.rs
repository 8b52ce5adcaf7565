//! Tool registry and dispatcher.
//!
//! Provides the `ToolHandler` trait implemented by each tool and a
//! `ToolRegistry` that validates tool names, invokes handlers, and writes
//! every call to the invocation log.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use rmcp::model::{JsonObject, Tool as McpTool};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::invocation_log::{InvocationLog, InvocationLogEntry, LogEvent};
use crate::tools::ToolResult;

/// Future returned by `ToolHandler::execute`.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<ToolResult>> + Send + 'a>>;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
        }
    }
}

/// One entry of a tool's input contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

/// Name, description and input contract of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// JSON-Schema object advertised to the host.
    pub fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));

        let mut properties = serde_json::Map::new();
        for param in self.params {
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.kind.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema
    }
}

/// Trait for handling tool invocations.
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's name (e.g., "links_cemaden").
    fn name(&self) -> &'static str;

    /// Returns the tool's human-readable title.
    fn title(&self) -> Option<&'static str> {
        None
    }

    fn description(&self) -> &'static str;

    /// Parameters accepted by the tool. All tools here take optional ones only.
    fn params(&self) -> &'static [ParamSpec] {
        &[]
    }

    /// Executes the tool. Missing arguments are absent, never an error.
    fn execute(&self, args: JsonObject) -> ToolFuture<'_>;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name(),
            description: self.description(),
            params: self.params(),
        }
    }

    /// Converts this handler to an `McpTool` for use in `list_tools`.
    fn to_mcp_tool(&self) -> McpTool {
        let descriptor = self.descriptor();
        let mut tool = McpTool::new(
            descriptor.name,
            descriptor.description,
            Arc::new(descriptor.input_schema()),
        );
        tool.title = self.title().map(|s| s.to_string());
        tool
    }
}

/// Request-level dispatch failures. These never become a `ToolResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnknownTool(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "Ferramenta desconhecida: {}", name),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Ordered, fixed set of tool handlers plus the invocation side channel.
#[derive(Clone)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    log: Arc<dyn InvocationLog>,
}

impl ToolRegistry {
    /// Create an empty registry writing invocations to `log`.
    pub fn new(log: Arc<dyn InvocationLog>) -> Self {
        Self {
            handlers: Vec::new(),
            log,
        }
    }

    /// Register a handler. A handler with the same name is replaced in place.
    pub fn register_handler<T: ToolHandler + 'static>(mut self, handler: T) -> Self {
        let handler: Arc<dyn ToolHandler> = Arc::new(handler);
        match self.handlers.iter().position(|h| h.name() == handler.name()) {
            Some(idx) => self.handlers[idx] = handler,
            None => self.handlers.push(handler),
        }
        self
    }

    /// Get a tool handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.iter().find(|h| h.name() == name).cloned()
    }

    /// Registered tool names in registration order.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.handlers.iter().map(|h| h.descriptor()).collect()
    }

    /// Get all registered tools as `McpTool` instances for `list_tools`.
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.handlers.iter().map(|h| h.to_mcp_tool()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run a tool and return its structured result.
    ///
    /// The call is logged before the name is resolved. Handler errors are
    /// folded into a failed `ToolResult`; only an unknown name is an `Err`.
    pub async fn dispatch(
        &self,
        name: &str,
        args: Option<JsonObject>,
    ) -> Result<ToolResult, DispatchError> {
        let entry = InvocationLogEntry::now(name, args.clone());
        self.log.record(LogEvent::Invocation(&entry));
        info!(tool = name, arguments = ?entry.arguments, "Executing tool");

        let handler = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        match handler.execute(args.unwrap_or_default()).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = name, "Tool handler failed: {}", e);
                Ok(ToolResult::failure(e.to_string()))
            }
        }
    }

    /// Run a tool and render its result as the text payload sent to the host.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Option<JsonObject>,
    ) -> Result<String, DispatchError> {
        Ok(self.dispatch(name, args).await?.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLog {
        tools: Mutex<Vec<String>>,
    }

    impl InvocationLog for RecordingLog {
        fn record(&self, event: LogEvent<'_>) {
            if let LogEvent::Invocation(entry) = event {
                self.tools.lock().unwrap().push(entry.tool.clone());
            }
        }
    }

    const ECHO_PARAMS: &[ParamSpec] = &[ParamSpec {
        name: "texto",
        kind: ParamKind::String,
        description: "Texto a repetir.",
        required: true,
    }];

    struct EchoHandler;

    impl ToolHandler for EchoHandler {
        fn name(&self) -> &'static str {
            "eco"
        }

        fn description(&self) -> &'static str {
            "Repete o texto recebido."
        }

        fn params(&self) -> &'static [ParamSpec] {
            ECHO_PARAMS
        }

        fn execute(&self, args: JsonObject) -> ToolFuture<'_> {
            Box::pin(async move {
                let texto = args.get("texto").and_then(Value::as_str).unwrap_or_default();
                Ok(ToolResult::success(json!({ "texto": texto })))
            })
        }
    }

    struct FailingHandler;

    impl ToolHandler for FailingHandler {
        fn name(&self) -> &'static str {
            "falha"
        }

        fn description(&self) -> &'static str {
            "Sempre falha."
        }

        fn execute(&self, _args: JsonObject) -> ToolFuture<'_> {
            Box::pin(async { Err::<ToolResult, _>(anyhow::anyhow!("falha interna")) })
        }
    }

    fn registry(log: Arc<RecordingLog>) -> ToolRegistry {
        ToolRegistry::new(log)
            .register_handler(EchoHandler)
            .register_handler(FailingHandler)
    }

    #[test]
    fn test_input_schema_lists_properties_and_required() {
        let schema = EchoHandler.descriptor().input_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["texto"]["type"], json!("string"));
        assert_eq!(schema["required"], json!(["texto"]));
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = registry(Arc::new(RecordingLog::default()));
        assert_eq!(registry.list_names(), vec!["eco", "falha"]);
        assert_eq!(registry.len(), 2);

        let registry = registry.register_handler(EchoHandler);
        assert_eq!(registry.list_names(), vec!["eco", "falha"]);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_dispatch_error() {
        let log = Arc::new(RecordingLog::default());
        let registry = registry(log.clone());

        let err = registry.call_tool("inexistente", None).await.unwrap_err();
        assert_eq!(err, DispatchError::UnknownTool("inexistente".to_string()));
        assert_eq!(err.to_string(), "Ferramenta desconhecida: inexistente");
        assert_eq!(*log.tools.lock().unwrap(), vec!["inexistente".to_string()]);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failed_result() {
        let registry = registry(Arc::new(RecordingLog::default()));
        let result = registry.dispatch("falha", None).await.unwrap();
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("falha interna"));
    }

    #[tokio::test]
    async fn test_each_call_is_logged_once() {
        let log = Arc::new(RecordingLog::default());
        let registry = registry(log.clone());

        let mut args = JsonObject::new();
        args.insert("texto".to_string(), json!("olá"));
        let text = registry.call_tool("eco", Some(args)).await.unwrap();
        assert!(text.contains("\"texto\": \"olá\""));

        registry.call_tool("eco", None).await.unwrap();
        assert_eq!(log.tools.lock().unwrap().len(), 2);
    }
}
