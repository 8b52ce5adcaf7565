//! CEMADEN lookup tools and the registry that dispatches them.

mod registry;
mod result;

pub use registry::{
    DispatchError, ParamKind, ParamSpec, ToolDescriptor, ToolFuture, ToolHandler, ToolRegistry,
};
pub use result::ToolResult;

// Tool handler implementations
mod links;
mod municipalities;
mod panel_check;
mod system_info;

pub use links::{LinkCatalogHandler, useful_links};
pub use municipalities::{MunicipalityListHandler, list_municipalities};
pub use panel_check::{PanelCheckHandler, check_alerts_panel};
pub use system_info::{SystemInfoHandler, system_info};

/// Read an optional string argument, treating blanks and non-strings as absent.
pub(crate) fn optional_str<'a>(args: &'a rmcp::model::JsonObject, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
