#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub mod calculator;
pub mod clock;
pub mod echo;
pub mod web_fetch;

// Re-export tool types for convenience
pub use calculator::CalculatorTool;
pub use clock::CurrentTimeTool;
pub use echo::EchoTool;
pub use web_fetch::{WebFetchConfig, WebFetchTool};

use std::sync::Arc;

use nanoreact_core::{Tool, ToolRegistry};
use serde::{Deserialize, Serialize};

/// `tools` section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub web_fetch: WebFetchConfig,
}

/// Built-in tools, in listing order.
pub fn default_tools(config: &ToolsConfig) -> anyhow::Result<Vec<Arc<dyn Tool>>> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CalculatorTool),
        Arc::new(CurrentTimeTool),
        Arc::new(WebFetchTool::new(config.web_fetch.clone())?),
        Arc::new(EchoTool),
    ];
    Ok(tools)
}

/// Registry pre-loaded with [`default_tools`].
pub fn default_registry(config: &ToolsConfig) -> anyhow::Result<ToolRegistry> {
    Ok(ToolRegistry::with_tools(default_tools(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_builtins_in_order() {
        let registry = default_registry(&ToolsConfig::default())
            .unwrap_or_else(|e| panic!("registry should build: {e}"));
        assert_eq!(
            registry.list(),
            vec!["calculator", "current_time", "web_fetch", "echo"]
        );
    }

    #[test]
    fn tools_config_tolerates_missing_fields() {
        let config: ToolsConfig = serde_json::from_str(r#"{"web_fetch": {"timeout": 3}}"#)
            .unwrap_or_else(|e| panic!("config should parse: {e}"));
        assert_eq!(config.web_fetch.timeout, 3);
        assert_eq!(config.web_fetch.max_size, 1_000_000);
    }
}
