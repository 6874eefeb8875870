use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::{Parameters, Tool};
use crate::error::ToolError;

/// Named tools in registration order.
///
/// Registering a name twice replaces the earlier tool but keeps its
/// position in the listing.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&slot) = self.index.get(&name) {
            warn!("Tool '{name}' registered twice, replacing the earlier one");
            self.tools[slot] = tool;
            return;
        }
        info!("Registering tool: {name}");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
    }

    pub fn register_all<I>(&mut self, tools: I)
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        for tool in tools {
            self.register(tool);
        }
    }

    #[must_use]
    pub fn with_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        registry.register_all(tools);
        registry
    }

    /// `(name, description)` pairs in registration order.
    pub fn describe(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tools.iter().map(|t| (t.name(), t.description()))
    }

    pub async fn invoke(&self, name: &str, params: Parameters) -> Result<String, ToolError> {
        let tool = self
            .index
            .get(name)
            .map(|&slot| &self.tools[slot])
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tool.execute(params)
            .await
            .map_err(|source| ToolError::Execution {
                name: name.to_string(),
                source,
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed {
        name: &'static str,
        description: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        async fn execute(&self, _params: Parameters) -> anyhow::Result<String> {
            Ok(self.reply.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        async fn execute(&self, _params: Parameters) -> anyhow::Result<String> {
            anyhow::bail!("backend offline")
        }
    }

    fn fixed(name: &'static str, reply: &'static str) -> Arc<dyn Tool> {
        Arc::new(Fixed {
            name,
            description: "fixed reply",
            reply,
        })
    }

    #[test]
    fn describe_keeps_registration_order() {
        let registry = ToolRegistry::with_tools([fixed("search", "a"), fixed("clock", "b")]);
        let names: Vec<&str> = registry.describe().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["search", "clock"]);

        // restartable
        assert_eq!(registry.describe().count(), 2);
    }

    #[tokio::test]
    async fn duplicate_registration_replaces_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register(fixed("search", "old"));
        registry.register(fixed("clock", "tick"));
        registry.register(fixed("search", "new"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list(), vec!["search", "clock"]);
        let out = registry.invoke("search", Parameters::new()).await;
        assert_eq!(out.ok().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("missing", Parameters::new()).await;
        assert!(matches!(err, Err(ToolError::NotFound(name)) if name == "missing"));
    }

    #[tokio::test]
    async fn tool_failure_is_wrapped() {
        let registry = ToolRegistry::with_tools([Arc::new(Failing) as Arc<dyn Tool>]);
        let mut params = Parameters::new();
        params.insert("query".to_string(), json!("x"));
        match registry.invoke("broken", params).await {
            Err(ToolError::Execution { name, source }) => {
                assert_eq!(name, "broken");
                assert_eq!(source.to_string(), "backend offline");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
