mod registry;

use async_trait::async_trait;

pub use registry::ToolRegistry;

/// Parameters handed to a tool: the JSON object parsed from an action line.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// A named capability the model can ask for.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One line shown to the model in the capability listing.
    fn description(&self) -> &str;

    async fn execute(&self, params: Parameters) -> anyhow::Result<String>;
}

/// Fetch a string parameter, falling back to the default `query` key.
///
/// Action lines that are not JSON arrive as `{"query": "<raw text>"}`, so
/// tools accept their primary argument under either name.
#[must_use]
pub fn str_param<'a>(params: &'a Parameters, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .or_else(|| params.get("query"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn str_param_prefers_named_key() {
        let mut params = Parameters::new();
        params.insert("url".to_string(), json!("https://a.example"));
        params.insert("query".to_string(), json!("https://b.example"));
        assert_eq!(str_param(&params, "url"), Some("https://a.example"));
    }

    #[test]
    fn str_param_falls_back_to_query() {
        let mut params = Parameters::new();
        params.insert("query".to_string(), json!("  1 + 2 "));
        assert_eq!(str_param(&params, "expression"), Some("1 + 2"));
        assert_eq!(str_param(&Parameters::new(), "expression"), None);
    }
}
