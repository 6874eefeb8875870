use anyhow::Result;
use async_trait::async_trait;
use nanoreact_core::agent::FALLBACK_PARAM_KEY;
use nanoreact_core::{Parameters, Tool};

/// Returns its `query` parameter unchanged. Handy for checking the protocol end to end.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "Repeat the given text. Expects {\"query\": \"text\"}."
    }

    async fn execute(&self, params: Parameters) -> Result<String> {
        params
            .get(FALLBACK_PARAM_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {FALLBACK_PARAM_KEY}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echoes_query() {
        let mut params = Parameters::new();
        params.insert("query".to_string(), json!("hi"));
        assert_eq!(EchoTool.execute(params).await.ok().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn missing_query_fails() {
        assert!(EchoTool.execute(Parameters::new()).await.is_err());
    }
}
