use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use nanoreact_core::{Parameters, Tool};

const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %A";

/// Local date and time.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        "Get the current local date and time. Optional {\"format\": \"%Y-%m-%d\"} (strftime syntax)."
    }

    async fn execute(&self, params: Parameters) -> Result<String> {
        let format = params
            .get("format")
            .and_then(serde_json::Value::as_str)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FORMAT);

        let items: Vec<_> = chrono::format::StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, chrono::format::Item::Error)) {
            anyhow::bail!("Invalid time format: {format}");
        }

        Ok(Local::now().format_with_items(items.into_iter()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn default_format_has_date_and_time() {
        let out = CurrentTimeTool
            .execute(Parameters::new())
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        // YYYY-MM-DD HH:MM:SS Weekday
        assert!(out.len() > 19);
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[13..14], ":");
    }

    #[tokio::test]
    async fn custom_format() {
        let mut params = Parameters::new();
        params.insert("format".to_string(), json!("%Y"));
        let out = CurrentTimeTool
            .execute(params)
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.len(), 4);
        assert!(out.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn invalid_format_is_rejected() {
        let mut params = Parameters::new();
        params.insert("format".to_string(), json!("%Q"));
        assert!(CurrentTimeTool.execute(params).await.is_err());
    }
}
