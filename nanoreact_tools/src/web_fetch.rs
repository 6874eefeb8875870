use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use nanoreact_core::tools::str_param;
use nanoreact_core::{Parameters, Tool};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest text handed back to the model, in characters.
const MAX_TEXT_CHARS: usize = 10_000;

/// Web fetch tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebFetchConfig {
    /// Request timeout (seconds)
    #[serde(default = "WebFetchConfig::default_timeout")]
    pub timeout: u64,

    /// User-Agent header
    #[serde(default = "WebFetchConfig::default_user_agent")]
    pub user_agent: String,

    /// Maximum response size (bytes)
    #[serde(default = "WebFetchConfig::default_max_size")]
    pub max_size: usize,
}

impl WebFetchConfig {
    const fn default_timeout() -> u64 {
        10
    }

    fn default_user_agent() -> String {
        "Mozilla/5.0 (compatible; nanoreact/1.0)".to_string()
    }

    const fn default_max_size() -> usize {
        1_000_000 // 1MB
    }
}

impl Default for WebFetchConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            user_agent: Self::default_user_agent(),
            max_size: Self::default_max_size(),
        }
    }
}

/// Web fetch tool
pub struct WebFetchTool {
    client: Client,
    config: WebFetchConfig,
}

impl WebFetchTool {
    pub fn new(config: WebFetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Tool for WebFetchTool {
    fn name(&self) -> &'static str {
        "web_fetch"
    }

    fn description(&self) -> &'static str {
        "Fetch a web page and return its text. Expects {\"url\": \"https://...\"}; \
         http and https only."
    }

    async fn execute(&self, params: Parameters) -> Result<String> {
        let Some(url) = str_param(&params, "url") else {
            bail!("Missing required parameter: url");
        };

        let parsed = url::Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Only http and https URLs are supported");
        }

        let mut response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "text/html, text/markdown, text/plain")
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP request returned status {status}");
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let max_size = self.config.max_size;
        if let Some(declared) = response.content_length() {
            check_size(declared, max_size)?;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read response")?
        {
            check_size((bytes.len() + chunk.len()) as u64, max_size)?;
            bytes.extend_from_slice(&chunk);
        }
        debug!("Fetched {} bytes ({content_type}) from {url}", bytes.len());

        let content = if content_type.contains("html") {
            html_to_text(&bytes)
        } else {
            String::from_utf8_lossy(&bytes).to_string()
        };

        Ok(truncate_chars(&content, MAX_TEXT_CHARS))
    }
}

fn check_size(len: u64, max_size: usize) -> Result<()> {
    if len > max_size as u64 {
        bail!("Response too large: {len} bytes (max: {max_size})");
    }
    Ok(())
}

fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!(
            "{}\n\n... (truncated at {max_chars} chars)",
            &content[..cut]
        ),
        None => content.to_string(),
    }
}

/// Convert HTML to plain text (simplified)
fn html_to_text(bytes: &[u8]) -> String {
    let html = String::from_utf8_lossy(bytes);

    let html = remove_tag(&html, "script");
    let html = remove_tag(&html, "style");

    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove an HTML element and its content, e.g. `<script ...>...</script>`.
fn remove_tag(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(&open) {
        result.push_str(&rest[..start]);
        match rest[start..].find(&close) {
            Some(end) => rest = &rest[start + end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
        result.push(' ');
    }
    result.push_str(rest);
    result
}
