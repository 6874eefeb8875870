use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use nanoreact_core::{ChatOptions, EngineConfig, Language};
use nanoreact_tools::ToolsConfig;

const CONFIG_DIR: &str = "nanoreact";
const CONFIG_FILE: &str = "config.json";
const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    /// Empty or missing means the provider's default model.
    #[serde(default)]
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Exchanges kept in conversation memory.
    #[serde(default = "AgentDefaults::default_memory_k")]
    pub memory_k: usize,
    #[serde(default)]
    pub language: Language,
    /// Per model call; 0 disables the timeout.
    #[serde(default = "AgentDefaults::default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

impl AgentDefaults {
    const fn default_memory_k() -> usize {
        5
    }

    const fn default_model_timeout_secs() -> u64 {
        60
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Config value first, then `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        if !self.api_key.trim().is_empty() {
            return Ok(self.api_key.clone());
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => anyhow::bail!(
                "No API key configured. Set \"providers.openai.api_key\" or {API_KEY_ENV}"
            ),
        }
    }

    /// Config value first, then `OPENAI_BASE_URL`, else `None` for the provider default.
    #[must_use]
    pub fn resolve_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'nanoreact init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `None` when `path` does not exist; a file that exists must parse.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Engine settings derived from `agents.defaults`.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = &self.agents.defaults;
        EngineConfig {
            chat: ChatOptions {
                model: defaults.model.clone(),
                temperature: defaults.temperature,
                max_tokens: defaults.max_tokens,
            },
            memory_k: defaults.memory_k,
            language: defaults.language,
            model_timeout: (defaults.model_timeout_secs > 0)
                .then_some(Duration::from_secs(defaults.model_timeout_secs)),
        }
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your API key (or export {API_KEY_ENV})");
        println!("   2. Point base_url at any OpenAI-compatible endpoint if needed");
        println!("   3. Run 'nanoreact chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - memory_k: Number of past exchanges kept as context");
        println!("   - language: Prompt protocol language (zh or en)");
        println!("   - model_timeout_secs: Per model call timeout, 0 disables it");
        println!();
        Ok(())
    }
}

pub const CONFIG_TEMPLATE: &str = r#"{
  "agents": {
    "defaults": {
      "model": "gpt-4o-mini",
      "max_tokens": 2048,
      "temperature": 0.7,
      "memory_k": 5,
      "language": "zh",
      "model_timeout_secs": 60
    }
  },
  "providers": {
    "openai": {
      "api_key": "your-api-key-here",
      "base_url": "https://api.openai.com/v1"
    }
  },
  "tools": {
    "web_fetch": {
      "timeout": 10,
      "max_size": 1000000
    }
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Config {
        Config::from_json(json).unwrap_or_else(|e| panic!("config should parse: {e}"))
    }

    #[test]
    fn template_parses() {
        let config = parse(CONFIG_TEMPLATE);
        assert_eq!(config.agents.defaults.model, "gpt-4o-mini");
        assert_eq!(config.agents.defaults.memory_k, 5);
        assert_eq!(config.agents.defaults.language, Language::Chinese);
        assert_eq!(config.tools.web_fetch.timeout, 10);
    }

    #[test]
    fn optional_fields_take_defaults() {
        let config = parse(
            r#"{
                "agents": {"defaults": {"model": "glm-4-flash", "max_tokens": 1024, "temperature": 0.2}},
                "providers": {"openai": {}}
            }"#,
        );
        assert_eq!(config.agents.defaults.memory_k, 5);
        assert_eq!(config.agents.defaults.model_timeout_secs, 60);
        assert!(config.providers.openai.base_url.is_none());
        assert_eq!(config.tools.web_fetch.max_size, 1_000_000);
    }

    #[test]
    fn engine_config_follows_defaults() {
        let mut config = parse(CONFIG_TEMPLATE);
        config.agents.defaults.language = Language::English;
        config.agents.defaults.model_timeout_secs = 0;

        let engine = config.engine_config();
        assert_eq!(engine.chat.model, "gpt-4o-mini");
        assert_eq!(engine.chat.max_tokens, 2048);
        assert_eq!(engine.memory_k, 5);
        assert_eq!(engine.language, Language::English);
        assert!(engine.model_timeout.is_none());

        config.agents.defaults.model_timeout_secs = 15;
        assert_eq!(
            config.engine_config().model_timeout,
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn model_may_be_omitted() {
        let config = parse(
            r#"{
                "agents": {"defaults": {"max_tokens": 512, "temperature": 0.0}},
                "providers": {"openai": {}}
            }"#,
        );
        assert!(config.engine_config().chat.model.is_empty());
    }

    #[test]
    fn load_optional_distinguishes_missing_from_broken() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));

        let missing = dir.path().join("absent.json");
        assert!(matches!(Config::load_optional(&missing), Ok(None)));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap_or_else(|e| panic!("write: {e}"));
        assert!(Config::load_optional(&broken).is_err());

        let valid = dir.path().join("config.json");
        std::fs::write(&valid, CONFIG_TEMPLATE).unwrap_or_else(|e| panic!("write: {e}"));
        let loaded = Config::load_optional(&valid).unwrap_or_else(|e| panic!("load: {e}"));
        assert_eq!(loaded.map(|c| c.agents.defaults.memory_k), Some(5));
    }

    #[test]
    fn configured_api_key_wins() {
        let provider = ProviderConfig {
            api_key: "sk-test".to_string(),
            base_url: Some("https://example.invalid/v1".to_string()),
        };
        assert_eq!(provider.resolve_api_key().ok().as_deref(), Some("sk-test"));
        assert_eq!(
            provider.resolve_base_url().as_deref(),
            Some("https://example.invalid/v1")
        );
    }
}
