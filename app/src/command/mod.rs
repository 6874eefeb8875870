//! Static strategy pattern for CLI commands.
//!
//! Each command is its own zero-sized strategy type with its own input, so
//! dispatch in `main` is resolved at compile time.

use std::sync::Arc;

use nanoreact_config::Config;
use nanoreact_core::{LLMProvider, TurnEngine};
use nanoreact_providers::OpenAIProvider;
use tracing::info;

mod chat;
mod info;
mod init;
mod tools;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use tools::ToolsStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Adding a command means adding a strategy type and one match arm in
/// `main`; nothing is boxed.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Overrides a command may apply on top of `agents.defaults`.
#[derive(Debug, Clone, Default)]
pub struct EngineOverrides {
    pub model: Option<String>,
    pub memory_k: Option<usize>,
    pub language: Option<nanoreact_core::Language>,
}

/// Wire provider, built-in tools and engine settings from the config file.
fn build_engine(config: &Config, overrides: EngineOverrides) -> anyhow::Result<TurnEngine> {
    let mut engine_config = config.engine_config();
    if let Some(model) = overrides.model {
        engine_config.chat.model = model;
    }
    if let Some(k) = overrides.memory_k {
        engine_config.memory_k = k;
    }
    if let Some(language) = overrides.language {
        engine_config.language = language;
    }

    let openai = &config.providers.openai;
    let mut provider = OpenAIProvider::new(openai.resolve_api_key()?);
    if let Some(base_url) = openai.resolve_base_url() {
        provider = provider.with_base_url(base_url);
    }
    info!("Using endpoint {}", provider.base_url());

    let registry = nanoreact_tools::default_registry(&config.tools)?;
    let provider: Arc<dyn LLMProvider> = Arc::new(provider);

    Ok(TurnEngine::new(provider, registry, engine_config)?)
}
