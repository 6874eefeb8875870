use nanoreact_config::Config;

/// Strategy for displaying configuration information.
///
/// Outputs the resolved provider endpoint with the API key masked, the agent
/// defaults and the `web_fetch` limits.
///
/// # Design
/// - Static dispatch: All method calls are monomorphized
/// - Stateless: No internal state
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let openai = &config.providers.openai;

        println!("=== nanoreact Configuration ===\n");

        println!("Config File:");
        println!("  {}", Config::config_path()?.display());
        println!();

        println!("Provider:");
        match openai.resolve_api_key() {
            Ok(key) => println!("  API Key: {}", mask_key(&key)),
            Err(_) => println!("  API Key: (not set)"),
        }
        println!(
            "  Base URL: {}",
            openai
                .resolve_base_url()
                .as_deref()
                .unwrap_or(nanoreact_providers::DEFAULT_BASE_URL)
        );
        println!();

        let defaults = &config.agents.defaults;
        println!("Agent Defaults:");
        println!("  Model: {}", defaults.model);
        println!("  Max Tokens: {}", defaults.max_tokens);
        println!("  Temperature: {}", defaults.temperature);
        println!("  Memory K: {}", defaults.memory_k);
        println!("  Language: {:?}", defaults.language);
        if defaults.model_timeout_secs == 0 {
            println!("  Model Timeout: (disabled)");
        } else {
            println!("  Model Timeout: {}s", defaults.model_timeout_secs);
        }
        println!();

        println!("Web Fetch:");
        println!("  Timeout: {}s", config.tools.web_fetch.timeout);
        println!("  Max Size: {} bytes", config.tools.web_fetch.max_size);

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_keys_keep_both_ends() {
        assert_eq!(mask_key("sk-abcdefghijkl1234"), "sk-a...1234");
    }

    #[test]
    fn short_keys_are_fully_hidden() {
        assert_eq!(mask_key("short"), "***");
    }
}
