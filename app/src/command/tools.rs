use nanoreact_config::Config;
use nanoreact_core::Protocol;

/// Strategy for listing the built-in tools the way the model sees them.
///
/// Uses default tool settings while no config file exists yet, so the
/// listing works before `init`. A config file that exists but fails to
/// load is reported rather than ignored.
///
/// # Design
/// - Static dispatch: All method calls are monomorphized
/// - Stateless: No internal state
#[derive(Debug, Clone, Copy)]
pub struct ToolsStrategy;

impl super::CommandStrategy for ToolsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let (tools_config, language) = match Config::load_optional(&Config::config_path()?)? {
            Some(config) => (config.tools, config.agents.defaults.language),
            None => Default::default(),
        };

        let registry = nanoreact_tools::default_registry(&tools_config)?;
        let protocol = Protocol::for_language(language);
        println!("{}", protocol.tool_listing(registry.describe()));
        Ok(())
    }
}
