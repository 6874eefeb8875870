mod action;
mod agent_loop;
mod protocol;

pub use action::{ActionDirective, ActionParse, ActionParser, FALLBACK_PARAM_KEY};
pub use agent_loop::{EngineConfig, ToolCall, TurnEngine, TurnResult};
pub use protocol::{Language, Protocol};
