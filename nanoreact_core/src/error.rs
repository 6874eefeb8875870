//! Error taxonomy for a single turn.
//!
//! Only [`AgentError`] ever leaves the engine. [`ToolError`] is produced by the
//! registry and folded back into the synthesis prompt.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Which of the two model calls in a turn failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    /// Reasoning call that may produce an action line.
    Primary,
    /// Second call that turns a tool result into the answer.
    Synthesis,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Synthesis => f.write_str("synthesis"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model unavailable during {stage} call: {source}")]
    ModelUnavailable {
        stage: CallStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Model {stage} call timed out after {timeout:?}")]
    ModelTimeout { stage: CallStage, timeout: Duration },

    /// The marker is escaped before compiling, so this only fires when a
    /// custom protocol's marker pushes the pattern past the regex size limit.
    #[error("Invalid action marker: {0}")]
    InvalidProtocol(#[from] regex::Error),
}

impl AgentError {
    /// True for every failure of the model provider, including timeouts.
    #[must_use]
    pub const fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. } | Self::ModelTimeout { .. })
    }

    /// The model call that failed, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<CallStage> {
        match self {
            Self::ModelUnavailable { stage, .. } | Self::ModelTimeout { stage, .. } => Some(*stage),
            Self::InvalidProtocol(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool '{name}' failed: {source}")]
    Execution {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}
