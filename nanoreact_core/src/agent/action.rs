//! Extracting a tool call from free-text model output.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::tools::Parameters;

/// Key that carries raw parameter text when it is not a JSON object.
pub const FALLBACK_PARAM_KEY: &str = "query";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDirective {
    pub tool_name: String,
    pub parameters: Parameters,
}

/// Outcome of scanning one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionParse {
    /// No action line; the reply is the answer.
    NoAction,
    /// Action line with a JSON object (or nothing) as parameters.
    Directive(ActionDirective),
    /// Action line whose parameter text was not a JSON object. The directive
    /// carries it under [`FALLBACK_PARAM_KEY`].
    Malformed {
        directive: ActionDirective,
        raw: String,
    },
}

impl ActionParse {
    #[must_use]
    pub const fn directive(&self) -> Option<&ActionDirective> {
        match self {
            Self::NoAction => None,
            Self::Directive(directive) | Self::Malformed { directive, .. } => Some(directive),
        }
    }

    #[must_use]
    pub fn into_directive(self) -> Option<ActionDirective> {
        match self {
            Self::NoAction => None,
            Self::Directive(directive) | Self::Malformed { directive, .. } => Some(directive),
        }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Finds `<marker>: <tool> <parameters>` lines.
///
/// Only the first action line in a reply is honored.
#[derive(Debug, Clone)]
pub struct ActionParser {
    pattern: Regex,
    no_action_names: Vec<String>,
}

impl ActionParser {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        // ASCII or full-width colon; tool name and parameters stay on the marker's line
        let pattern = Regex::new(&format!(
            r"{}[ \t]*[:：][ \t]*(\w+)[ \t]*([^\r\n]*)",
            regex::escape(marker)
        ))?;
        Ok(Self {
            pattern,
            no_action_names: Vec::new(),
        })
    }

    /// Tool names that stand for "no tool needed", e.g. `Action: none`.
    #[must_use]
    pub fn with_no_action_names(mut self, names: Vec<String>) -> Self {
        self.no_action_names = names;
        self
    }

    #[must_use]
    pub fn parse(&self, reply: &str) -> ActionParse {
        let mut matches = self.pattern.captures_iter(reply);
        let Some(caps) = matches.next() else {
            return ActionParse::NoAction;
        };

        let extra = matches.count();
        if extra > 0 {
            debug!("Ignoring {extra} additional action line(s); one tool per turn");
        }

        let tool_name = caps[1].to_string();
        if self.no_action_names.iter().any(|n| *n == tool_name) {
            return ActionParse::NoAction;
        }

        let text = caps[2].trim();
        if text.is_empty() {
            return ActionParse::Directive(ActionDirective {
                tool_name,
                parameters: Parameters::new(),
            });
        }

        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(parameters)) => {
                ActionParse::Directive(ActionDirective {
                    tool_name,
                    parameters,
                })
            }
            _ => {
                debug!("Action parameters are not a JSON object, passing raw text as '{FALLBACK_PARAM_KEY}'");
                let mut parameters = Parameters::new();
                parameters.insert(
                    FALLBACK_PARAM_KEY.to_string(),
                    serde_json::Value::String(text.to_string()),
                );
                ActionParse::Malformed {
                    directive: ActionDirective {
                        tool_name,
                        parameters,
                    },
                    raw: text.to_string(),
                }
            }
        }
    }
}
