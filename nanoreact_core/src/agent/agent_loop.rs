//! Turn engine: one user input in, one answer out, at most one tool call.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::action::{ActionDirective, ActionParser};
use super::protocol::{Language, Protocol};
use crate::error::{AgentError, CallStage, Result};
use crate::{
    ChatMessage, ChatOptions, ConversationMemory, LLMProvider, LLMResponse, ToolRegistry, Usage,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chat: ChatOptions,
    /// Number of past exchanges kept in memory.
    pub memory_k: usize,
    pub language: Language,
    /// Applied to each model call separately.
    pub model_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chat: ChatOptions::default(),
            memory_k: 5,
            language: Language::default(),
            model_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// The tool dispatched during a turn and what it produced.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub directive: ActionDirective,
    /// Tool output, or the failure text handed to synthesis.
    pub output: String,
    pub succeeded: bool,
    /// Parameter text was not a JSON object and went through the fallback key.
    pub fallback_parameters: bool,
}

#[derive(Debug, Clone)]
pub struct TurnResult {
    pub answer: String,
    pub tool_call: Option<ToolCall>,
    pub usage: Option<Usage>,
    pub turn_number: usize,
}

/// Runs ReAct turns for one conversation.
///
/// Owns its memory and tools; separate conversations need separate engines.
pub struct TurnEngine<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    registry: ToolRegistry,
    memory: ConversationMemory,
    protocol: Protocol,
    parser: ActionParser,
    config: EngineConfig,
    session_id: Uuid,
    turns: usize,
}

impl<P> TurnEngine<P>
where
    P: LLMProvider + Send + Sync,
{
    pub fn new(provider: P, registry: ToolRegistry, config: EngineConfig) -> Result<Self> {
        let protocol = Protocol::for_language(config.language);
        Self::with_protocol(provider, registry, config, protocol)
    }

    pub fn with_protocol(
        provider: P,
        registry: ToolRegistry,
        mut config: EngineConfig,
        protocol: Protocol,
    ) -> Result<Self> {
        if config.chat.model.trim().is_empty() {
            config.chat.model = provider.get_default_model().to_string();
            debug!("No model configured, using provider default: {}", config.chat.model);
        }
        let parser = ActionParser::new(&protocol.action_marker)?
            .with_no_action_names(protocol.no_action_names.clone());
        let memory =
            ConversationMemory::new(config.memory_k).with_labels(protocol.memory_labels.clone());
        let session_id = Uuid::now_v7();

        info!(
            "Creating turn engine for session {session_id}: model={}, tools={}, memory_k={}",
            config.chat.model,
            registry.len(),
            config.memory_k
        );

        Ok(Self {
            provider,
            registry,
            memory,
            protocol,
            parser,
            config,
            session_id,
            turns: 0,
        })
    }

    /// Process one user input.
    ///
    /// A failed model call aborts the turn and leaves memory untouched.
    /// Tool failures do not: their error text becomes the tool result.
    pub async fn process_turn(&mut self, input: &str) -> Result<TurnResult> {
        let turn_number = self.turns + 1;
        info!("Processing turn {turn_number} for session: {}", self.session_id);

        let system = self.protocol.system_prompt(self.registry.describe());
        let human = self.protocol.human_prompt(&self.memory.render(), input);
        let first = self.complete(CallStage::Primary, system, human).await?;
        debug!("Primary reply: {}", first.content);

        let mut usage = first.usage;
        let parsed = self.parser.parse(&first.content);
        let fallback_parameters = parsed.is_malformed();

        let (answer, tool_call) = match parsed.into_directive() {
            None => {
                info!("No action requested, using primary reply as answer");
                (first.content, None)
            }
            Some(directive) => {
                let (output, succeeded) = self.dispatch(&directive).await;

                let system = self.protocol.synthesis_system.clone();
                let human = self.protocol.synthesis_prompt(input, &output);
                let second = self.complete(CallStage::Synthesis, system, human).await?;
                usage = merge_usage(usage, second.usage);

                let call = ToolCall {
                    directive,
                    output,
                    succeeded,
                    fallback_parameters,
                };
                (second.content, Some(call))
            }
        };

        self.memory.append(input, answer.clone());
        self.turns = turn_number;
        debug!(
            "Turn {turn_number} completed, memory holds {} exchange(s)",
            self.memory.pair_count()
        );

        Ok(TurnResult {
            answer,
            tool_call,
            usage,
            turn_number,
        })
    }

    /// Run the requested tool; failures come back as explanatory text.
    async fn dispatch(&self, directive: &ActionDirective) -> (String, bool) {
        info!(
            "Calling tool: {} params: {}",
            directive.tool_name,
            serde_json::Value::Object(directive.parameters.clone())
        );

        match self
            .registry
            .invoke(&directive.tool_name, directive.parameters.clone())
            .await
        {
            Ok(output) => {
                info!("Tool {} returned {} bytes", directive.tool_name, output.len());
                (output, true)
            }
            Err(e) => {
                warn!("Tool dispatch failed: {e}");
                (self.protocol.describe_failure(&e), false)
            }
        }
    }

    async fn complete(
        &self,
        stage: CallStage,
        system: String,
        human: String,
    ) -> Result<LLMResponse> {
        let messages = [ChatMessage::system(system), ChatMessage::user(human)];
        for (i, msg) in messages.iter().enumerate() {
            debug!(
                "{stage} message {}: role={:?}, content_len={}",
                i,
                msg.role,
                msg.content.len()
            );
        }

        let call = self.provider.chat(&messages, &self.config.chat);
        let response = match self.config.model_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| AgentError::ModelTimeout { stage, timeout })?,
            None => call.await,
        };

        response.map_err(|source| {
            warn!("Model {stage} call failed: {source}");
            AgentError::ModelUnavailable { stage, source }
        })
    }

    /// Numbered listing of the registered tools.
    #[must_use]
    pub fn list_tools(&self) -> String {
        self.protocol.tool_listing(self.registry.describe())
    }

    /// Last `K` exchanges, numbered.
    #[must_use]
    pub fn memory_summary(&self) -> String {
        self.memory.summary(self.memory.capacity())
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
        info!("Memory cleared for session: {}", self.session_id);
    }

    #[must_use]
    pub const fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Completed turns so far.
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }
}

fn merge_usage(a: Option<Usage>, b: Option<Usage>) -> Option<Usage> {
    match (a, b) {
        (Some(mut total), Some(more)) => {
            total += more;
            Some(total)
        }
        (a, b) => a.or(b),
    }
}
