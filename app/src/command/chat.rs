//! Interactive ReAct shell, or a single message with `-m`.

use std::io::Write;

use nanoreact_config::Config;
use nanoreact_core::{Language, TurnEngine};
use tracing::{debug, info};

use super::{EngineOverrides, build_engine};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional memory window override, in exchanges
    pub memory_k: Option<usize>,
    /// Optional protocol language override
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut engine = build_engine(
            &config,
            EngineOverrides {
                model: input.model,
                memory_k: input.memory_k,
                language: input.language,
            },
        )?;

        if let Some(msg) = input.message {
            let result = engine.process_turn(&msg).await?;
            println!("{}", result.answer);
            return Ok(());
        }

        run_interactive(&mut engine).await
    }
}

/// Shell commands recognised before input reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellCommand {
    Help,
    Tools,
    Memory,
    Clear,
    Quit,
}

impl ShellCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "help" | "帮助" => Some(Self::Help),
            "tools" | "工具" => Some(Self::Tools),
            "memory" | "记忆" => Some(Self::Memory),
            "clear" | "清空" => Some(Self::Clear),
            "quit" | "exit" | "q" | "退出" => Some(Self::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "\
Commands:
  help    Show this message
  tools   List available tools
  memory  Show the remembered exchanges
  clear   Forget the conversation so far
  quit    Leave the shell (also: exit, q)
Anything else is sent to the assistant.";

async fn run_interactive(engine: &mut TurnEngine) -> anyhow::Result<()> {
    println!("=== nanoreact session: {} ===", engine.session_id());
    println!("Type 'help' for commands, 'quit' or Ctrl+D to leave.\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match ShellCommand::parse(input) {
            Some(ShellCommand::Quit) => break,
            Some(ShellCommand::Help) => println!("{HELP}\n"),
            Some(ShellCommand::Tools) => println!("{}", engine.list_tools()),
            Some(ShellCommand::Memory) => println!("{}", engine.memory_summary()),
            Some(ShellCommand::Clear) => {
                engine.clear_memory();
                println!("Conversation memory cleared.\n");
            }
            None => match engine.process_turn(input).await {
                Ok(result) => {
                    if let Some(call) = &result.tool_call {
                        debug!(
                            "Tool {} ({}): {}",
                            call.directive.tool_name,
                            if call.succeeded { "ok" } else { "failed" },
                            call.output
                        );
                    }
                    if let Some(usage) = result.usage {
                        debug!(
                            "Tokens: {} prompt + {} completion = {} total",
                            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                        );
                    }
                    println!("\n{}\n", result.answer);
                }
                Err(e) => eprintln!("Error: {e}\n"),
            },
        }
    }

    info!("Session ended after {} turns", engine.turns());
    println!("Session ended. Total turns: {}", engine.turns());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_commands_are_case_insensitive() {
        assert_eq!(ShellCommand::parse("HELP"), Some(ShellCommand::Help));
        assert_eq!(ShellCommand::parse("exit"), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("清空"), Some(ShellCommand::Clear));
        assert_eq!(ShellCommand::parse("what is 2 + 2"), None);
    }
}
