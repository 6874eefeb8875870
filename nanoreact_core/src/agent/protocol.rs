//! Prompt text for the two-call ReAct turn.
//!
//! Everything the model reads or writes in a fixed language lives here: the
//! action marker it must emit, the section labels that separate history
//! from the new question, and the synthesis instructions.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

use crate::error::ToolError;
use crate::memory::MemoryLabels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    English,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "cn" | "chinese" => Ok(Self::Chinese),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported language: {other} (expected zh or en)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protocol {
    /// Keyword that opens an action line, without the colon.
    pub action_marker: String,
    /// Tool names that mean "no tool" when written after the marker.
    pub no_action_names: Vec<String>,
    pub memory_labels: MemoryLabels,
    pub intro: String,
    pub tools_header: String,
    pub no_tools: String,
    pub reasoning_header: String,
    pub reasoning_steps: Vec<String>,
    pub format_header: String,
    /// Thought, action, observation and answer labels, in that order.
    pub section_labels: [String; 4],
    pub rules_header: String,
    pub rules: Vec<String>,
    pub history_section: String,
    pub question_section: String,
    pub synthesis_system: String,
    pub synthesis_question: String,
    pub synthesis_result: String,
    pub tool_failure: String,
}

impl Protocol {
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Chinese => Self::chinese(),
            Language::English => Self::english(),
        }
    }

    #[must_use]
    pub fn chinese() -> Self {
        let marker = "行动";
        Self {
            action_marker: marker.to_string(),
            no_action_names: strings(&["无", "none", "None"]),
            memory_labels: MemoryLabels::default(),
            intro: "你是一个智能助手，使用ReAct框架来思考和行动。".to_string(),
            tools_header: "可用工具:".to_string(),
            no_tools: "（暂无可用工具）".to_string(),
            reasoning_header: "思考过程:".to_string(),
            reasoning_steps: strings(&[
                "分析用户的问题",
                "决定是否需要使用工具",
                "如果需要工具，选择最合适的工具并调用",
                "基于工具结果给出最终答案",
            ]),
            format_header: "回答格式:".to_string(),
            section_labels: [
                "思考".to_string(),
                marker.to_string(),
                "观察".to_string(),
                "回答".to_string(),
            ],
            rules_header: "记住:".to_string(),
            rules: vec![
                "每次只能调用一个工具".to_string(),
                format!("参数使用JSON对象，例如 {marker}: search {{\"query\": \"天气\"}}"),
                format!("不需要工具时不要输出{marker}行，直接给出回答"),
                "保持对话的连贯性，记住之前的对话内容".to_string(),
                "用中文回答".to_string(),
            ],
            history_section: "对话历史:".to_string(),
            question_section: "当前问题:".to_string(),
            synthesis_system: "基于工具结果给出最终答案，用中文回答。".to_string(),
            synthesis_question: "用户问题:".to_string(),
            synthesis_result: "工具结果:".to_string(),
            tool_failure: "工具调用失败:".to_string(),
        }
    }

    #[must_use]
    pub fn english() -> Self {
        let marker = "Action";
        Self {
            action_marker: marker.to_string(),
            no_action_names: strings(&["none", "None", "NONE"]),
            memory_labels: MemoryLabels {
                user: "User".to_string(),
                assistant: "Assistant".to_string(),
                summary_header: "Conversation history:".to_string(),
                summary_empty: "No conversation history yet".to_string(),
            },
            intro: "You are a helpful assistant that thinks and acts using the ReAct framework."
                .to_string(),
            tools_header: "Available tools:".to_string(),
            no_tools: "(no tools available)".to_string(),
            reasoning_header: "Reasoning steps:".to_string(),
            reasoning_steps: strings(&[
                "Analyse the user's question",
                "Decide whether a tool is needed",
                "If so, pick the most suitable tool and call it",
                "Give the final answer based on the tool result",
            ]),
            format_header: "Response format:".to_string(),
            section_labels: [
                "Thought".to_string(),
                marker.to_string(),
                "Observation".to_string(),
                "Answer".to_string(),
            ],
            rules_header: "Remember:".to_string(),
            rules: vec![
                "Call at most one tool per reply".to_string(),
                format!(
                    "Write parameters as a JSON object, e.g. {marker}: search {{\"query\": \"weather\"}}"
                ),
                format!("If no tool is needed, omit the {marker} line and answer directly"),
                "Keep the conversation coherent and remember earlier turns".to_string(),
                "Reply in English".to_string(),
            ],
            history_section: "Conversation history:".to_string(),
            question_section: "Current question:".to_string(),
            synthesis_system: "Give the final answer based on the tool result. Reply in English."
                .to_string(),
            synthesis_question: "User question:".to_string(),
            synthesis_result: "Tool result:".to_string(),
            tool_failure: "Tool call failed:".to_string(),
        }
    }

    /// System prompt for the reasoning call, listing the live tool set.
    pub fn system_prompt<'a, I>(&self, tools: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut listing: Vec<String> = tools
            .into_iter()
            .map(|(name, description)| format!("- {name}: {description}"))
            .collect();
        if listing.is_empty() {
            listing.push(self.no_tools.clone());
        }

        let mut out = format!("{}\n\n{}\n{}\n\n", self.intro, self.tools_header, listing.join("\n"));

        let [thought, action, observation, answer] = &self.section_labels;
        let _ = writeln!(out, "{}", self.reasoning_header);
        for (i, step) in self.reasoning_steps.iter().enumerate() {
            let _ = writeln!(out, "{}. {step}", i + 1);
        }
        let _ = write!(
            out,
            "\n{}\n{thought}: [...]\n{action}: [tool] [parameters]\n{observation}: [...]\n{answer}: [...]\n\n{}\n",
            self.format_header, self.rules_header
        );
        let rules: Vec<String> = self.rules.iter().map(|r| format!("- {r}")).collect();
        out.push_str(&rules.join("\n"));
        out
    }

    /// Human turn for the reasoning call: history and question in labeled sections.
    #[must_use]
    pub fn human_prompt(&self, history: &str, input: &str) -> String {
        format!(
            "{}\n{history}\n\n{} {input}",
            self.history_section, self.question_section
        )
    }

    #[must_use]
    pub fn synthesis_prompt(&self, input: &str, tool_output: &str) -> String {
        format!(
            "{} {input}\n{} {tool_output}",
            self.synthesis_question, self.synthesis_result
        )
    }

    /// Tool-result text handed to synthesis when dispatch failed.
    #[must_use]
    pub fn describe_failure(&self, err: &ToolError) -> String {
        format!("{} {err}", self.tool_failure)
    }

    /// Numbered tool listing for people rather than the model.
    pub fn tool_listing<'a, I>(&self, tools: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = format!("{}\n", self.tools_header);
        for (i, (name, description)) in tools.into_iter().enumerate() {
            let _ = writeln!(out, "{}. {name}: {description}", i + 1);
        }
        out
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::chinese()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_short_codes() {
        assert_eq!("zh".parse::<Language>(), Ok(Language::Chinese));
        assert_eq!("EN".parse::<Language>(), Ok(Language::English));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn language_serde_uses_codes() {
        let lang: Language = serde_json::from_str("\"en\"").unwrap_or_default();
        assert_eq!(lang, Language::English);
        assert_eq!(serde_json::to_string(&Language::Chinese).ok().as_deref(), Some("\"zh\""));
    }

    #[test]
    fn system_prompt_lists_tools_and_protocol() {
        let protocol = Protocol::chinese();
        let prompt = protocol.system_prompt([("search", "网络搜索"), ("echo", "原样返回")]);
        assert!(prompt.contains("- search: 网络搜索\n- echo: 原样返回"));
        assert!(prompt.contains("1. 分析用户的问题"));
        assert!(prompt.contains("行动: [tool] [parameters]"));
        assert!(prompt.contains("- 每次只能调用一个工具"));
        assert!(prompt.ends_with("- 用中文回答"));
    }

    #[test]
    fn system_prompt_without_tools() {
        let prompt = Protocol::english().system_prompt(std::iter::empty());
        assert!(prompt.contains("Available tools:\n(no tools available)"));
        assert!(prompt.contains("Reasoning steps:\n1. Analyse"));
    }

    #[test]
    fn human_prompt_separates_history_from_question() {
        let protocol = Protocol::english();
        let prompt = protocol.human_prompt("User: hi\nAssistant: hello", "what time is it?");
        assert_eq!(
            prompt,
            "Conversation history:\nUser: hi\nAssistant: hello\n\nCurrent question: what time is it?"
        );
    }

    #[test]
    fn synthesis_prompt_carries_question_and_result() {
        let prompt = Protocol::chinese().synthesis_prompt("今天天气？", "晴");
        assert_eq!(prompt, "用户问题: 今天天气？\n工具结果: 晴");
    }

    #[test]
    fn tool_listing_is_numbered() {
        let listing = Protocol::english().tool_listing([("a", "first"), ("b", "second")]);
        assert_eq!(listing, "Available tools:\n1. a: first\n2. b: second\n");
    }
}
