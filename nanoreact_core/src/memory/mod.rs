//! Sliding-window conversation memory.
//!
//! Holds the last `K` user/assistant exchanges of one conversation. The
//! window is measured in pairs; the store never holds more than `2K`
//! messages and always drops the oldest first.

use std::collections::VecDeque;

use crate::{ChatMessage, Role};

/// Text used when memory is shown to the model or to a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLabels {
    pub user: String,
    pub assistant: String,
    pub summary_header: String,
    pub summary_empty: String,
}

impl Default for MemoryLabels {
    fn default() -> Self {
        Self {
            user: "用户".to_string(),
            assistant: "助手".to_string(),
            summary_header: "对话历史:".to_string(),
            summary_empty: "暂无对话历史".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    messages: VecDeque<ChatMessage>,
    max_pairs: usize,
    labels: MemoryLabels,
}

impl ConversationMemory {
    #[must_use]
    pub fn new(max_pairs: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_pairs.saturating_mul(2)),
            max_pairs,
            labels: MemoryLabels::default(),
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: MemoryLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Record one completed exchange, evicting the oldest messages past `2K`.
    pub fn append(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push_back(ChatMessage::user(user));
        self.messages.push_back(ChatMessage::assistant(assistant));

        let bound = self.max_pairs.saturating_mul(2);
        while self.messages.len() > bound {
            self.messages.pop_front();
        }
    }

    /// Retained messages, one per line, each prefixed by its role label.
    #[must_use]
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .messages
            .iter()
            .map(|m| format!("{}: {}", self.label(&m.role), m.content))
            .collect();
        lines.join("\n")
    }

    /// Numbered listing of the last `limit` exchanges.
    #[must_use]
    pub fn summary(&self, limit: usize) -> String {
        if self.messages.is_empty() {
            return self.labels.summary_empty.clone();
        }

        // append/evict keep the store pair-aligned
        let ordered: Vec<&ChatMessage> = self.messages.iter().collect();
        let pairs: Vec<&[&ChatMessage]> = ordered.chunks(2).collect();
        let skip = pairs.len().saturating_sub(limit);

        let mut out = format!("{}\n", self.labels.summary_header);
        for (i, pair) in pairs.iter().skip(skip).enumerate() {
            for msg in *pair {
                let line = match msg.role {
                    Role::User => format!("{}. {}: {}", i + 1, self.labels.user, msg.content),
                    Role::Assistant | Role::System => {
                        format!("   {}: {}", self.label(&msg.role), msg.content)
                    }
                };
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.messages.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The window size `K`, in exchanges.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_pairs
    }

    fn label(&self, role: &Role) -> &str {
        match role {
            Role::User => &self.labels.user,
            Role::Assistant | Role::System => &self.labels.assistant,
        }
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(k: usize, turns: usize) -> ConversationMemory {
        let mut memory = ConversationMemory::new(k);
        for i in 0..turns {
            memory.append(format!("q{i}"), format!("a{i}"));
        }
        memory
    }

    #[test]
    fn empty_memory_renders_empty_string() {
        let memory = ConversationMemory::new(3);
        assert_eq!(memory.render(), "");
        assert!(memory.is_empty());
    }

    #[test]
    fn render_lists_roles_in_order() {
        let memory = filled(3, 2);
        assert_eq!(memory.render(), "用户: q0\n助手: a0\n用户: q1\n助手: a1");
    }

    #[test]
    fn window_keeps_last_k_pairs() {
        for k in 0..4 {
            for turns in (k + 1)..(k + 4) {
                let memory = filled(k, turns);
                assert_eq!(memory.pair_count(), k);
                assert_eq!(memory.len(), 2 * k);

                let expected: Vec<String> = (turns - k..turns)
                    .flat_map(|i| [format!("用户: q{i}"), format!("助手: a{i}")])
                    .collect();
                assert_eq!(memory.render(), expected.join("\n"), "k={k} turns={turns}");
            }
        }
    }

    #[test]
    fn render_grows_then_stays_bounded() {
        let mut memory = ConversationMemory::new(2);
        let mut lengths = Vec::new();
        for i in 0..6 {
            memory.append(format!("question {i}"), format!("answer {i}"));
            lengths.push(memory.render().len());
        }
        assert!(lengths[0] < lengths[1]);
        assert!(lengths[2..].iter().all(|&l| l == lengths[1]));
    }

    #[test]
    fn clear_empties_everything() {
        let mut memory = filled(4, 3);
        memory.clear();
        assert_eq!(memory.render(), "");
        assert_eq!(memory.len(), 0);
        assert_eq!(memory.summary(4), "暂无对话历史");
    }

    #[test]
    fn summary_counts_pairs() {
        let memory = filled(5, 3);
        let summary = memory.summary(2);
        assert_eq!(
            summary,
            "对话历史:\n1. 用户: q1\n   助手: a1\n2. 用户: q2\n   助手: a2\n"
        );
    }

    #[test]
    fn labels_are_configurable() {
        let labels = MemoryLabels {
            user: "User".to_string(),
            assistant: "Assistant".to_string(),
            summary_header: "History:".to_string(),
            summary_empty: "No history yet".to_string(),
        };
        let mut memory = ConversationMemory::new(1).with_labels(labels);
        assert_eq!(memory.summary(1), "No history yet");
        memory.append("hi", "hello");
        assert_eq!(memory.render(), "User: hi\nAssistant: hello");
    }
}
