//! Shared per-agent state threaded explicitly into step callbacks.
//!
//! Thinking hooks and tool callbacks never capture agent internals; they
//! receive a [`StepContext`] borrowing the one agent instance's history,
//! records and feedback log. That keeps independent agent instances fully
//! isolated and makes every mutation visible at the call site.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::message::{History, Message};

/// Named string facts produced by thinking steps and consumed by prompt
/// templates (e.g. a running `plan`). Lifetime = the agent instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Records {
    entries: BTreeMap<String, String>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one fact, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Merge a batch of facts, later keys overriding earlier ones.
    pub fn merge<I, K, V>(&mut self, facts: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in facts {
            self.set(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The tone of a supervisor's feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
    Neutral,
}

/// One piece of supervisor feedback about the running task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
}

/// Explicit mutable context handed to thinking hooks and tool callbacks.
pub struct StepContext<'a> {
    /// The task the agent is driving toward
    pub task: &'a str,

    /// The agent's conversation log
    pub history: &'a mut History,

    /// The agent's named facts
    pub records: &'a mut Records,

    /// Accumulated supervisor feedback
    pub feedback: &'a mut Vec<Feedback>,
}

impl StepContext<'_> {
    /// Record feedback: append to the log and fold a `Feedback: ...` user
    /// message into history so the model sees it on the next cycle.
    pub fn push_feedback(&mut self, feedback: Feedback) {
        self.history
            .push(Message::user(format!("Feedback: {}", feedback.message)));
        self.feedback.push(feedback);
    }
}
