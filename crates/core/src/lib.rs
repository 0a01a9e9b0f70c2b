//! WebPilot core — domain types and traits for the agent runtime.
//!
//! This crate defines the contracts everything else plugs into:
//!
//! - [`message`] — conversation messages, the append-only [`message::History`]
//!   and its replay projection
//! - [`provider`] — the model inference contract and capability rule
//! - [`tool`] — the tool contract and per-step [`tool::ToolSet`]
//! - [`context`] — records, feedback, and the explicit [`context::StepContext`]
//! - [`prompt`] — structured prompt fragments as data
//! - [`browser`] — the narrow browser-driver seam
//! - [`error`] — the `thiserror` hierarchy

pub mod browser;
pub mod context;
pub mod error;
pub mod fence;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod tool;

pub use browser::{BrowserDriver, PageSnapshot, ScrollDirection, TypeOptions};
pub use context::{Feedback, FeedbackKind, Records, StepContext};
pub use error::{BrowserError, Error, ProviderError, Result, ToolError};
pub use fence::extract_json_block;
pub use message::{ContentPart, History, Message, MessageContent, Role, Transcript};
pub use prompt::{PromptTree, PromptValue};
pub use provider::{ModelRequest, ModelResponse, ModelToolCall, Provider, Usage};
pub use tool::{FINISH_TOOL, Tool, ToolDefinition, ToolOutcome, ToolParams, ToolSet};
