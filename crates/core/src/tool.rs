//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what let an execution step act in the world: drive the browser,
//! ask the operator a question, extract page content, or finish the task.
//! Each step carries its own ordered, name-unique [`ToolSet`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::StepContext;
use crate::error::{Error, ToolError};

/// The reserved name of the terminal tool. When a selection matches a tool
/// with this name, its outcome becomes the reasoning loop's result.
pub const FINISH_TOOL: &str = "finish";

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters (including `required`)
    pub parameters: serde_json::Value,
}

/// Parameters delivered to a tool callback: a JSON object map.
pub type ToolParams = serde_json::Map<String, serde_json::Value>;

/// What a tool callback produced.
///
/// The loop inspects only the terminal `finish` tool's outcome; non-terminal
/// outcomes are logged and discarded. Tools that need to publish results
/// fold them into history through the step context instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolOutcome {
    /// The tool acted for its side effect only
    Done,
    /// A short text result
    Text(String),
    /// A structured result (e.g. the finish tool's success/conclusion)
    Structured(ToolParams),
}

/// The core Tool trait.
///
/// Callbacks receive the resolved selection parameters plus the explicit
/// step context, so they can read the task and fold results back into
/// history or records without capturing agent state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The schema definition advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool.
    async fn invoke(
        &self,
        params: &ToolParams,
        ctx: &mut StepContext<'_>,
    ) -> std::result::Result<ToolOutcome, ToolError>;
}

/// An ordered, name-unique set of tools belonging to one execution step.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    /// Build a tool set, rejecting duplicate names at construction time.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, Error> {
        let mut seen = Vec::with_capacity(tools.len());
        for tool in &tools {
            let name = tool.definition().name;
            if seen.contains(&name) {
                return Err(Error::Config {
                    message: format!("duplicate tool name in step: {name}"),
                });
            }
            seen.push(name);
        }
        Ok(Self { tools })
    }

    /// Look up a tool by exact name match.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// All definitions, in declaration order (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field(
                "tools",
                &self
                    .tools
                    .iter()
                    .map(|t| t.definition().name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
