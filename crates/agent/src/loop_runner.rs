//! The reasoning loop — cycles over declared steps until the task ends.
//!
//! Each cycle increments a monotonic counter, runs every step that passes
//! its frequency gate in declaration order, and starts over. Execution
//! steps resolve the model's response into a tool selection and dispatch
//! it; the reserved `finish` tool's outcome terminates the loop and becomes
//! its result. Unresolvable selections and unknown tool names are soft
//! failures — logged, and the loop moves on.
//!
//! The loop is an explicit iteration, not recursion: a cancellation flag
//! and an optional cycle bound are checked at each cycle boundary, both
//! off by default.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

use webpilot_core::context::{Feedback, Records, StepContext};
use webpilot_core::error::{Error, Result};
use webpilot_core::message::{History, Message, Transcript};
use webpilot_core::provider::{ModelRequest, Provider, supports_native_tool_calls};
use webpilot_core::tool::{FINISH_TOOL, ToolOutcome, ToolSet};

use crate::prompt;
use crate::selection::{self, Selection};
use crate::step::{ExecutionStep, Step, StepCommon, ThinkingStep};

/// Cooperative cancellation handle, checked at each cycle boundary.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The terminal `finish` tool fired; this is its outcome.
    Finished(ToolOutcome),
    /// The cancellation flag was raised.
    Cancelled,
    /// The configured cycle bound was reached.
    CycleLimit,
}

/// One agent instance: declared steps plus the state they share.
pub struct Agent {
    provider: Arc<dyn Provider>,
    steps: Vec<Step>,
    history: History,
    records: Records,
    feedback: Vec<Feedback>,
    cycle: u64,
    temperature: f32,
    max_tokens: u32,
    max_cycles: Option<u64>,
    cancel: CancellationFlag,
    transcript_path: Option<PathBuf>,
    reset_history_on_finish: bool,
}

impl Agent {
    /// Create an agent over an injected provider handle and a fixed step
    /// list. Request defaults: temperature 0.3, max_tokens 1000.
    pub fn new(provider: Arc<dyn Provider>, steps: Vec<Step>) -> Self {
        Self {
            provider,
            steps,
            history: History::new(),
            records: Records::new(),
            feedback: Vec::new(),
            cycle: 0,
            temperature: 0.3,
            max_tokens: 1000,
            max_cycles: None,
            cancel: CancellationFlag::new(),
            transcript_path: None,
            reset_history_on_finish: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Bound the number of reasoning cycles. Off by default.
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    /// Write the full history to this path when the task finishes.
    pub fn with_transcript_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript_path = Some(path.into());
        self
    }

    /// Clear history after a terminal completion.
    pub fn with_reset_history_on_finish(mut self, enabled: bool) -> Self {
        self.reset_history_on_finish = enabled;
        self
    }

    /// A handle that cancels the loop at the next cycle boundary.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Records {
        &mut self.records
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    /// The current reasoning cycle (0 before the first pass; never reset).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Drive the task until a terminal tool fires, the cancellation flag is
    /// raised, or the optional cycle bound is hit.
    pub async fn run(&mut self, task: &str) -> Result<TaskOutcome> {
        let run_id = Uuid::new_v4();
        info!(%run_id, task, steps = self.steps.len(), "Reasoning loop starting");

        // The step list is fixed for the duration of a run; step internals
        // are shared behind Arcs, so this clone is shallow.
        let steps = self.steps.clone();

        loop {
            if self.cancel.is_cancelled() {
                info!(cycle = self.cycle, "Run cancelled");
                return Ok(TaskOutcome::Cancelled);
            }

            if let Some(max) = self.max_cycles
                && self.cycle >= max
            {
                warn!(cycle = self.cycle, max, "Cycle bound reached");
                return Ok(TaskOutcome::CycleLimit);
            }

            self.cycle += 1;
            debug!(cycle = self.cycle, "Reasoning cycle");

            for step in &steps {
                if step.common().frequency.should_skip(self.cycle) {
                    debug!(cycle = self.cycle, kind = step.kind(), "Step gated off");
                    continue;
                }

                match step {
                    Step::Execution(exec) => {
                        if let Some(outcome) = self.run_execution_step(exec, task).await? {
                            info!(cycle = self.cycle, "Task completed");
                            self.finalize(run_id, task);
                            return Ok(TaskOutcome::Finished(outcome));
                        }
                    }
                    Step::Thinking(thinking) => {
                        self.run_thinking_step(thinking, task).await?;
                    }
                }
            }
        }
    }

    /// One execution step: assemble → model call → resolve → dispatch.
    /// Returns the terminal outcome if the finish tool fired.
    async fn run_execution_step(
        &mut self,
        step: &ExecutionStep,
        task: &str,
    ) -> Result<Option<ToolOutcome>> {
        let request = self.build_request(&step.common, Some(&step.tools), task).await?;
        let response = self.provider.complete(request).await?;

        if step.tools.is_empty() {
            // conversational step: fold the reply into history as-is
            self.history.push(Message::assistant(&response.content));
            return Ok(None);
        }

        let native = supports_native_tool_calls(&step.common.model);
        let Some(selection) = selection::resolve(&response, native) else {
            warn!(
                model = %step.common.model,
                "Could not resolve a tool selection from the model response"
            );
            return Ok(None);
        };

        self.dispatch(&step.tools, selection, task).await
    }

    /// Match the selection to a tool and invoke it. Unknown tools are soft;
    /// the terminal `finish` tool's outcome short-circuits the loop.
    async fn dispatch(
        &mut self,
        tools: &ToolSet,
        selection: Selection,
        task: &str,
    ) -> Result<Option<ToolOutcome>> {
        let Some(tool) = tools.get(&selection.action_name) else {
            warn!(action = %selection.action_name, "No tool registered for selection");
            return Ok(None);
        };

        self.history
            .push(Message::assistant(serde_json::to_string(&selection)?));

        let mut ctx = StepContext {
            task,
            history: &mut self.history,
            records: &mut self.records,
            feedback: &mut self.feedback,
        };

        if selection.action_name == FINISH_TOOL {
            let outcome = tool.invoke(&selection.params, &mut ctx).await?;
            return Ok(Some(outcome));
        }

        debug!(tool = %selection.action_name, "Executing tool");
        let outcome = tool.invoke(&selection.params, &mut ctx).await?;
        debug!(tool = %selection.action_name, ?outcome, "Tool outcome (discarded)");
        Ok(None)
    }

    /// One thinking step: assemble → model call → completion hook.
    async fn run_thinking_step(&mut self, step: &ThinkingStep, task: &str) -> Result<()> {
        let request = self.build_request(&step.common, None, task).await?;
        let response = self.provider.complete(request).await?;

        let mut ctx = StepContext {
            task,
            history: &mut self.history,
            records: &mut self.records,
            feedback: &mut self.feedback,
        };
        step.hook.on_response(&response.content, &mut ctx).await
    }

    /// Assemble the model request for one step on this cycle.
    async fn build_request(
        &self,
        common: &StepCommon,
        tools: Option<&ToolSet>,
        task: &str,
    ) -> Result<ModelRequest> {
        let system = prompt::build_system_prompt(common, tools, task, &self.records);

        let mut messages = vec![Message::system(system)];
        messages.extend(self.history.replay());
        if let Some(user) = prompt::build_user_message(common, task).await? {
            messages.push(user);
        }

        // tool schemas ride the request only for native-tool-call models;
        // fenced-JSON models get them in the system prompt instead
        let (tool_definitions, tool_choice) = match tools {
            Some(set) if !set.is_empty() && supports_native_tool_calls(&common.model) => {
                (set.definitions(), Some("auto".to_string()))
            }
            _ => (vec![], None),
        };

        Ok(ModelRequest {
            model: common.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: tool_definitions,
            tool_choice,
        })
    }

    /// Terminal bookkeeping: persist the transcript, optionally clear
    /// history. Failures here are logged, never surfaced — the task itself
    /// already completed.
    fn finalize(&mut self, run_id: Uuid, task: &str) {
        if let Some(path) = &self.transcript_path {
            let transcript = Transcript::new(run_id, task, &self.history);
            match serde_json::to_string_pretty(&transcript) {
                Ok(json) => match std::fs::write(path, json) {
                    Ok(()) => info!(path = %path.display(), "Transcript written"),
                    Err(e) => warn!(path = %path.display(), error = %e, "Failed to write transcript"),
                },
                Err(e) => warn!(error = %e, "Failed to serialize transcript"),
            }
        }

        if self.reset_history_on_finish {
            self.history.reset();
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.provider.name())
            .field("steps", &self.steps)
            .field("cycle", &self.cycle)
            .field("max_cycles", &self.max_cycles)
            .finish()
    }
}
