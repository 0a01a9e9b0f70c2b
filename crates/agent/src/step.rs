//! Step model — the declarative units of the reasoning loop.
//!
//! A step is either `Thinking` (the model's raw text goes to a completion
//! hook) or `Execution` (the model's response is resolved into a tool
//! selection and dispatched). Steps are built once from a partial
//! declaration merged over documented defaults; misconfiguration fails at
//! build time, never mid-run.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use webpilot_core::StepContext;
use webpilot_core::error::Error;
use webpilot_core::message::ContentPart;
use webpilot_core::prompt::PromptTree;
use webpilot_core::tool::{Tool, ToolSet};

/// Builder defaults, matching the documented step defaults.
const DEFAULT_MODEL: &str = "gpt-4-vision-preview";
const DEFAULT_EXECUTION_PROMPT: &str =
    "You are an AI assistant that can help with a variety of tasks.";

/// A zero-argument predicate evaluated fresh at each gate check.
pub type GatePredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Builds the step's user turn for the current cycle: task in, ordered
/// content parts out. An empty part list appends no user turn.
pub type UserMessageFactory =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Vec<ContentPart>, Error>> + Send + Sync>;

/// When a step fires, as a pure function of the cycle counter.
#[derive(Clone)]
pub enum Frequency {
    /// Only on cycle 1
    First,
    /// When `cycle % n == 0` (`n = 1` means every cycle)
    Every(u64),
    /// When `cycle % n != 0`
    Except(u64),
    /// While `cycle < n`
    LessThan(u64),
    /// While `cycle > n`
    MoreThan(u64),
    /// When the predicate holds; re-evaluated at every gate check so it may
    /// read external mutable state (e.g. "is a browser session open?")
    If(GatePredicate),
}

impl Frequency {
    /// The gate: should this step be skipped on the given cycle?
    pub fn should_skip(&self, cycle: u64) -> bool {
        match self {
            Self::First => cycle != 1,
            Self::Every(n) => cycle % n != 0,
            Self::Except(n) => cycle % n == 0,
            Self::LessThan(n) => cycle >= *n,
            Self::MoreThan(n) => cycle <= *n,
            Self::If(pred) => !pred(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Every(0) | Self::Except(0) => Err(Error::Config {
                message: "frequency divisor must be at least 1".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Every(1)
    }
}

impl std::fmt::Debug for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "First"),
            Self::Every(n) => write!(f, "Every({n})"),
            Self::Except(n) => write!(f, "Except({n})"),
            Self::LessThan(n) => write!(f, "LessThan({n})"),
            Self::MoreThan(n) => write!(f, "MoreThan({n})"),
            Self::If(_) => write!(f, "If(<predicate>)"),
        }
    }
}

/// The source of a step's system message.
#[derive(Debug, Clone)]
pub enum SystemPrompt {
    Literal(String),
    Structured(PromptTree),
}

impl SystemPrompt {
    /// Resolve to the raw (pre-substitution) prompt text.
    pub fn resolve(&self) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Structured(tree) => tree.compile(),
        }
    }
}

impl From<&str> for SystemPrompt {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for SystemPrompt {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<PromptTree> for SystemPrompt {
    fn from(tree: PromptTree) -> Self {
        Self::Structured(tree)
    }
}

/// Completion hook for thinking steps.
///
/// Receives the model's raw response text and the explicit step context;
/// any return value beyond errors is discarded by the loop — effects happen
/// through the context (records, history, feedback).
#[async_trait]
pub trait ThinkingHook: Send + Sync {
    async fn on_response(&self, response: &str, ctx: &mut StepContext<'_>) -> Result<(), Error>;
}

/// Adapter for synchronous hook closures, the common case.
pub struct ThinkingFn<F>(pub F);

#[async_trait]
impl<F> ThinkingHook for ThinkingFn<F>
where
    F: Fn(&str, &mut StepContext<'_>) -> Result<(), Error> + Send + Sync,
{
    async fn on_response(&self, response: &str, ctx: &mut StepContext<'_>) -> Result<(), Error> {
        (self.0)(response, ctx)
    }
}

/// Fields shared by both step kinds.
#[derive(Clone)]
pub struct StepCommon {
    /// Target model identifier
    pub model: String,

    /// When this step fires
    pub frequency: Frequency,

    /// System-message source (literal or structured tree)
    pub system_prompt: SystemPrompt,

    /// Optional per-cycle user-turn factory
    pub user_message: Option<UserMessageFactory>,

    /// Optional gate on appending the factory's user turn; absent = always
    pub append_user_message: Option<GatePredicate>,
}

/// An analytical step: model text → completion hook.
#[derive(Clone)]
pub struct ThinkingStep {
    pub common: StepCommon,
    pub hook: Arc<dyn ThinkingHook>,
}

/// An action-taking step: model response → selection → tool dispatch.
#[derive(Clone)]
pub struct ExecutionStep {
    pub common: StepCommon,
    pub tools: ToolSet,
}

/// One declared unit of model interaction.
#[derive(Clone)]
pub enum Step {
    Thinking(ThinkingStep),
    Execution(ExecutionStep),
}

impl Step {
    pub fn common(&self) -> &StepCommon {
        match self {
            Self::Thinking(s) => &s.common,
            Self::Execution(s) => &s.common,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Thinking(_) => "thinking",
            Self::Execution(_) => "execution",
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind())
            .field("model", &self.common().model)
            .field("frequency", &self.common().frequency)
            .finish()
    }
}

// --- Builders ---

/// Builder for [`ThinkingStep`]; defaults: vision model, every cycle,
/// empty system prompt.
pub struct ThinkingStepBuilder {
    model: String,
    frequency: Frequency,
    system_prompt: SystemPrompt,
    user_message: Option<UserMessageFactory>,
    append_user_message: Option<GatePredicate>,
    hook: Option<Arc<dyn ThinkingHook>>,
}

impl ThinkingStep {
    pub fn builder() -> ThinkingStepBuilder {
        ThinkingStepBuilder {
            model: DEFAULT_MODEL.into(),
            frequency: Frequency::default(),
            system_prompt: SystemPrompt::Literal(String::new()),
            user_message: None,
            append_user_message: None,
            hook: None,
        }
    }
}

impl ThinkingStepBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<SystemPrompt>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn user_message(mut self, factory: UserMessageFactory) -> Self {
        self.user_message = Some(factory);
        self
    }

    pub fn append_user_message_when(mut self, predicate: GatePredicate) -> Self {
        self.append_user_message = Some(predicate);
        self
    }

    pub fn hook(mut self, hook: impl ThinkingHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Convenience for synchronous hooks.
    pub fn on_response<F>(self, hook: F) -> Self
    where
        F: Fn(&str, &mut StepContext<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.hook(ThinkingFn(hook))
    }

    pub fn build(self) -> Result<Step, Error> {
        self.frequency.validate()?;
        let hook = self.hook.ok_or_else(|| Error::Config {
            message: "thinking step requires a completion hook".into(),
        })?;
        Ok(Step::Thinking(ThinkingStep {
            common: StepCommon {
                model: self.model,
                frequency: self.frequency,
                system_prompt: self.system_prompt,
                user_message: self.user_message,
                append_user_message: self.append_user_message,
            },
            hook,
        }))
    }
}

/// Builder for [`ExecutionStep`]; defaults: vision model, every cycle,
/// generic assistant system prompt, no tools.
pub struct ExecutionStepBuilder {
    model: String,
    frequency: Frequency,
    system_prompt: SystemPrompt,
    user_message: Option<UserMessageFactory>,
    append_user_message: Option<GatePredicate>,
    tools: Vec<Arc<dyn Tool>>,
}

impl ExecutionStep {
    pub fn builder() -> ExecutionStepBuilder {
        ExecutionStepBuilder {
            model: DEFAULT_MODEL.into(),
            frequency: Frequency::default(),
            system_prompt: SystemPrompt::Literal(DEFAULT_EXECUTION_PROMPT.into()),
            user_message: None,
            append_user_message: None,
            tools: vec![],
        }
    }
}

impl ExecutionStepBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<SystemPrompt>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn user_message(mut self, factory: UserMessageFactory) -> Self {
        self.user_message = Some(factory);
        self
    }

    pub fn append_user_message_when(mut self, predicate: GatePredicate) -> Self {
        self.append_user_message = Some(predicate);
        self
    }

    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn build(self) -> Result<Step, Error> {
        self.frequency.validate()?;
        let tools = ToolSet::new(self.tools)?;
        Ok(Step::Execution(ExecutionStep {
            common: StepCommon {
                model: self.model,
                frequency: self.frequency,
                system_prompt: self.system_prompt,
                user_message: self.user_message,
                append_user_message: self.append_user_message,
            },
            tools,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use webpilot_core::error::ToolError;
    use webpilot_core::tool::{ToolDefinition, ToolOutcome, ToolParams};

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.0.into(),
                description: String::new(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn invoke(
            &self,
            _params: &ToolParams,
            _ctx: &mut StepContext<'_>,
        ) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::Done)
        }
    }

    #[test]
    fn gate_matches_frequency_table() {
        for cycle in 0..=50u64 {
            assert_eq!(Frequency::First.should_skip(cycle), cycle != 1);
            for n in 1..=7u64 {
                assert_eq!(Frequency::Every(n).should_skip(cycle), cycle % n != 0);
                assert_eq!(Frequency::Except(n).should_skip(cycle), cycle % n == 0);
                assert_eq!(Frequency::LessThan(n).should_skip(cycle), cycle >= n);
                assert_eq!(Frequency::MoreThan(n).should_skip(cycle), cycle <= n);
            }
        }
    }

    #[test]
    fn every_one_fires_every_cycle() {
        for cycle in 1..=10 {
            assert!(!Frequency::Every(1).should_skip(cycle));
        }
    }

    #[test]
    fn if_gate_reevaluates_predicate() {
        let flag = Arc::new(AtomicBool::new(false));
        let probe = flag.clone();
        let freq = Frequency::If(Arc::new(move || probe.load(Ordering::SeqCst)));

        assert!(freq.should_skip(1));
        flag.store(true, Ordering::SeqCst);
        assert!(!freq.should_skip(2));
        flag.store(false, Ordering::SeqCst);
        assert!(freq.should_skip(3));
    }

    #[test]
    fn zero_divisor_rejected_at_build() {
        let err = ThinkingStep::builder()
            .frequency(Frequency::Every(0))
            .on_response(|_, _| Ok(()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("divisor"));

        assert!(
            ExecutionStep::builder()
                .frequency(Frequency::Except(0))
                .build()
                .is_err()
        );
    }

    #[test]
    fn thinking_step_requires_hook() {
        let err = ThinkingStep::builder().build().unwrap_err();
        assert!(err.to_string().contains("hook"));
    }

    #[test]
    fn duplicate_tool_names_rejected() {
        let err = ExecutionStep::builder()
            .tools(vec![
                Arc::new(NamedTool("navigate")),
                Arc::new(NamedTool("navigate")),
            ])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn builder_defaults() {
        let step = ExecutionStep::builder().build().unwrap();
        assert_eq!(step.common().model, DEFAULT_MODEL);
        assert!(!step.common().frequency.should_skip(1));
        assert!(!step.common().frequency.should_skip(2));
        match &step.common().system_prompt {
            SystemPrompt::Literal(text) => assert!(text.contains("AI assistant")),
            other => panic!("Expected literal default prompt, got {other:?}"),
        }
    }
}
