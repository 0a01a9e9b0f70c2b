//! WebPilot agent — the step/cycle reasoning loop.
//!
//! An [`Agent`] owns a fixed, declaration-ordered list of [`Step`]s and the
//! state they share (history, records, feedback, cycle counter). On each
//! cycle, every step that passes its [`Frequency`] gate fires: thinking
//! steps hand the model's raw text to a completion hook, execution steps
//! resolve the response into a [`Selection`] and dispatch it to the step's
//! tools. The reserved `finish` tool ends the loop.
//!
//! [`presets`] carries ready-made step declarations and two composed
//! pilots mirroring common browser-driving setups.

pub mod loop_runner;
pub mod presets;
pub mod prompt;
pub mod selection;
pub mod step;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

pub use loop_runner::{Agent, CancellationFlag, TaskOutcome};
pub use selection::Selection;
pub use step::{
    ExecutionStep, Frequency, GatePredicate, Step, SystemPrompt, ThinkingFn, ThinkingHook,
    ThinkingStep, UserMessageFactory,
};
