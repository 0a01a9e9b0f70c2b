//! Built-in tool implementations for WebPilot.
//!
//! Tools give execution steps the ability to act: drive the browser, ask
//! the operator a question, extract page content, and finish the task.
//! The [`stub::StubDriver`] lets everything run end-to-end without a real
//! browser behind the driver seam.

pub mod browser;
pub mod extraction;
pub mod finish;
pub mod prompt_user;
pub mod stub;

pub use browser::{
    ClickTool, GoBackTool, NavigateTool, ScrollTool, TypeTool, WaitLoadTool, crawling_tools,
};
pub use extraction::ContentExtractionTool;
pub use finish::FinishTool;
pub use prompt_user::{PromptUserTool, StdinPrompt, UserPrompt};
pub use stub::StubDriver;
