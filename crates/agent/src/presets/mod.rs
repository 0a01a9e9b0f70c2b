//! Preset steps and composed pilots.
//!
//! Ready-made step declarations (planning, session bootstrap, crawling,
//! evaluation), subordinate-agent delegation, and the two pilot
//! compositions built from them.

pub mod browsing;
pub mod delegate;
pub mod evaluate;
pub mod pilots;
pub mod planning;

pub use browsing::{crawling_step, session_bootstrap_step, snapshot_user_message};
pub use delegate::DelegateTool;
pub use evaluate::evaluate_step;
pub use pilots::{crawler_pilot, mission_pilot};
pub use planning::planning_step;
