//! LLM provider implementations for WebPilot.
//!
//! One backend covers nearly everything: any endpoint speaking the OpenAI
//! `/v1/chat/completions` dialect.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
