//! Chat-completion client used by every text feature.
//!
//! Handlers depend on the [`ChatCompletion`] trait so tests can substitute a
//! canned implementation; [`OpenAiClient`] is the production one.

pub mod client;
pub mod error;

pub use client::{ChatCompletion, Message, OpenAiClient};
pub use error::LlmError;
