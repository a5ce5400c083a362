//! Domain logic for the AI Tóm tắt backend.
//!
//! Everything here is pure: no database, network or runtime dependencies, so
//! the quota arithmetic, payment signing templates and prompt catalogue can be
//! unit-tested in isolation and shared by every other crate.

pub mod cache_key;
pub mod error;
pub mod hashing;
pub mod ids;
pub mod plans;
pub mod prompts;
pub mod quota;
pub mod sharing;
pub mod signing;
pub mod text;
pub mod types;
