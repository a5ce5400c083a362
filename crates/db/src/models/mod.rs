//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches where clients send them

pub mod payment;
pub mod referral;
pub mod status;
pub mod summary;
pub mod usage_log;
pub mod user;
