//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod payment_repo;
pub mod referral_repo;
pub mod summary_repo;
pub mod usage_log_repo;
pub mod user_repo;

pub use payment_repo::PaymentRepo;
pub use referral_repo::ReferralRepo;
pub use summary_repo::SummaryRepo;
pub use usage_log_repo::UsageLogRepo;
pub use user_repo::UserRepo;
