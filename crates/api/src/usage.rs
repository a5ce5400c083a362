//! Quota bookkeeping shared by the metered feature handlers.
//!
//! Flow for one metered request:
//!
//! 1. [`require_quota`]: load the caller (creating the row on first use),
//!    persist any pending day reset or plan downgrade, reject with 429 when
//!    nothing is left.
//! 2. The handler calls the LLM.
//! 3. [`consume`]: spend one use atomically and log it.
//! 4. [`save_history`]: store the result, best-effort.

use chrono::Utc;
use tomtat_core::error::CoreError;
use tomtat_core::ids;
use tomtat_core::prompts::PromptSpec;
use tomtat_core::quota::UsageInfo;
use tomtat_core::types::Timestamp;
use tomtat_db::models::status::SummaryKind;
use tomtat_db::models::summary::CreateSummary;
use tomtat_db::models::user::User;
use tomtat_db::repositories::{SummaryRepo, UsageLogRepo, UserRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// A caller that passed the quota check.
#[derive(Debug, Clone)]
pub struct Metered {
    pub user: User,
    /// Daily limit of the plan in force.
    pub daily_limit: i32,
}

/// Return the caller's user row, creating a Free account on first contact.
pub async fn load_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    let today = Utc::now().date_naive();
    let user = UserRepo::get_or_create(
        &state.pool,
        &auth.external_id,
        auth.email.as_deref(),
        &ids::referral_code(),
        today,
    )
    .await?;
    Ok(user)
}

/// Evaluate `user` at `now` and write back any day reset or downgrade the
/// evaluation found pending.
pub async fn refresh_usage(
    state: &AppState,
    user: &User,
    now: Timestamp,
) -> AppResult<UsageInfo> {
    let eval = user
        .usage_snapshot()
        .evaluate(&state.config.quota.limits, now);

    if eval.needs_downgrade && UserRepo::downgrade_to_free(&state.pool, user.id, now).await? {
        tracing::info!(user_id = user.id, plan = %user.subscription, "Subscription expired, downgraded to Free");
    }
    if eval.needs_daily_reset {
        UserRepo::reset_daily_usage(&state.pool, user.id, now.date_naive()).await?;
    }

    Ok(eval.info)
}

/// Load the caller and fail with `QuotaExceeded` if no use is left today.
pub async fn require_quota(state: &AppState, auth: &AuthUser) -> AppResult<Metered> {
    let user = load_user(state, auth).await?;
    let info = refresh_usage(state, &user, Utc::now()).await?;

    if !info.can_use {
        tracing::info!(user_id = user.id, used_today = info.used_today, "Daily quota exhausted");
        return Err(CoreError::QuotaExceeded(info).into());
    }

    Ok(Metered {
        daily_limit: info.daily_limit,
        user,
    })
}

/// Spend one use of `feature` and return the uses left afterwards.
///
/// Fails with `QuotaExceeded` if a concurrent request spent the last use
/// between the check and this call.
pub async fn consume(state: &AppState, metered: &Metered, feature: SummaryKind) -> AppResult<i32> {
    let now = Utc::now();
    let today = now.date_naive();

    let Some(updated) =
        UserRepo::try_consume(&state.pool, metered.user.id, metered.daily_limit, today).await?
    else {
        let current = UserRepo::find_by_id(&state.pool, metered.user.id)
            .await?
            .unwrap_or_else(|| metered.user.clone());
        let info = current
            .usage_snapshot()
            .evaluate(&state.config.quota.limits, now)
            .info;
        return Err(CoreError::QuotaExceeded(info).into());
    };

    if let Err(e) = UsageLogRepo::record(&state.pool, updated.id, feature.as_str(), today).await {
        tracing::warn!(user_id = updated.id, feature = %feature, error = %e, "Failed to record usage log");
    }

    let info = updated
        .usage_snapshot()
        .evaluate(&state.config.quota.limits, now)
        .info;
    tracing::debug!(user_id = updated.id, feature = %feature, remaining = info.remaining_uses, "Use consumed");
    Ok(info.remaining_uses)
}

/// Store a history record and trim the user's history. Failures are logged
/// and swallowed.
pub async fn save_history(state: &AppState, input: CreateSummary) {
    let user_id = input.user_id;
    if let Err(e) = SummaryRepo::create(&state.pool, &input).await {
        tracing::warn!(user_id, kind = %input.kind, error = %e, "Failed to save history record");
        return;
    }
    match SummaryRepo::prune_for_user(&state.pool, user_id).await {
        Ok(0) => {}
        Ok(pruned) => tracing::debug!(user_id, pruned, "Pruned old history records"),
        Err(e) => tracing::warn!(user_id, error = %e, "Failed to prune history"),
    }
}

/// Run `prompt`, reusing a cached answer stored under `key` when there is one.
///
/// Returns the answer and whether it came from the cache. Cache failures
/// count as misses.
pub async fn cached_completion(
    state: &AppState,
    key: &str,
    prompt: &PromptSpec,
) -> AppResult<(String, bool)> {
    match state.cache.get(key).await {
        Ok(Some(hit)) => return Ok((hit, true)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Cache read failed"),
    }

    let answer = state.llm.complete(prompt).await?;

    if let Err(e) = state.cache.set(key, &answer).await {
        tracing::warn!(error = %e, "Cache write failed");
    }
    Ok((answer, false))
}
