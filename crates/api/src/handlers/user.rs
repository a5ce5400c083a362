//! Handlers for the caller's own account: profile, identity sync, usage and
//! subscription.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tomtat_core::error::CoreError;
use tomtat_core::ids;
use tomtat_core::quota::UsageInfo;
use tomtat_core::types::Timestamp;
use tomtat_db::models::user::{SyncUser, UpdateProfile, User};
use tomtat_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::usage;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub user: User,
}

/// GET /api/user/profile
///
/// Returns the caller's profile, creating it on first access.
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = usage::load_user(&state, &auth).await?;
    Ok(Json(UserResponse { user }))
}

/// PUT /api/user/profile
///
/// Only `fullName` and `imageUrl` can be changed; other fields are ignored.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    let existing = usage::load_user(&state, &auth).await?;
    let user = UserRepo::update_profile(&state.pool, existing.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "người dùng",
            id: auth.external_id.clone(),
        }))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(UserResponse { user }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl SyncRequest {
    /// "First Last", or whichever part is present.
    fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// POST /api/user/sync
///
/// Push identity-provider data after sign-in. An empty body is treated as
/// `{}` and rejected for the missing email.
pub async fn sync(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<SyncResponse>> {
    let input: SyncRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AppError::BadRequest("Dữ liệu JSON không hợp lệ".into()))?
    };

    let Some(email) = input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
        return Err(CoreError::Validation("Thiếu email".into()).into());
    };

    let sync = SyncUser {
        email: email.to_string(),
        full_name: input.full_name(),
        image_url: input.image_url.clone(),
    };
    let user = UserRepo::upsert_from_sync(
        &state.pool,
        &auth.external_id,
        &sync,
        &ids::referral_code(),
        Utc::now().date_naive(),
    )
    .await?;

    tracing::info!(user_id = user.id, "User synced");
    Ok(Json(SyncResponse {
        success: true,
        user,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub success: bool,
    pub usage_info: UsageInfo,
}

/// GET /api/user/usage
pub async fn get_usage(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UsageResponse>> {
    let user = usage::load_user(&state, &auth).await?;
    let usage_info = usage::refresh_usage(&state, &user, Utc::now()).await?;
    Ok(Json(UsageResponse {
        success: true,
        usage_info,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub plan: String,
    pub subscription_expiry: Option<Timestamp>,
}

/// GET /api/user/subscription
///
/// Reports the plan in force; a lapsed paid plan reads as Free.
pub async fn get_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SubscriptionResponse>> {
    let user = usage::load_user(&state, &auth).await?;
    let usage_info = usage::refresh_usage(&state, &user, Utc::now()).await?;

    let subscription_expiry = if usage_info.subscription == user.subscription {
        user.subscription_expiry
    } else {
        None
    };
    Ok(Json(SubscriptionResponse {
        plan: usage_info.subscription,
        subscription_expiry,
    }))
}
