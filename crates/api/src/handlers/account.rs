//! Handlers for the signed-in user's own account: profile, app mode and
//! account deletion.

use axum::extract::State;
use axum::Json;
use beacon_core::account::{normalize_email, require_non_empty, validate_email, UserMode};
use beacon_core::error::CoreError;
use beacon_db::models::user::{ProfileResponse, UpdateProfile, User};
use beacon_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Request body for `DELETE /account`.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// Request body for `POST /select-mode`.
#[derive(Debug, Deserialize)]
pub struct SelectModeRequest {
    pub mode: String,
}

/// Load the authenticated user's row; a token for a deleted account is
/// treated as unauthenticated.
pub(crate) async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

/// GET /api/v1/profile
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(DataResponse {
        data: ProfileResponse::from(&user),
    }))
}

/// PUT /api/v1/profile
///
/// Partial update; omitted fields are left unchanged. A changed email must
/// be well-formed and not belong to another account (409).
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    if let Some(name) = &input.name {
        require_non_empty("name", name)?;
        input.name = Some(name.trim().to_string());
    }
    if let Some(email) = &input.email {
        let email = normalize_email(email);
        validate_email(&email)?;
        input.email = Some(email);
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse {
        data: ProfileResponse::from(&user),
    }))
}

/// DELETE /api/v1/account
///
/// Re-verifies the password before permanently deleting the account.
/// Sessions and notifications go with it; SOS log entries are kept.
pub async fn delete_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteAccountRequest>,
) -> AppResult<Json<MessageResponse>> {
    if input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Password is required".into(),
        )));
    }

    let user = current_user(&state, &auth).await?;
    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid password".into(),
        )));
    }

    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Account deleted");
    Ok(Json(MessageResponse::ok("Account deleted successfully")))
}

/// POST /api/v1/select-mode
pub async fn select_mode(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SelectModeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let mode: UserMode = input.mode.trim().parse()?;

    let updated = UserRepo::set_mode(&state.pool, auth.user_id, mode.as_str()).await?;
    if !updated {
        return Err(AppError::Core(CoreError::Unauthorized(
            "User no longer exists".into(),
        )));
    }

    Ok(Json(MessageResponse::ok(format!(
        "Mode set to {}",
        mode.as_str()
    ))))
}
