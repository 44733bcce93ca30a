//! Handlers for the `/auth` resource (signup, OTP verification, login,
//! refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beacon_core::account::{normalize_email, require_non_empty, validate_email};
use beacon_core::error::CoreError;
use beacon_core::otp::generate_otp;
use beacon_core::pending_signup::PendingSignup;
use beacon_core::types::DbId;
use beacon_db::models::session::CreateSession;
use beacon_db::models::user::{CreateUser, User};
use beacon_db::repositories::{SessionRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by verify-otp, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub user_name: String,
    pub email: String,
    pub mode: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            mode: user.mode.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Validate the registration, hold it as a pending signup and email a
/// one-time passcode. No user row exists until the OTP is verified.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    require_non_empty("user_name", &input.user_name)?;
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_password_strength(&input.password)?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let otp = generate_otp();

    state.pending_signups.insert(PendingSignup {
        user_name: input.user_name.trim().to_string(),
        email: email.clone(),
        password_hash,
        otp: otp.clone(),
    });

    let ttl_minutes = state.config.otp_ttl_mins;
    match &state.mailer {
        Some(mailer) => mailer
            .send_otp(&email, &otp, ttl_minutes)
            .await
            .map_err(|e| {
                AppError::Core(CoreError::Dependency(format!("Failed to send OTP email: {e}")))
            })?,
        None => tracing::warn!(email = %email, "SMTP not configured, OTP email not sent"),
    }

    tracing::info!(email = %email, "Pending signup created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok(
            "OTP sent to your email. Please verify to complete registration.",
        )),
    ))
}

/// POST /api/v1/auth/verify-otp
///
/// Confirm a pending signup. On success the user is created (verified) and
/// signed in.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(input): Json<VerifyOtpRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    require_non_empty("email", &email)?;
    require_non_empty("otp", &input.otp)?;

    let pending = state.pending_signups.verify(&email, input.otp.trim())?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            user_name: pending.user_name,
            email: pending.email,
            password_hash: pending.password_hash,
            is_verified: true,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Email and password are required".into(),
        )));
    }

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    if !user.is_verified {
        return Err(AppError::Core(CoreError::Forbidden(
            "Please verify your email before logging in".into(),
        )));
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    // Redeeming deletes the session, so each refresh token works once.
    let session = SessionRepo::take_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// End all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let ended = SessionRepo::delete_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, ended, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo::from(user),
    })
}
