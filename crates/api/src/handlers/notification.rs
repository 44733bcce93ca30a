//! Handlers for the `/notifications` resource (in-app feed).
//!
//! `POST /send` is open; the rest require authentication via [`AuthUser`].

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::account::require_non_empty;
use beacon_core::error::CoreError;
use beacon_core::types::DbId;
use beacon_db::models::notification::{CreateNotification, Notification};
use beacon_db::repositories::{NotificationRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Request body for `POST /notifications/send`.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub user_id: DbId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UnseenCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedSeen {
    pub marked_seen: u64,
}

const MAX_LIMIT: i64 = 100;
const DEFAULT_LIMIT: i64 = 50;

/// POST /api/v1/notifications/send
///
/// Create a notification for `user_id`. Returns 201 with the created row,
/// or 404 if the user does not exist.
pub async fn send_notification(
    State(state): State<AppState>,
    Json(input): Json<SendNotificationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Notification>>)> {
    require_non_empty("message", &input.message)?;

    if UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }));
    }

    let notification = NotificationRepo::create(
        &state.pool,
        &CreateNotification {
            user_id: input.user_id,
            message: input.message,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: notification })))
}

/// GET /api/v1/notifications
///
/// The authenticated user's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let notifications =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnseenCount>>> {
    let count = NotificationRepo::unseen_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnseenCount { count },
    }))
}

/// PUT /api/v1/notifications/mark-seen
///
/// Mark every unseen notification as seen and return how many changed.
pub async fn mark_all_seen(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedSeen>>> {
    let marked_seen = NotificationRepo::mark_all_seen(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedSeen { marked_seen },
    }))
}
