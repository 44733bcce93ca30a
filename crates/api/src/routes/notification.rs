//! Route definitions for the `/notifications` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /send          -> send_notification
/// GET    /              -> list_notifications
/// GET    /unread-count  -> unread_count
/// PUT    /mark-seen     -> mark_all_seen
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/send", post(notification::send_notification))
        .route("/unread-count", get(notification::unread_count))
        .route("/mark-seen", put(notification::mark_all_seen))
}
