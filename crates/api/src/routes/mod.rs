pub mod account;
pub mod auth;
pub mod health;
pub mod notification;
pub mod sos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                      create pending signup, email OTP (public)
/// /auth/verify-otp                  confirm signup, sign in (public)
/// /auth/login                       login (public)
/// /auth/refresh                     rotate refresh token (public)
/// /auth/logout                      revoke sessions (requires auth)
///
/// /profile                          get, update (requires auth)
/// /account                          delete (requires auth + password)
/// /select-mode                      set app mode (requires auth)
///
/// /sos                              directory-based SOS (requires auth)
/// /sos/self-help                    hospital lookup SOS (requires auth)
/// /sos/other-help                   third-party SOS (auth optional)
/// /sos/test                         test alert to sandbox recipient (requires auth)
///
/// /notifications/send               create notification (public)
/// /notifications                    list own (requires auth)
/// /notifications/unread-count       count unseen (requires auth)
/// /notifications/mark-seen          mark all seen (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(account::router())
        .nest("/sos", sos::router())
        .nest("/notifications", notification::router())
}
