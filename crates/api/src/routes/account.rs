//! Routes for the signed-in user's own account, mounted at the API root.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// ```text
/// GET    /profile      -> get_profile
/// PUT    /profile      -> update_profile
/// DELETE /account      -> delete_account
/// POST   /select-mode  -> select_mode
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route("/account", delete(account::delete_account))
        .route("/select-mode", post(account::select_mode))
}
