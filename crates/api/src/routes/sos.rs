//! Route definitions for the `/sos` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::sos;
use crate::state::AppState;
use crate::uploads::MAX_UPLOAD_BYTES;

/// Routes mounted at `/sos`.
///
/// ```text
/// POST /            -> raise_directory (requires auth)
/// POST /self-help   -> raise_self_help (requires auth)
/// POST /other-help  -> raise_other_help (auth optional)
/// POST /test        -> send_test (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sos::raise_directory))
        .route("/self-help", post(sos::raise_self_help))
        .route("/other-help", post(sos::raise_other_help))
        .route("/test", post(sos::send_test))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
