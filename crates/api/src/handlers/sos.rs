//! Handlers for the `/sos` resource.
//!
//! Every endpoint accepts either a JSON body or `multipart/form-data` (see
//! [`SosSubmission`]). Input is validated before an attachment is written to
//! disk, so a rejected request leaves nothing behind.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use beacon_core::error::CoreError;
use beacon_core::geo::GeoPoint;
use beacon_core::sos::message::compose_test_alert;
use beacon_core::sos::{DispatchSummary, Requester, SosFlow, SosRequest};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::account::current_user;
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::MessageResponse;
use crate::state::AppState;
use crate::uploads::{self, Upload};

// ---------------------------------------------------------------------------
// Request extraction
// ---------------------------------------------------------------------------

/// Raw SOS input: coordinates as text plus optional third-party details
/// and attachment.
#[derive(Debug, Default)]
pub struct SosSubmission {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub media: Option<Upload>,
}

/// JSON coordinates arrive as numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn into_text(self) -> String {
        match self {
            Coordinate::Number(n) => n.to_string(),
            Coordinate::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<Coordinate>,
    lng: Option<Coordinate>,
}

#[derive(Debug, Deserialize)]
struct SosJsonBody {
    latitude: Option<Coordinate>,
    longitude: Option<Coordinate>,
    /// Older clients nest coordinates as `{"location": {"lat", "lng"}}`.
    location: Option<LatLng>,
    name: Option<String>,
    phone: Option<String>,
}

impl From<SosJsonBody> for SosSubmission {
    fn from(body: SosJsonBody) -> Self {
        let (nested_lat, nested_lng) = match body.location {
            Some(loc) => (loc.lat, loc.lng),
            None => (None, None),
        };
        SosSubmission {
            latitude: body.latitude.or(nested_lat).map(Coordinate::into_text),
            longitude: body.longitude.or(nested_lng).map(Coordinate::into_text),
            name: body.name,
            phone: body.phone,
            media: None,
        }
    }
}

impl FromRequest<AppState> for SosSubmission {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(body) = Json::<SosJsonBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(body.into());
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut submission = SosSubmission::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "media" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    // Forms without a chosen file still send an empty part.
                    if !bytes.is_empty() {
                        submission.media = Some(Upload {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "latitude" | "longitude" | "name" | "phone" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    let slot = match name.as_str() {
                        "latitude" => &mut submission.latitude,
                        "longitude" => &mut submission.longitude,
                        "name" => &mut submission.name,
                        _ => &mut submission.phone,
                    };
                    *slot = Some(text);
                }
                _ => {} // ignore unknown fields
            }
        }

        Ok(submission)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sos
///
/// Directory-based flow: alert the nearest stored responders.
pub async fn raise_directory(
    auth: AuthUser,
    State(state): State<AppState>,
    submission: SosSubmission,
) -> AppResult<Json<DispatchSummary>> {
    let requester = user_requester(&state, &auth).await?;
    raise(&state, SosFlow::Directory, requester, submission).await
}

/// POST /api/v1/sos/self-help
///
/// Alert the nearest hospitals; nearby pharmacies are returned as advisory.
pub async fn raise_self_help(
    auth: AuthUser,
    State(state): State<AppState>,
    submission: SosSubmission,
) -> AppResult<Json<DispatchSummary>> {
    let requester = user_requester(&state, &auth).await?;
    raise(&state, SosFlow::SelfHelp, requester, submission).await
}

/// POST /api/v1/sos/other-help
///
/// Report on behalf of someone else. `name` and `phone` of the person in
/// need are required; signing in is optional and only recorded on the log.
pub async fn raise_other_help(
    OptionalAuthUser(auth): OptionalAuthUser,
    State(state): State<AppState>,
    mut submission: SosSubmission,
) -> AppResult<Json<DispatchSummary>> {
    let requester = Requester::ThirdParty {
        name: submission.name.take().unwrap_or_default().trim().to_string(),
        phone: submission.phone.take().unwrap_or_default().trim().to_string(),
        reported_by: auth.map(|a| a.user_id),
    };
    raise(&state, SosFlow::OtherHelp, requester, submission).await
}

/// POST /api/v1/sos/test
///
/// Send a test alert straight to the messaging sandbox recipient (or the
/// user's own phone when no sandbox recipient is configured). No responders
/// are resolved and nothing is logged. 500 if the channel rejects it.
pub async fn send_test(
    auth: AuthUser,
    State(state): State<AppState>,
    submission: SosSubmission,
) -> AppResult<Json<MessageResponse>> {
    let user = current_user(&state, &auth).await?;
    let point = GeoPoint::parse(
        submission.latitude.as_deref(),
        submission.longitude.as_deref(),
    )?;

    let target = state
        .config
        .sos
        .override_recipient
        .clone()
        .or(user.phone.clone())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "No test recipient configured and no phone on profile".into(),
            ))
        })?;

    let attachment = match &submission.media {
        Some(upload) => Some(uploads::store(&state.config.uploads_dir, upload).await?),
        None => None,
    };
    let media_url = public_media_url(&state, attachment.as_deref());

    let message = compose_test_alert(&user.user_name, &user.email, &point);
    let sent = state
        .dispatcher
        .send(&target, &message, media_url.as_deref())
        .await;

    tracing::info!(user_id = user.id, target = %target, sent, "Test SOS dispatch");
    if !sent {
        return Err(AppError::InternalError(
            "Failed to send test SOS message".into(),
        ));
    }
    Ok(Json(MessageResponse::ok("Test SOS sent")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user_requester(state: &AppState, auth: &AuthUser) -> AppResult<Requester> {
    let user = current_user(state, auth).await?;
    Ok(Requester::User {
        user_id: user.id,
        display_name: user.user_name,
        email: user.email,
    })
}

async fn raise(
    state: &AppState,
    flow: SosFlow,
    requester: Requester,
    submission: SosSubmission,
) -> AppResult<Json<DispatchSummary>> {
    let mut request = SosRequest {
        flow,
        requester,
        latitude: submission.latitude,
        longitude: submission.longitude,
        attachment: None,
    };
    request.validate()?;

    if let Some(upload) = &submission.media {
        request.attachment = Some(uploads::store(&state.config.uploads_dir, upload).await?);
    }

    let attachment = request.attachment.clone();
    match state.sos.raise(request).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            if let Some(path) = attachment {
                uploads::discard(&state.config.uploads_dir, &path).await;
            }
            Err(e.into())
        }
    }
}

fn public_media_url(state: &AppState, attachment: Option<&str>) -> Option<String> {
    let attachment = attachment?;
    let base = state.config.sos.public_base_url.as_deref()?;
    Some(format!("{}{attachment}", base.trim_end_matches('/')))
}
