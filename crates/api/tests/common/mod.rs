//! Shared fixtures for API integration tests.
//!
//! [`TestApp`] wires the production router around the real Postgres-backed
//! responder directory and SOS log, with in-memory stand-ins for the
//! messaging channel and the place directory.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use beacon_core::error::CoreError;
use beacon_core::geo::GeoPoint;
use beacon_core::pending_signup::PendingSignups;
use beacon_core::sos::{NotificationDispatcher, Place, PlaceCategory, PlaceLookup, SosWorkflow};
use beacon_db::models::user::{CreateUser, User};
use beacon_db::repositories::UserRepo;
use beacon_db::sos::{PgResponderDirectory, PgSosLogStore};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use beacon_api::auth::jwt::{generate_access_token, JwtConfig};
use beacon_api::auth::password::hash_password;
use beacon_api::config::{ServerConfig, SosConfig};
use beacon_api::router::build_app_router;
use beacon_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and a private uploads
/// directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8081".to_string()],
        request_timeout_secs: 30,
        uploads_dir: std::env::temp_dir().join(format!("beacon-uploads-{}", uuid::Uuid::new_v4())),
        otp_ttl_mins: 10,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        sos: SosConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Collaborator stand-ins
// ---------------------------------------------------------------------------

/// One message handed to [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
    pub media_url: Option<String>,
}

/// Messaging channel that records every send and rejects listed recipients.
#[derive(Default)]
pub struct RecordingDispatcher {
    reject: HashSet<String>,
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingDispatcher {
    pub fn rejecting(recipients: &[&str]) -> Self {
        Self {
            reject: recipients.iter().map(|r| r.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, to: &str, message: &str, media_url: Option<&str>) -> bool {
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            body: message.to_string(),
            media_url: media_url.map(str::to_string),
        });
        !self.reject.contains(to)
    }
}

/// Place directory returning fixed hospitals and pharmacies.
#[derive(Default)]
pub struct StaticPlaces {
    pub hospitals: Vec<Place>,
    pub pharmacies: Vec<Place>,
    pub unavailable: bool,
}

#[async_trait]
impl PlaceLookup for StaticPlaces {
    async fn nearby_by_category(
        &self,
        _point: GeoPoint,
        category: PlaceCategory,
        _radius_meters: f64,
    ) -> Result<Vec<Place>, CoreError> {
        if self.unavailable {
            return Err(CoreError::Dependency("places API unreachable".into()));
        }
        Ok(match category {
            PlaceCategory::Hospital => self.hospitals.clone(),
            PlaceCategory::Pharmacy => self.pharmacies.clone(),
        })
    }
}

/// A place `km` kilometres north of (77.1, 28.6).
pub fn place(id: &str, name: &str, km: f64) -> Place {
    Place {
        id: id.to_string(),
        name: name.to_string(),
        address: Some(format!("{name} Road")),
        point: GeoPoint::new(77.1, 28.6 + km / 111.195).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// The application under test plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::build(
            pool,
            test_config(),
            RecordingDispatcher::default(),
            StaticPlaces::default(),
        )
    }

    pub fn build(
        pool: PgPool,
        config: ServerConfig,
        dispatcher: RecordingDispatcher,
        places: StaticPlaces,
    ) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let sos = Arc::new(SosWorkflow::new(
            Arc::new(PgResponderDirectory::new(pool.clone())),
            Arc::new(places),
            dispatcher.clone(),
            Arc::new(PgSosLogStore::new(pool.clone())),
            config.sos.workflow_config(),
        ));

        let state = AppState {
            pool,
            config: Arc::new(config.clone()),
            sos,
            dispatcher: dispatcher.clone(),
            mailer: None,
            pending_signups: Arc::new(PendingSignups::new(config.otp_ttl())),
        };

        let router = build_app_router(state.clone(), &config);
        Self {
            router,
            state,
            dispatcher,
        }
    }

    /// A fresh handle on the router (each request consumes one).
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.state.config.uploads_dir.clone()
    }

    /// Mint an access token for `user_id` with this app's JWT settings.
    pub fn token_for(&self, user_id: i64) -> String {
        generate_access_token(user_id, &self.state.config.jwt).unwrap()
    }
}

/// Build the full application router with default test collaborators.
pub fn build_test_app(pool: PgPool) -> Router {
    TestApp::new(pool).router
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert a verified user whose password is [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, user_name: &str, email: &str) -> User {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            user_name: user_name.to_string(),
            email: email.to_string(),
            password_hash: hashed,
            is_verified: true,
        },
    )
    .await
    .expect("user creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), body)).await
}

/// A `multipart/form-data` part.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
}

const BOUNDARY: &str = "beacon-test-boundary";

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
