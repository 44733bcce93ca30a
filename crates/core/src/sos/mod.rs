//! SOS dispatch: domain types, collaborator traits, and the workflow.
//!
//! The workflow ([`workflow::SosWorkflow`]) chains four collaborators:
//!
//! - [`ResponderDirectory`] -- stored responders, nearest-first geo query.
//! - [`PlaceLookup`] -- external place directory (hospitals, pharmacies).
//! - [`NotificationDispatcher`] -- best-effort outbound messaging channel.
//! - [`SosLogStore`] -- append-only audit log of raised alerts.

pub mod message;
pub mod workflow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::GeoPoint;
use crate::types::{DbId, Timestamp};

pub use workflow::{SosWorkflow, WorkflowConfig};

/// Search radius for responder resolution.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 10_000.0;

/// Maximum number of responders an alert is dispatched to.
pub const DEFAULT_MAX_RESPONDERS: usize = 3;

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A candidate recipient of an SOS alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Responder {
    /// Directory row id or external place id.
    pub id: String,
    pub name: String,
    /// Messaging address (phone number). Place-derived responders have none.
    pub phone: Option<String>,
    pub point: GeoPoint,
}

/// Category vocabulary for [`PlaceLookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Hospital,
    Pharmacy,
}

impl PlaceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Hospital => "hospital",
            PlaceCategory::Pharmacy => "pharmacy",
        }
    }
}

/// A result from the external place directory. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// External identifier (e.g. Google `place_id`).
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub point: GeoPoint,
}

impl From<Place> for Responder {
    fn from(place: Place) -> Self {
        Responder {
            id: place.id,
            name: place.name,
            phone: None,
            point: place.point,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Which of the three exposed flows raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SosFlow {
    /// Authenticated user; responders from the stored directory.
    Directory,
    /// Authenticated user; responders from the place lookup (hospitals).
    SelfHelp,
    /// Report on behalf of a third party; responders from the place lookup.
    OtherHelp,
}

impl SosFlow {
    /// Whether responders come from the place lookup (and an advisory
    /// pharmacy list is returned).
    pub fn uses_place_lookup(&self) -> bool {
        matches!(self, SosFlow::SelfHelp | SosFlow::OtherHelp)
    }
}

/// Who raised the alert.
#[derive(Debug, Clone, PartialEq)]
pub enum Requester {
    /// An authenticated account holder.
    User {
        user_id: DbId,
        display_name: String,
        email: String,
    },
    /// A person in need, reported by someone else. `reported_by` is set when
    /// the reporter happened to be signed in.
    ThirdParty {
        name: String,
        phone: String,
        reported_by: Option<DbId>,
    },
}

impl Requester {
    /// The account recorded on the SOS log entry, if any.
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Requester::User { user_id, .. } => Some(*user_id),
            Requester::ThirdParty { reported_by, .. } => *reported_by,
        }
    }
}

/// Input to [`SosWorkflow::raise`].
///
/// Coordinates are kept as the raw request strings; the workflow parses and
/// validates them before any side effect.
#[derive(Debug, Clone)]
pub struct SosRequest {
    pub flow: SosFlow,
    pub requester: Requester,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Stored attachment reference (e.g. `/uploads/<file>`).
    pub attachment: Option<String>,
}

// ---------------------------------------------------------------------------
// Log entries and results
// ---------------------------------------------------------------------------

/// Fields of an SOS log entry supplied by the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSosEvent {
    pub user_id: Option<DbId>,
    pub point: GeoPoint,
    pub media_url: Option<String>,
}

/// A persisted, immutable SOS log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SosEvent {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub point: GeoPoint,
    pub media_url: Option<String>,
    pub created_at: Timestamp,
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub responder_id: String,
    pub responder_name: String,
    pub delivered: bool,
}

/// What the caller of [`SosWorkflow::raise`] gets back.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub success: bool,
    pub message: String,
    /// Names of responders whose dispatch was accepted, in candidate order.
    pub notified: Vec<String>,
    pub count: usize,
    pub dispatches: Vec<DispatchResult>,
    /// Nearby pharmacies (lookup-based flows only). Not dispatched to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Vec<Place>>,
    pub event_id: DbId,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Stored responders answering nearest-first proximity queries.
#[async_trait]
pub trait ResponderDirectory: Send + Sync {
    /// Responders within `radius_meters` of `point`, nearest first, at most
    /// `limit`. An empty result is not an error.
    async fn nearest(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        limit: usize,
    ) -> Result<Vec<Responder>, CoreError>;
}

/// Outbound messaging channel.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Attempt one delivery. Returns `true` if the channel accepted the
    /// message; failures are reported as `false`, never as errors.
    async fn send(&self, to: &str, message: &str, media_url: Option<&str>) -> bool;
}

/// External place directory.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn nearby_by_category(
        &self,
        point: GeoPoint,
        category: PlaceCategory,
        radius_meters: f64,
    ) -> Result<Vec<Place>, CoreError>;
}

/// Append-only SOS audit log.
#[async_trait]
pub trait SosLogStore: Send + Sync {
    /// Durably record `event`, returning the stored entry with its generated
    /// id and timestamp.
    async fn append(&self, event: NewSosEvent) -> Result<SosEvent, CoreError>;
}
