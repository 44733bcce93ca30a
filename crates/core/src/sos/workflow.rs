//! The SOS dispatch workflow.
//!
//! `validate -> resolve responders -> compose message -> fan-out dispatch ->
//! append log -> summarize`.
//!
//! Dispatch attempts are independent and run concurrently; a failed or
//! timed-out attempt is recorded as `delivered = false` and never aborts the
//! others. The log entry is written only after every attempt has resolved.
//! A failure to resolve responders or to append the log entry fails the whole
//! call with [`CoreError::Dependency`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::message::compose_alert;
use super::{
    DispatchResult, DispatchSummary, NewSosEvent, NotificationDispatcher, Place, PlaceCategory,
    PlaceLookup, Requester, Responder, ResponderDirectory, SosFlow, SosLogStore, SosRequest,
    DEFAULT_MAX_RESPONDERS, DEFAULT_SEARCH_RADIUS_METERS,
};
use crate::error::CoreError;
use crate::geo::GeoPoint;

/// Default bound on a single external call (dispatch or lookup).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(8);

/// Tunables for [`SosWorkflow`].
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub radius_meters: f64,
    pub max_responders: usize,
    pub call_timeout: Duration,
    /// When set, every dispatch goes to this address instead of the
    /// responder's own (messaging-sandbox mode). Summaries still name the
    /// intended responder.
    pub override_recipient: Option<String>,
    /// Public base URL prefixed to attachment paths before they are handed
    /// to the messaging channel. Without it attachments are not forwarded.
    pub media_base_url: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            max_responders: DEFAULT_MAX_RESPONDERS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            override_recipient: None,
            media_base_url: None,
        }
    }
}

/// Orchestrates one SOS from request to summary.
pub struct SosWorkflow {
    directory: Arc<dyn ResponderDirectory>,
    places: Arc<dyn PlaceLookup>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    log: Arc<dyn SosLogStore>,
    config: WorkflowConfig,
}

impl SosWorkflow {
    pub fn new(
        directory: Arc<dyn ResponderDirectory>,
        places: Arc<dyn PlaceLookup>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        log: Arc<dyn SosLogStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            directory,
            places,
            dispatcher,
            log,
            config,
        }
    }

    /// Run the workflow for one alert.
    ///
    /// Fails with [`CoreError::Validation`] (no side effects) on bad
    /// coordinates or a requester that does not fit the flow, and with
    /// [`CoreError::Dependency`] when responder resolution or the log write
    /// fails. Zero successful dispatches is still a success.
    pub async fn raise(&self, request: SosRequest) -> Result<DispatchSummary, CoreError> {
        let point = request.validate()?;

        let (candidates, advisory) = self.resolve(request.flow, point).await?;
        tracing::debug!(
            flow = ?request.flow,
            candidates = candidates.len(),
            "Resolved SOS responders"
        );

        let message = compose_alert(request.flow, &request.requester, &point);
        let media_url = self.media_url(request.attachment.as_deref());

        let dispatches = join_all(
            candidates
                .iter()
                .map(|r| self.dispatch_one(r, &message, media_url.as_deref())),
        )
        .await;

        let event = self
            .log
            .append(NewSosEvent {
                user_id: request.requester.user_id(),
                point,
                media_url: request.attachment,
            })
            .await?;

        let notified: Vec<String> = dispatches
            .iter()
            .filter(|d| d.delivered)
            .map(|d| d.responder_name.clone())
            .collect();
        let count = notified.len();

        tracing::info!(
            event_id = event.id,
            flow = ?request.flow,
            attempted = dispatches.len(),
            delivered = count,
            "SOS raised"
        );

        Ok(DispatchSummary {
            success: true,
            message: format!("SOS sent to {count} responder(s)"),
            notified,
            count,
            dispatches,
            advisory,
            event_id: event.id,
            created_at: event.created_at,
        })
    }

    /// Resolve dispatch candidates (nearest first, capped) and, for lookup
    /// flows, the advisory pharmacy list.
    async fn resolve(
        &self,
        flow: SosFlow,
        point: GeoPoint,
    ) -> Result<(Vec<Responder>, Option<Vec<Place>>), CoreError> {
        let radius = self.config.radius_meters;
        let limit = self.config.max_responders;

        if !flow.uses_place_lookup() {
            let mut responders = self
                .bounded(
                    "responder directory",
                    self.directory.nearest(point, radius, limit),
                )
                .await?;
            responders.truncate(limit);
            return Ok((responders, None));
        }

        let (hospitals, pharmacies) = tokio::try_join!(
            self.bounded(
                "hospital lookup",
                self.places
                    .nearby_by_category(point, PlaceCategory::Hospital, radius),
            ),
            self.bounded(
                "pharmacy lookup",
                self.places
                    .nearby_by_category(point, PlaceCategory::Pharmacy, radius),
            ),
        )?;

        let mut hospitals = hospitals;
        hospitals.sort_by(|a, b| {
            point
                .distance_meters(&a.point)
                .total_cmp(&point.distance_meters(&b.point))
        });
        hospitals.truncate(limit);

        Ok((
            hospitals.into_iter().map(Responder::from).collect(),
            Some(pharmacies),
        ))
    }

    async fn dispatch_one(
        &self,
        responder: &Responder,
        message: &str,
        media_url: Option<&str>,
    ) -> DispatchResult {
        let target = self
            .config
            .override_recipient
            .as_deref()
            .or(responder.phone.as_deref());

        let delivered = match target {
            None => {
                tracing::warn!(
                    responder = %responder.name,
                    "No contact address for responder, dispatch skipped"
                );
                false
            }
            Some(to) => {
                match tokio::time::timeout(
                    self.config.call_timeout,
                    self.dispatcher.send(to, message, media_url),
                )
                .await
                {
                    Ok(delivered) => delivered,
                    Err(_) => {
                        tracing::warn!(
                            responder = %responder.name,
                            timeout_secs = self.config.call_timeout.as_secs(),
                            "Dispatch timed out"
                        );
                        false
                    }
                }
            }
        };

        tracing::info!(
            responder = %responder.name,
            intended = ?responder.phone,
            target = ?target,
            delivered,
            "SOS dispatch attempt"
        );

        DispatchResult {
            responder_id: responder.id.clone(),
            responder_name: responder.name.clone(),
            delivered,
        }
    }

    /// Apply the per-call timeout to a lookup, mapping expiry to
    /// [`CoreError::Dependency`].
    async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.config.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Dependency(format!(
                "{what} timed out after {}s",
                self.config.call_timeout.as_secs()
            ))),
        }
    }

    fn media_url(&self, attachment: Option<&str>) -> Option<String> {
        let attachment = attachment?;
        let base = self.config.media_base_url.as_deref()?;
        Some(format!("{}{}", base.trim_end_matches('/'), attachment))
    }
}

impl SosRequest {
    /// Check coordinates and requester against the flow without side
    /// effects, returning the parsed point.
    ///
    /// Callers that stage work before [`SosWorkflow::raise`] (such as storing
    /// an uploaded attachment) run this first so invalid input leaves nothing
    /// behind.
    pub fn validate(&self) -> Result<GeoPoint, CoreError> {
        let point = GeoPoint::parse(self.latitude.as_deref(), self.longitude.as_deref())?;
        validate_requester(self.flow, &self.requester)?;
        Ok(point)
    }
}

fn validate_requester(flow: SosFlow, requester: &Requester) -> Result<(), CoreError> {
    match (flow, requester) {
        (SosFlow::Directory | SosFlow::SelfHelp, Requester::User { .. }) => Ok(()),
        (SosFlow::Directory | SosFlow::SelfHelp, Requester::ThirdParty { .. }) => Err(
            CoreError::Validation("This flow requires an authenticated requester".into()),
        ),
        (SosFlow::OtherHelp, Requester::ThirdParty { name, phone, .. }) => {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("name is required".into()));
            }
            if phone.trim().is_empty() {
                return Err(CoreError::Validation("phone is required".into()));
            }
            Ok(())
        }
        (SosFlow::OtherHelp, Requester::User { .. }) => Err(CoreError::Validation(
            "Other-help reports must name the person in need".into(),
        )),
    }
}
