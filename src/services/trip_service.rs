// src/services/trip_service.rs
//! Trip state machine. Transition legality is decided by the lifecycle
//! tables against the *stored* status; the check and the write happen under
//! one store lock. The ride status-event append is best-effort and never
//! rolls back the status write.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::DispatchError,
    lifecycle::{self, DriverTripStatus},
    models::trip::{
        ActiveTripResponse, ServiceType, StatusUpdateRequest, StatusUpdateResponse, Trip,
        TripStatus, TripStatusEvent, TripView,
    },
    services::notification_service::NotificationService,
    store::{audit::AuditLog, MemoryStore},
    utils::id_generator::{IdGenerator, IdType},
};

/// Accuracy (meters) below which a completion location counts as verified.
const LOCATION_VERIFIED_ACCURACY_M: f64 = 100.0;

#[async_trait]
pub trait TripOperations: Send + Sync {
    async fn active_trip(&self, driver_id: &str) -> Result<ActiveTripResponse, DispatchError>;

    async fn transition(
        &self,
        driver_id: &str,
        trip_id: &str,
        request: StatusUpdateRequest,
    ) -> Result<StatusUpdateResponse, DispatchError>;
}

pub struct TripService {
    store: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
    notifications: Arc<dyn NotificationService>,
}

struct AppliedTransition {
    trip: Trip,
    previous_status: TripStatus,
    new_status: TripStatus,
}

impl TripService {
    pub fn new(
        store: Arc<MemoryStore>,
        audit: Arc<AuditLog>,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        Self { store, audit, notifications }
    }

    fn apply(
        trip: &mut Trip,
        driver_id: &str,
        request: &StatusUpdateRequest,
    ) -> Result<AppliedTransition, DispatchError> {
        // not-assigned-to-caller reads the same as not-found
        if trip.driver_id.as_deref() != Some(driver_id) {
            return Err(DispatchError::trip_not_found(&trip.id));
        }

        let allowed = lifecycle::allowed_transitions(trip.service_type, trip.status);
        if !allowed.contains(&request.status) {
            return Err(DispatchError::InvalidTransition {
                current: trip.status.as_str().to_string(),
                requested: request.status.as_str().to_string(),
                allowed: allowed.iter().map(|s| s.as_str().to_string()).collect(),
            });
        }

        let previous_status = trip.status;
        let new_status = lifecycle::storage_status(trip.service_type, request.status);
        let now = Utc::now();

        trip.status = new_status;
        trip.updated_at = now;
        match request.status {
            DriverTripStatus::Arrived => trip.arrived_at = Some(now),
            DriverTripStatus::Started => trip.trip_started_at = Some(now),
            DriverTripStatus::Completed => {
                trip.completed_at = Some(now);
                if trip.service_type != ServiceType::Ride {
                    trip.delivered_at = Some(now);
                }
            }
            DriverTripStatus::Arriving => {}
            DriverTripStatus::Cancelled => {
                if let Some(reason) = &request.reason {
                    trip.metadata
                        .insert("cancellationReason".to_string(), json!(reason));
                }
            }
        }

        if request.status == DriverTripStatus::Completed {
            if let Some(location) = &request.completion_location {
                // verified is informational only, never enforced
                let verified = location
                    .accuracy
                    .map(|a| a < LOCATION_VERIFIED_ACCURACY_M)
                    .unwrap_or(false);
                trip.metadata
                    .insert("completionLocation".to_string(), json!(location));
                trip.metadata
                    .insert("locationVerified".to_string(), json!(verified));
            }
        }

        Ok(AppliedTransition {
            trip: trip.clone(),
            previous_status,
            new_status,
        })
    }
}

#[async_trait]
impl TripOperations for TripService {
    async fn active_trip(&self, driver_id: &str) -> Result<ActiveTripResponse, DispatchError> {
        let active = self.store.find_active_trip(driver_id).await?;
        Ok(ActiveTripResponse {
            has_active_trip: active.is_some(),
            active_trip: active.map(TripView::from),
        })
    }

    async fn transition(
        &self,
        driver_id: &str,
        trip_id: &str,
        request: StatusUpdateRequest,
    ) -> Result<StatusUpdateResponse, DispatchError> {
        let applied = self
            .store
            .with_trip_mut(trip_id, |trip| Self::apply(trip, driver_id, &request))
            .await?
            .ok_or_else(|| DispatchError::trip_not_found(trip_id))??;

        tracing::info!(
            driver_id,
            trip_id,
            from = applied.previous_status.as_str(),
            to = applied.new_status.as_str(),
            "trip status changed"
        );

        // immutable status event, rides only; append failure never rolls
        // back the status write
        if applied.trip.service_type == ServiceType::Ride {
            let event = TripStatusEvent {
                id: IdGenerator::generate(IdType::StatusEvent),
                trip_id: trip_id.to_string(),
                from_status: applied.previous_status,
                to_status: applied.new_status,
                actor_driver_id: driver_id.to_string(),
                created_at: Utc::now(),
            };
            if let Err(e) = self.store.append_status_event(event).await {
                tracing::warn!(trip_id, error = %e, "status event append failed, continuing");
            }
        }

        if let (Some(lat), Some(lng)) = (request.driver_lat, request.driver_lng) {
            self.store.update_driver_location(driver_id, lat, lng).await?;
        }

        if let Err(e) = self
            .notifications
            .notify_status_update(&applied.trip, applied.new_status.as_str())
            .await
        {
            tracing::warn!(trip_id, error = %e, "customer notification failed");
        }

        self.audit
            .record(
                "trip.status_changed",
                driver_id,
                json!({
                    "tripId": trip_id,
                    "from": applied.previous_status.as_str(),
                    "to": applied.new_status.as_str(),
                }),
            )
            .await;

        Ok(StatusUpdateResponse {
            success: true,
            previous_status: applied.previous_status,
            new_status: applied.new_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::CompletionLocation;
    use crate::services::notification_service::LogNotificationService;
    use crate::services::test_fixtures::{seed_driver, seed_trip};

    fn service(store: Arc<MemoryStore>) -> TripService {
        TripService::new(store, Arc::new(AuditLog::new()), Arc::new(LogNotificationService))
    }

    async fn seed_assigned(
        store: &MemoryStore,
        id: &str,
        kind: ServiceType,
        status: TripStatus,
        driver_id: &str,
    ) {
        let mut trip = seed_trip(id, kind, status);
        trip.driver_id = Some(driver_id.to_string());
        store.insert_trip(trip).await.unwrap();
        store.upsert_driver(seed_driver(driver_id)).await.unwrap();
    }

    fn status_request(status: DriverTripStatus) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status,
            driver_lat: None,
            driver_lng: None,
            reason: None,
            completion_location: None,
        }
    }

    #[tokio::test]
    async fn skipping_a_state_reports_the_allowed_set() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Accepted, "drv-1").await;

        let err = service(store.clone())
            .transition("drv-1", "ride-1", status_request(DriverTripStatus::Started))
            .await
            .unwrap_err();

        match err {
            DispatchError::InvalidTransition { current, requested, allowed } => {
                assert_eq!(current, "accepted");
                assert_eq!(requested, "started");
                assert_eq!(allowed, vec!["arriving".to_string(), "cancelled".to_string()]);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }

        // the failed attempt must not have moved the trip
        let trip = store.get_trip("ride-1").await.unwrap().unwrap();
        assert_eq!(trip.status, TripStatus::Accepted);
    }

    #[tokio::test]
    async fn arriving_maps_to_per_kind_storage_status() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Accepted, "drv-1").await;
        seed_assigned(&store, "food-1", ServiceType::Food, TripStatus::Accepted, "drv-2").await;

        let svc = service(store.clone());
        let ride = svc
            .transition("drv-1", "ride-1", status_request(DriverTripStatus::Arriving))
            .await
            .unwrap();
        assert_eq!(ride.previous_status, TripStatus::Accepted);
        assert_eq!(ride.new_status, TripStatus::DriverArriving);

        let food = svc
            .transition("drv-2", "food-1", status_request(DriverTripStatus::Arriving))
            .await
            .unwrap();
        assert_eq!(food.new_status, TripStatus::PickedUp);

        // arriving sets no timestamp; those wait for the next transitions
        let trip = store.get_trip("ride-1").await.unwrap().unwrap();
        assert!(trip.arrived_at.is_none());
        assert!(trip.trip_started_at.is_none());
    }

    #[tokio::test]
    async fn ride_happy_path_sets_timestamps_and_events() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Accepted, "drv-1").await;

        let svc = service(store.clone());
        for status in [
            DriverTripStatus::Arriving,
            DriverTripStatus::Arrived,
            DriverTripStatus::Started,
            DriverTripStatus::Completed,
        ] {
            svc.transition("drv-1", "ride-1", status_request(status)).await.unwrap();
        }

        let trip = store.get_trip("ride-1").await.unwrap().unwrap();
        assert_eq!(trip.status, TripStatus::Completed);
        assert!(trip.arrived_at.is_some());
        assert!(trip.trip_started_at.is_some());
        assert!(trip.completed_at.is_some());
        assert!(trip.delivered_at.is_none()); // rides never set delivered_at

        let events = store.status_events_for("ride-1").await.unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].from_status, TripStatus::Accepted);
        assert_eq!(events[3].to_status, TripStatus::Completed);
    }

    #[tokio::test]
    async fn food_completion_sets_delivered_at_and_skips_events() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "food-1", ServiceType::Food, TripStatus::InTransit, "drv-1").await;

        let response = service(store.clone())
            .transition("drv-1", "food-1", status_request(DriverTripStatus::Completed))
            .await
            .unwrap();
        assert_eq!(response.new_status, TripStatus::Delivered);

        let trip = store.get_trip("food-1").await.unwrap().unwrap();
        assert!(trip.completed_at.is_some());
        assert!(trip.delivered_at.is_some());

        // status events are a ride-only ledger
        assert!(store.status_events_for("food-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminal_states_reject_everything() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Completed, "drv-1").await;

        let err = service(store)
            .transition("drv-1", "ride-1", status_request(DriverTripStatus::Cancelled))
            .await
            .unwrap_err();
        match err {
            DispatchError::InvalidTransition { allowed, .. } => assert!(allowed.is_empty()),
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cancel_records_reason_in_metadata() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "pcl-1", ServiceType::Parcel, TripStatus::PickedUp, "drv-1").await;

        let mut request = status_request(DriverTripStatus::Cancelled);
        request.reason = Some("recipient unreachable".to_string());
        service(store.clone()).transition("drv-1", "pcl-1", request).await.unwrap();

        let trip = store.get_trip("pcl-1").await.unwrap().unwrap();
        assert_eq!(trip.status, TripStatus::Cancelled);
        assert_eq!(trip.metadata["cancellationReason"], "recipient unreachable");
    }

    #[tokio::test]
    async fn completion_location_verified_only_under_100m() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Started, "drv-1").await;
        seed_assigned(&store, "ride-2", ServiceType::Ride, TripStatus::Started, "drv-2").await;

        let svc = service(store.clone());

        let mut precise = status_request(DriverTripStatus::Completed);
        precise.completion_location =
            Some(CompletionLocation { lat: 5.6, lng: -0.18, accuracy: Some(12.0) });
        svc.transition("drv-1", "ride-1", precise).await.unwrap();

        let mut coarse = status_request(DriverTripStatus::Completed);
        coarse.completion_location =
            Some(CompletionLocation { lat: 5.6, lng: -0.18, accuracy: Some(250.0) });
        svc.transition("drv-2", "ride-2", coarse).await.unwrap();

        let verified = store.get_trip("ride-1").await.unwrap().unwrap();
        assert_eq!(verified.metadata["locationVerified"], true);
        let unverified = store.get_trip("ride-2").await.unwrap().unwrap();
        assert_eq!(unverified.metadata["locationVerified"], false);
    }

    #[tokio::test]
    async fn not_owner_reads_as_not_found() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Accepted, "drv-1").await;
        store.upsert_driver(seed_driver("drv-2")).await.unwrap();

        let err = service(store)
            .transition("drv-2", "ride-1", status_request(DriverTripStatus::Arriving))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::TripNotFound(_)));
    }

    #[tokio::test]
    async fn active_trip_lookup() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Started, "drv-1").await;
        store.upsert_driver(seed_driver("drv-idle")).await.unwrap();

        let svc = service(store);
        let busy = svc.active_trip("drv-1").await.unwrap();
        assert!(busy.has_active_trip);
        assert_eq!(busy.active_trip.unwrap().id, "ride-1");

        let idle = svc.active_trip("drv-idle").await.unwrap();
        assert!(!idle.has_active_trip);
        assert!(idle.active_trip.is_none());
    }

    #[tokio::test]
    async fn transition_updates_driver_location_when_provided() {
        let store = Arc::new(MemoryStore::new());
        seed_assigned(&store, "ride-1", ServiceType::Ride, TripStatus::Accepted, "drv-1").await;

        let mut request = status_request(DriverTripStatus::Arriving);
        request.driver_lat = Some(6.0);
        request.driver_lng = Some(-1.0);
        service(store.clone()).transition("drv-1", "ride-1", request).await.unwrap();

        let driver = store.get_driver("drv-1").await.unwrap().unwrap();
        assert_eq!(driver.current_lat, Some(6.0));
        assert_eq!(driver.current_lng, Some(-1.0));
    }
}
