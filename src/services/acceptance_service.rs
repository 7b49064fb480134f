// src/services/acceptance_service.rs
//! Resolves which driver is assigned to a contested trip. The assignment
//! itself is a single conditional write in the store; everything before it
//! is advisory precondition checking and everything after it is best-effort
//! side work.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::DispatchError,
    models::driver::{AvailabilityStatus, DriverProfile},
    models::trip::{
        AcceptTripRequest, AcceptTripResponse, DeclineTripRequest, PaymentMethod, Trip,
    },
    services::notification_service::NotificationService,
    state::AppConfig,
    store::{audit::AuditLog, AssignOutcome, MemoryStore},
};

#[async_trait]
pub trait AcceptanceOperations: Send + Sync {
    async fn accept(
        &self,
        driver_id: &str,
        request_id: &str,
        request: AcceptTripRequest,
    ) -> Result<AcceptTripResponse, DispatchError>;

    /// Declines are accepted unconditionally, logged, and change nothing.
    async fn decline(
        &self,
        driver_id: &str,
        request_id: &str,
        request: DeclineTripRequest,
    ) -> Result<(), DispatchError>;
}

pub struct AcceptanceService {
    store: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
    notifications: Arc<dyn NotificationService>,
    config: AppConfig,
}

impl AcceptanceService {
    pub fn new(
        store: Arc<MemoryStore>,
        audit: Arc<AuditLog>,
        notifications: Arc<dyn NotificationService>,
        config: AppConfig,
    ) -> Self {
        Self { store, audit, notifications, config }
    }

    fn check_driver_can_accept(&self, driver: &DriverProfile) -> Result<(), DispatchError> {
        if !driver.is_verified {
            return Err(DispatchError::DriverNotVerified);
        }
        if driver.is_suspended {
            return Err(DispatchError::DriverSuspended);
        }
        if !driver.has_online_vehicle() {
            return Err(DispatchError::VehicleOffline);
        }
        Ok(())
    }

    fn check_cash_allowed(&self, driver: &DriverProfile, trip: &Trip) -> Result<(), DispatchError> {
        if trip.payment_method != PaymentMethod::Cash {
            return Ok(());
        }
        if let Some(wallet) = &driver.wallet {
            let threshold = self.config.cash_debt_threshold(&wallet.country);
            if wallet.negative_balance >= threshold {
                return Err(DispatchError::CashPaymentBlocked(format!(
                    "Outstanding balance {:.2} exceeds the {:.2} limit for cash trips",
                    wallet.negative_balance, threshold
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AcceptanceOperations for AcceptanceService {
    async fn accept(
        &self,
        driver_id: &str,
        request_id: &str,
        request: AcceptTripRequest,
    ) -> Result<AcceptTripResponse, DispatchError> {
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| DispatchError::driver_not_found(driver_id))?;

        self.check_driver_can_accept(&driver)?;

        if let Some(active) = self.store.find_active_trip(driver_id).await? {
            return Err(DispatchError::ActiveTripExists(active.id));
        }

        let trip = self
            .store
            .get_trip(request_id)
            .await?
            .ok_or_else(|| DispatchError::trip_not_found(request_id))?;

        if trip.service_type != request.service_type {
            return Err(DispatchError::validation_error(
                "serviceType",
                "Service type does not match the requested trip",
            ));
        }

        self.check_cash_allowed(&driver, &trip)?;

        // The decision point: one conditional write, winner takes the trip.
        // Everything checked above can already be stale by now.
        let assigned = match self
            .store
            .assign_driver_if_unassigned(request_id, driver_id)
            .await?
        {
            AssignOutcome::Assigned(trip) => trip,
            AssignOutcome::AlreadyAssigned => {
                tracing::info!(driver_id, request_id, "accept lost the race");
                return Err(DispatchError::TripAlreadyAssigned);
            }
            AssignOutcome::NotOfferable(status) => {
                return Err(DispatchError::TripNotOfferable(status.as_str().to_string()));
            }
            AssignOutcome::NotFound => {
                return Err(DispatchError::trip_not_found(request_id));
            }
        };

        tracing::info!(driver_id, trip_id = %assigned.id, "trip accepted");

        if let (Some(lat), Some(lng)) = (request.driver_lat, request.driver_lng) {
            self.store.update_driver_location(driver_id, lat, lng).await?;
        }
        self.store
            .set_driver_availability(driver_id, AvailabilityStatus::OnTrip)
            .await?;

        if let Err(e) = self.notifications.notify_trip_accepted(&assigned).await {
            tracing::warn!(trip_id = %assigned.id, error = %e, "customer notification failed");
        }

        let decision_latency_ms = (Utc::now() - assigned.created_at).num_milliseconds();
        self.audit
            .record(
                "trip.accepted",
                driver_id,
                json!({
                    "tripId": assigned.id,
                    "serviceType": assigned.service_type,
                    "decisionLatencyMs": decision_latency_ms,
                }),
            )
            .await;

        Ok(AcceptTripResponse {
            success: true,
            trip_id: assigned.id,
            service_type: assigned.service_type,
        })
    }

    async fn decline(
        &self,
        driver_id: &str,
        request_id: &str,
        request: DeclineTripRequest,
    ) -> Result<(), DispatchError> {
        tracing::info!(
            driver_id,
            request_id,
            auto_declined = request.auto_declined,
            "trip declined"
        );
        self.audit
            .record(
                "trip.declined",
                driver_id,
                json!({
                    "requestId": request_id,
                    "serviceType": request.service_type,
                    "reason": request.reason,
                    "autoDeclined": request.auto_declined,
                }),
            )
            .await;
        Ok(())
    }
}
