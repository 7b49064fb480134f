// src/services/offer_service.rs
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::DispatchError,
    models::driver::DriverProfile,
    models::trip::{OfferDetailView, PaymentMethod, PendingTripRequestView, ServiceType, Trip},
    state::AppConfig,
    store::{audit::AuditLog, MemoryStore},
    utils::geo,
};

#[async_trait]
pub trait OfferOperations: Send + Sync {
    /// All offers currently visible to the driver, across service types.
    async fn pending_offers(
        &self,
        driver_id: &str,
    ) -> Result<Vec<PendingTripRequestView>, DispatchError>;

    /// A single offer with the server-computed cash-block verdict.
    async fn offer_detail(
        &self,
        driver_id: &str,
        request_id: &str,
    ) -> Result<OfferDetailView, DispatchError>;
}

pub struct OfferService {
    store: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
    config: AppConfig,
}

impl OfferService {
    pub fn new(store: Arc<MemoryStore>, audit: Arc<AuditLog>, config: AppConfig) -> Self {
        Self { store, audit, config }
    }

    /// Project an unassigned trip into a driver-facing offer. Distance and
    /// ETA need both coordinate pairs; they stay unset otherwise.
    fn build_offer(&self, driver: &DriverProfile, trip: &Trip) -> PendingTripRequestView {
        let distance_to_pickup_km = match (driver.current_lat, driver.current_lng, trip.pickup_coords) {
            (Some(lat), Some(lng), Some(pickup)) => {
                Some(geo::haversine_km(lat, lng, pickup.lat, pickup.lng))
            }
            _ => None,
        };
        let eta_minutes =
            distance_to_pickup_km.map(|d| geo::eta_minutes(d, self.config.assumed_speed_kmh));

        PendingTripRequestView {
            request_id: trip.id.clone(),
            service_type: trip.service_type,
            status: trip.status,
            pickup_address: trip.pickup_address.clone(),
            dropoff_address: trip.dropoff_address.clone(),
            pickup_coords: trip.pickup_coords,
            dropoff_coords: trip.dropoff_coords,
            payment_method: trip.payment_method,
            estimated_payout: trip.driver_payout,
            distance_to_pickup_km,
            eta_minutes,
            created_at: trip.created_at,
            expires_at: trip.created_at + self.config.offer_ttl(trip.service_type),
        }
    }

    fn check_can_receive_offers(&self, driver: &DriverProfile) -> Result<(), DispatchError> {
        if !driver.is_verified {
            return Err(DispatchError::DriverNotVerified);
        }
        if !driver.has_online_vehicle() {
            return Err(DispatchError::VehicleOffline);
        }
        Ok(())
    }

    fn cash_block_reason(&self, driver: &DriverProfile, trip: &Trip) -> Option<String> {
        if trip.payment_method != PaymentMethod::Cash {
            return None;
        }
        let wallet = driver.wallet.as_ref()?;
        let threshold = self.config.cash_debt_threshold(&wallet.country);
        if wallet.negative_balance >= threshold {
            Some(format!(
                "Outstanding balance {:.2} exceeds the {:.2} limit for cash trips",
                wallet.negative_balance, threshold
            ))
        } else {
            None
        }
    }
}

#[async_trait]
impl OfferOperations for OfferService {
    async fn pending_offers(
        &self,
        driver_id: &str,
    ) -> Result<Vec<PendingTripRequestView>, DispatchError> {
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| DispatchError::driver_not_found(driver_id))?;

        self.check_can_receive_offers(&driver)?;

        // A driver mid-trip sees nothing rather than an error.
        if self.store.find_active_trip(driver_id).await?.is_some() {
            tracing::debug!(driver_id, "driver has an active trip, returning no offers");
            self.audit
                .record("driver.offers_polled", driver_id, json!({ "count": 0 }))
                .await;
            return Ok(Vec::new());
        }

        let mut offers = Vec::new();
        for kind in ServiceType::all() {
            let pending = self
                .store
                .list_unassigned(kind, self.config.offer_limit_per_type)
                .await?;
            offers.extend(pending.iter().map(|trip| self.build_offer(&driver, trip)));
        }

        tracing::debug!(driver_id, count = offers.len(), "pending offers computed");
        self.audit
            .record("driver.offers_polled", driver_id, json!({ "count": offers.len() }))
            .await;

        Ok(offers)
    }

    async fn offer_detail(
        &self,
        driver_id: &str,
        request_id: &str,
    ) -> Result<OfferDetailView, DispatchError> {
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| DispatchError::driver_not_found(driver_id))?;

        self.check_can_receive_offers(&driver)?;

        let trip = self
            .store
            .get_trip(request_id)
            .await?
            .filter(|t| t.driver_id.is_none())
            .ok_or_else(|| DispatchError::trip_not_found(request_id))?;

        let cash_block_reason = self.cash_block_reason(&driver, &trip);
        let detail = OfferDetailView {
            offer: self.build_offer(&driver, &trip),
            cash_blocked: cash_block_reason.is_some(),
            cash_block_reason,
        };

        self.audit
            .record(
                "driver.offer_viewed",
                driver_id,
                json!({ "requestId": request_id, "cashBlocked": detail.cash_blocked }),
            )
            .await;

        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{Coordinates, TripStatus};
    use crate::services::test_fixtures::{seed_driver, seed_trip};

    fn service(store: Arc<MemoryStore>, audit: Arc<AuditLog>) -> OfferService {
        OfferService::new(store, audit, AppConfig::default())
    }

    #[tokio::test]
    async fn offers_include_distance_and_eta_when_coords_known() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());

        let mut driver = seed_driver("drv-1");
        driver.current_lat = Some(40.7580);
        driver.current_lng = Some(-73.9855);
        store.upsert_driver(driver).await.unwrap();

        let mut trip = seed_trip("ride-1", ServiceType::Ride, TripStatus::Requested);
        trip.pickup_coords = Some(Coordinates { lat: 40.7484, lng: -73.9857 });
        store.insert_trip(trip).await.unwrap();

        let offers = service(store, audit).pending_offers("drv-1").await.unwrap();
        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert!(offer.distance_to_pickup_km.unwrap() < 2.0);
        assert!(offer.eta_minutes.unwrap() >= 1);
        assert_eq!(offer.expires_at, offer.created_at + chrono::Duration::seconds(30));
    }

    #[tokio::test]
    async fn missing_coords_leave_distance_unset() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();
        store
            .insert_trip(seed_trip("food-1", ServiceType::Food, TripStatus::ReadyForPickup))
            .await
            .unwrap();

        let offers = service(store, audit).pending_offers("drv-1").await.unwrap();
        assert_eq!(offers.len(), 1);
        assert!(offers[0].distance_to_pickup_km.is_none());
        assert!(offers[0].eta_minutes.is_none());
        // food offers get the longer advisory expiry
        assert_eq!(
            offers[0].expires_at,
            offers[0].created_at + chrono::Duration::seconds(60)
        );
    }

    #[tokio::test]
    async fn active_trip_yields_empty_list_not_error() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();

        let mut active = seed_trip("ride-busy", ServiceType::Ride, TripStatus::Started);
        active.driver_id = Some("drv-1".to_string());
        store.insert_trip(active).await.unwrap();
        store
            .insert_trip(seed_trip("ride-open", ServiceType::Ride, TripStatus::Requested))
            .await
            .unwrap();

        let offers = service(store, audit).pending_offers("drv-1").await.unwrap();
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn unverified_driver_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        let mut driver = seed_driver("drv-1");
        driver.is_verified = false;
        store.upsert_driver(driver).await.unwrap();

        let err = service(store, audit).pending_offers("drv-1").await.unwrap_err();
        assert!(matches!(err, DispatchError::DriverNotVerified));
    }

    #[tokio::test]
    async fn offline_vehicle_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        let mut driver = seed_driver("drv-1");
        driver.vehicle.as_mut().unwrap().is_online = false;
        store.upsert_driver(driver).await.unwrap();

        let err = service(store, audit).pending_offers("drv-1").await.unwrap_err();
        assert!(matches!(err, DispatchError::VehicleOffline));
    }

    #[tokio::test]
    async fn poll_is_audit_logged_with_offer_count() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();
        store
            .insert_trip(seed_trip("ride-1", ServiceType::Ride, TripStatus::Requested))
            .await
            .unwrap();

        service(store, audit.clone()).pending_offers("drv-1").await.unwrap();

        let records = audit.records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "driver.offers_polled");
        assert_eq!(records[0].details["count"], 1);
    }

    #[tokio::test]
    async fn detail_flags_cash_block_over_threshold() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        let mut driver = seed_driver("drv-1");
        driver.wallet.as_mut().unwrap().negative_balance = 120.0;
        store.upsert_driver(driver).await.unwrap();

        let mut trip = seed_trip("ride-1", ServiceType::Ride, TripStatus::Requested);
        trip.payment_method = PaymentMethod::Cash;
        store.insert_trip(trip).await.unwrap();

        let detail = service(store, audit).offer_detail("drv-1", "ride-1").await.unwrap();
        assert!(detail.cash_blocked);
        assert!(detail.cash_block_reason.is_some());
    }

    #[tokio::test]
    async fn detail_of_assigned_trip_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(AuditLog::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();

        let mut trip = seed_trip("ride-1", ServiceType::Ride, TripStatus::Accepted);
        trip.driver_id = Some("drv-other".to_string());
        store.insert_trip(trip).await.unwrap();

        let err = service(store, audit).offer_detail("drv-1", "ride-1").await.unwrap_err();
        assert!(matches!(err, DispatchError::TripNotFound(_)));
    }
}
