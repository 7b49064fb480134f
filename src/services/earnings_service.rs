// src/services/earnings_service.rs
//! Read-only earnings breakdown for a single trip. Non-authoritative: the
//! stored fare ledger is presented, never recomputed. Gated behind KYC
//! approval.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::DispatchError,
    models::driver::KycStatus,
    models::trip::{DriverTripEarningsView, RegulatoryFees, Trip},
    store::{audit::AuditLog, MemoryStore},
};

/// Commission percentage reported when the subtotal is zero.
const FALLBACK_COMMISSION_PCT: i64 = 15;

#[async_trait]
pub trait EarningsOperations: Send + Sync {
    async fn trip_earnings(
        &self,
        driver_id: &str,
        trip_id: &str,
    ) -> Result<DriverTripEarningsView, DispatchError>;
}

pub struct EarningsService {
    store: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl EarningsService {
    pub fn new(store: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { store, audit }
    }

    /// Bucket itemized regulatory line items by substring match on the
    /// free-text fee label.
    fn bucket_regulatory_fees(trip: &Trip) -> RegulatoryFees {
        let mut fees = RegulatoryFees::default();
        for item in &trip.fare_breakdown {
            let label = item.label.to_lowercase();
            let bucket = if label.contains("congestion") {
                &mut fees.congestion
            } else if label.contains("airport") {
                &mut fees.airport
            } else if label.contains("state") {
                &mut fees.state_surcharge
            } else if label.contains("high volume") || label.contains("high-volume") {
                &mut fees.high_volume_surcharge
            } else if label.contains("black car") || label.contains("black-car") {
                &mut fees.black_car_fund
            } else if label.contains("long trip") || label.contains("long-trip") {
                &mut fees.long_trip
            } else if label.contains("out of town") || label.contains("out-of-town") {
                &mut fees.out_of_town
            } else if label.contains("cross borough") || label.contains("cross-borough") {
                &mut fees.cross_borough
            } else if label.contains("accessible") {
                &mut fees.accessible_vehicle
            } else {
                &mut fees.other
            };
            *bucket += item.amount;
            fees.total += item.amount;
        }
        fees
    }

    fn build_view(trip: &Trip) -> DriverTripEarningsView {
        let fares = &trip.fares;
        let subtotal = fares.base_fare + fares.distance_fare + fares.time_fare + fares.surge_fare
            + fares.delivery_fee
            - fares.discount_amount;
        let commission_pct = if subtotal > 0.0 {
            (trip.safego_commission / subtotal * 100.0).round() as i64
        } else {
            FALLBACK_COMMISSION_PCT
        };

        DriverTripEarningsView {
            trip_id: trip.id.clone(),
            service_type: trip.service_type,
            base_fare: fares.base_fare,
            distance_fare: fares.distance_fare,
            time_fare: fares.time_fare,
            surge_fare: fares.surge_fare,
            delivery_fee: fares.delivery_fee,
            tip_amount: fares.tip_amount,
            tolls_fare: fares.tolls_fare,
            discount_amount: fares.discount_amount,
            total_tax_amount: fares.total_tax_amount,
            regulatory_fees: Self::bucket_regulatory_fees(trip),
            subtotal,
            safego_commission: trip.safego_commission,
            commission_pct,
            driver_payout: trip.driver_payout,
            kyc_required: false,
        }
    }

    /// Same shape with every monetary field zeroed.
    fn kyc_gated_view(trip: &Trip) -> DriverTripEarningsView {
        DriverTripEarningsView {
            trip_id: trip.id.clone(),
            service_type: trip.service_type,
            base_fare: 0.0,
            distance_fare: 0.0,
            time_fare: 0.0,
            surge_fare: 0.0,
            delivery_fee: 0.0,
            tip_amount: 0.0,
            tolls_fare: 0.0,
            discount_amount: 0.0,
            total_tax_amount: 0.0,
            regulatory_fees: RegulatoryFees::default(),
            subtotal: 0.0,
            safego_commission: 0.0,
            commission_pct: 0,
            driver_payout: 0.0,
            kyc_required: true,
        }
    }
}

#[async_trait]
impl EarningsOperations for EarningsService {
    async fn trip_earnings(
        &self,
        driver_id: &str,
        trip_id: &str,
    ) -> Result<DriverTripEarningsView, DispatchError> {
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| DispatchError::driver_not_found(driver_id))?;

        let trip = self
            .store
            .get_trip(trip_id)
            .await?
            .filter(|t| t.driver_id.as_deref() == Some(driver_id))
            .ok_or_else(|| DispatchError::trip_not_found(trip_id))?;

        let view = if driver.kyc_status == KycStatus::Approved {
            Self::build_view(&trip)
        } else {
            tracing::debug!(driver_id, trip_id, "earnings gated: KYC not approved");
            Self::kyc_gated_view(&trip)
        };

        self.audit
            .record(
                "driver.earnings_viewed",
                driver_id,
                json!({ "tripId": trip_id, "kycRequired": view.kyc_required }),
            )
            .await;

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{FareLineItem, ServiceType, TripStatus};
    use crate::services::test_fixtures::{seed_driver, seed_trip};

    fn service(store: Arc<MemoryStore>) -> EarningsService {
        EarningsService::new(store, Arc::new(AuditLog::new()))
    }

    async fn seed_completed_ride(store: &MemoryStore, driver_id: &str) {
        let mut trip = seed_trip("ride-1", ServiceType::Ride, TripStatus::Completed);
        trip.driver_id = Some(driver_id.to_string());
        trip.fares.base_fare = 10.0;
        trip.fares.distance_fare = 6.0;
        trip.fares.time_fare = 4.0;
        trip.fares.tip_amount = 3.0;
        trip.fares.tolls_fare = 2.5;
        trip.safego_commission = 5.0;
        trip.driver_payout = 20.5;
        trip.fare_breakdown = vec![
            FareLineItem { label: "NYC Congestion Surcharge".to_string(), amount: 2.75 },
            FareLineItem { label: "JFK Airport Access Fee".to_string(), amount: 1.25 },
            FareLineItem { label: "Black Car Fund".to_string(), amount: 0.60 },
            FareLineItem { label: "Misc regulatory recovery".to_string(), amount: 0.40 },
        ];
        store.insert_trip(trip).await.unwrap();
    }

    #[tokio::test]
    async fn approved_driver_gets_full_breakdown() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();
        seed_completed_ride(&store, "drv-1").await;

        let view = service(store).trip_earnings("drv-1", "ride-1").await.unwrap();
        assert!(!view.kyc_required);
        assert_eq!(view.subtotal, 20.0);
        assert_eq!(view.commission_pct, 25); // 5.0 / 20.0
        assert_eq!(view.driver_payout, 20.5);

        let fees = &view.regulatory_fees;
        assert_eq!(fees.congestion, 2.75);
        assert_eq!(fees.airport, 1.25);
        assert_eq!(fees.black_car_fund, 0.60);
        assert_eq!(fees.other, 0.40);
        assert!((fees.total - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unapproved_driver_gets_zeroed_shape() {
        let store = Arc::new(MemoryStore::new());
        let mut driver = seed_driver("drv-1");
        driver.kyc_status = KycStatus::Pending;
        store.upsert_driver(driver).await.unwrap();
        seed_completed_ride(&store, "drv-1").await;

        let view = service(store).trip_earnings("drv-1", "ride-1").await.unwrap();
        assert!(view.kyc_required);
        assert_eq!(view.base_fare, 0.0);
        assert_eq!(view.driver_payout, 0.0);
        assert_eq!(view.safego_commission, 0.0);
        assert_eq!(view.regulatory_fees.total, 0.0);
        assert_eq!(view.trip_id, "ride-1");
    }

    #[tokio::test]
    async fn zero_subtotal_falls_back_to_default_commission() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_driver(seed_driver("drv-1")).await.unwrap();
        let mut trip = seed_trip("food-1", ServiceType::Food, TripStatus::Delivered);
        trip.driver_id = Some("drv-1".to_string());
        store.insert_trip(trip).await.unwrap();

        let view = service(store).trip_earnings("drv-1", "food-1").await.unwrap();
        assert_eq!(view.commission_pct, FALLBACK_COMMISSION_PCT);
    }

    #[tokio::test]
    async fn someone_elses_trip_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_driver(seed_driver("drv-2")).await.unwrap();
        seed_completed_ride(&store, "drv-1").await;

        let err = service(store).trip_earnings("drv-2", "ride-1").await.unwrap_err();
        assert!(matches!(err, DispatchError::TripNotFound(_)));
    }
}
