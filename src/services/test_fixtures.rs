// src/services/test_fixtures.rs
use chrono::Utc;

use crate::models::driver::{
    AvailabilityStatus, DriverProfile, DriverWallet, KycStatus, Vehicle, VerificationStatus,
};
use crate::models::trip::{FareLedger, PaymentMethod, ServiceType, Trip, TripStatus};

/// A verified, online driver with an empty wallet debt.
pub fn seed_driver(id: &str) -> DriverProfile {
    DriverProfile {
        id: id.to_string(),
        first_name: "Ama".to_string(),
        last_name: "Mensah".to_string(),
        phone_number: "+233200000000".to_string(),
        is_verified: true,
        verification_status: VerificationStatus::Approved,
        kyc_status: KycStatus::Approved,
        is_suspended: false,
        current_lat: None,
        current_lng: None,
        availability_status: AvailabilityStatus::Online,
        vehicle: Some(Vehicle {
            id: "veh-250101-aaaaaaaa".to_string(),
            license_plate: "GR-1234-25".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2021,
            color: "Silver".to_string(),
            is_online: true,
        }),
        wallet: Some(DriverWallet {
            id: "wlt-250101-aaaaaaaa".to_string(),
            balance: 0.0,
            negative_balance: 0.0,
            country: "US".to_string(),
        }),
        device_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// An unassigned trip with an empty fare ledger.
pub fn seed_trip(id: &str, kind: ServiceType, status: TripStatus) -> Trip {
    Trip {
        id: id.to_string(),
        service_type: kind,
        status,
        driver_id: None,
        customer_id: "cus-250101-bbbbbbbb".to_string(),
        pickup_address: "1 Pickup St".to_string(),
        dropoff_address: "2 Dropoff Ave".to_string(),
        pickup_coords: None,
        dropoff_coords: None,
        fares: FareLedger::default(),
        fare_breakdown: Vec::new(),
        safego_commission: 0.0,
        driver_payout: 0.0,
        payment_method: PaymentMethod::Card,
        created_at: Utc::now(),
        arrived_at: None,
        trip_started_at: None,
        completed_at: None,
        delivered_at: None,
        updated_at: Utc::now(),
        metadata: serde_json::Map::new(),
    }
}
