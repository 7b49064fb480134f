// src/models/driver.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Offline,
    Online,
    OnTrip,
    OnBreak,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vehicle {
    pub id: String,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    /// Gates whether the driver can receive offers at all.
    pub is_online: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverWallet {
    pub id: String,
    pub balance: f64,
    /// Outstanding debt; past a per-country threshold it blocks acceptance
    /// of cash-payment trips.
    pub negative_balance: f64,
    pub country: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    pub kyc_status: KycStatus,
    pub is_suspended: bool,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub availability_status: AvailabilityStatus,
    pub vehicle: Option<Vehicle>,
    pub wallet: Option<DriverWallet>,
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DriverProfile {
    pub fn has_online_vehicle(&self) -> bool {
        self.vehicle.as_ref().map(|v| v.is_online).unwrap_or(false)
    }
}

/// Behavioral counters plus the cached trust score. Created lazily on first
/// trust-score read with seeded defaults; never deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverStats {
    pub driver_id: String,
    /// 0.0..=1.0
    pub on_time_arrival_rate: f64,
    /// 0.0..=5.0
    pub rider_rating_avg: f64,
    /// 0.0..=1.0
    pub cancellation_rate: f64,
    pub safety_violation_count: u32,
    /// 0.0..=100.0, higher is better
    pub support_ticket_score: f64,
    pub total_trips: u64,
    pub trust_score: f64,
    /// Snapshot of the weighted components at the time of the last
    /// recalculation.
    pub trust_score_breakdown: serde_json::Value,
    pub last_trust_score_update: DateTime<Utc>,
}

impl DriverStats {
    /// Seeded defaults for a driver with no recorded history.
    pub fn seeded(driver_id: &str) -> Self {
        DriverStats {
            driver_id: driver_id.to_string(),
            on_time_arrival_rate: 0.95,
            rider_rating_avg: 5.0,
            cancellation_rate: 0.0,
            safety_violation_count: 0,
            support_ticket_score: 100.0,
            total_trips: 0,
            trust_score: 0.0,
            trust_score_breakdown: serde_json::Value::Null,
            last_trust_score_update: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScoreView {
    pub driver_id: String,
    pub trust_score: f64,
    pub breakdown: serde_json::Value,
    pub last_updated: DateTime<Utc>,
    pub total_trips: u64,
}
