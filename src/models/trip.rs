// src/models/trip.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::DriverTripStatus;

/// The three trip kinds served by the platform. One tagged type instead of
/// three parallel entities; the per-kind differences live in the lifecycle
/// transition tables.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Ride,
    Food,
    Parcel,
}

impl ServiceType {
    pub fn all() -> [ServiceType; 3] {
        [ServiceType::Ride, ServiceType::Food, ServiceType::Parcel]
    }
}

/// Storage-level trip status. The persisted vocabulary diverges per service
/// type; drivers see the uniform vocabulary in `DriverTripStatus`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Requested,
    SearchingDriver,
    ReadyForPickup, // food only: order cooked, waiting for a courier
    Accepted,
    DriverArriving,
    Arrived,
    Started,
    PickedUp,  // food/parcel
    InTransit, // food/parcel
    Completed,
    Delivered, // food/parcel terminal
    Cancelled,
    Refunded,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Requested => "requested",
            TripStatus::SearchingDriver => "searching_driver",
            TripStatus::ReadyForPickup => "ready_for_pickup",
            TripStatus::Accepted => "accepted",
            TripStatus::DriverArriving => "driver_arriving",
            TripStatus::Arrived => "arrived",
            TripStatus::Started => "started",
            TripStatus::PickedUp => "picked_up",
            TripStatus::InTransit => "in_transit",
            TripStatus::Completed => "completed",
            TripStatus::Delivered => "delivered",
            TripStatus::Cancelled => "cancelled",
            TripStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Wallet,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Stored fare ledger. Forward-computed by the (non-modeled) pricing flow;
/// nothing here re-derives or enforces the payout identity.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FareLedger {
    pub base_fare: f64,
    pub distance_fare: f64,
    pub time_fare: f64,
    pub surge_fare: f64,
    pub delivery_fee: f64,
    pub tip_amount: f64,
    pub tolls_fare: f64,
    pub discount_amount: f64,
    pub total_tax_amount: f64,
}

/// Itemized regulatory fee or toll, label is free text from the pricing
/// engine (e.g. "NYC Congestion Surcharge").
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FareLineItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct CompletionLocation {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    pub id: String,
    pub service_type: ServiceType,
    pub status: TripStatus,
    pub driver_id: Option<String>,
    pub customer_id: String,

    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_coords: Option<Coordinates>,
    pub dropoff_coords: Option<Coordinates>,

    pub fares: FareLedger,
    /// Itemized regulatory fees and tolls; populated for rides.
    pub fare_breakdown: Vec<FareLineItem>,
    pub safego_commission: f64,
    pub driver_payout: f64,
    pub payment_method: PaymentMethod,

    pub created_at: DateTime<Utc>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub trip_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,

    /// Free-form metadata: completion location, location-verified flag,
    /// cancellation reason. Informational only, nothing reads it back.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Immutable status-event record appended on every ride transition.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TripStatusEvent {
    pub id: String,
    pub trip_id: String,
    pub from_status: TripStatus,
    pub to_status: TripStatus,
    pub actor_driver_id: String,
    pub created_at: DateTime<Utc>,
}

// Request/Response Models

/// A pending trip projected into a driver-facing offer. Derived at read
/// time, never persisted; `expires_at` is advisory only.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PendingTripRequestView {
    pub request_id: String,
    pub service_type: ServiceType,
    pub status: TripStatus,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_coords: Option<Coordinates>,
    pub dropoff_coords: Option<Coordinates>,
    pub payment_method: PaymentMethod,
    pub estimated_payout: f64,
    pub distance_to_pickup_km: Option<f64>,
    pub eta_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetailView {
    #[serde(flatten)]
    pub offer: PendingTripRequestView,
    pub cash_blocked: bool,
    pub cash_block_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptTripRequest {
    pub service_type: ServiceType,
    pub driver_lat: Option<f64>,
    pub driver_lng: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptTripResponse {
    pub success: bool,
    pub trip_id: String,
    pub service_type: ServiceType,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineTripRequest {
    pub service_type: ServiceType,
    pub reason: Option<String>,
    #[serde(default)]
    pub auto_declined: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: DriverTripStatus,
    pub driver_lat: Option<f64>,
    pub driver_lng: Option<f64>,
    pub reason: Option<String>,
    pub completion_location: Option<CompletionLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub previous_status: TripStatus,
    pub new_status: TripStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    pub id: String,
    pub service_type: ServiceType,
    pub status: TripStatus,
    pub driver_id: Option<String>,
    pub customer_id: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_coords: Option<Coordinates>,
    pub dropoff_coords: Option<Coordinates>,
    pub payment_method: PaymentMethod,
    pub driver_payout: f64,
    pub created_at: DateTime<Utc>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub trip_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<Trip> for TripView {
    fn from(trip: Trip) -> Self {
        TripView {
            id: trip.id,
            service_type: trip.service_type,
            status: trip.status,
            driver_id: trip.driver_id,
            customer_id: trip.customer_id,
            pickup_address: trip.pickup_address,
            dropoff_address: trip.dropoff_address,
            pickup_coords: trip.pickup_coords,
            dropoff_coords: trip.dropoff_coords,
            payment_method: trip.payment_method,
            driver_payout: trip.driver_payout,
            created_at: trip.created_at,
            arrived_at: trip.arrived_at,
            trip_started_at: trip.trip_started_at,
            completed_at: trip.completed_at,
            delivered_at: trip.delivered_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTripResponse {
    pub active_trip: Option<TripView>,
    pub has_active_trip: bool,
}

/// Regulatory fee line items bucketed by category, plus their sum.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryFees {
    pub congestion: f64,
    pub airport: f64,
    pub state_surcharge: f64,
    pub high_volume_surcharge: f64,
    pub black_car_fund: f64,
    pub long_trip: f64,
    pub out_of_town: f64,
    pub cross_borough: f64,
    pub accessible_vehicle: f64,
    pub other: f64,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTripEarningsView {
    pub trip_id: String,
    pub service_type: ServiceType,
    pub base_fare: f64,
    pub distance_fare: f64,
    pub time_fare: f64,
    pub surge_fare: f64,
    pub delivery_fee: f64,
    pub tip_amount: f64,
    pub tolls_fare: f64,
    pub discount_amount: f64,
    pub total_tax_amount: f64,
    pub regulatory_fees: RegulatoryFees,
    pub subtotal: f64,
    pub safego_commission: f64,
    pub commission_pct: i64,
    pub driver_payout: f64,
    pub kyc_required: bool,
}
