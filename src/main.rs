use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tower_http::cors::CorsLayer;

use safego_dispatch::{
    auth::{Role, Session},
    handlers::{request_handler, trip_handler, trust_handler},
    models::driver::{
        AvailabilityStatus, DriverProfile, DriverWallet, KycStatus, Vehicle, VerificationStatus,
    },
    models::trip::{Coordinates, FareLedger, PaymentMethod, ServiceType, Trip, TripStatus},
    state::{AppConfig, AppState},
    utils::id_generator::{IdGenerator, IdType},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config));

    if std::env::var("SEED_DEMO_DATA").is_ok() {
        seed_demo_data(&app_state).await;
    }

    let app = Router::new()
        .route("/driver/requests/pending", get(request_handler::pending_requests))
        .route("/driver/requests/:request_id", get(request_handler::request_detail))
        .route("/driver/requests/:request_id/accept", post(request_handler::accept_request))
        .route("/driver/requests/:request_id/decline", post(request_handler::decline_request))
        .route("/driver/trip-history/active", get(trip_handler::active_trip))
        .route("/driver/trip-history/:trip_id/status", post(trip_handler::update_status))
        .route("/driver/trip-history/:trip_id/earnings", get(trip_handler::trip_earnings))
        .route("/driver/trust-score", get(trust_handler::get_trust_score))
        .route("/driver/trust-score/recalculate", post(trust_handler::recalculate_trust_score))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(addr = %bind_addr, "dispatch service listening");
    axum::serve(listener, app).await.expect("server error");
}

/// One verified driver with a session token and a couple of open requests,
/// enough to poke every route by hand.
async fn seed_demo_data(state: &AppState) {
    let driver_id = IdGenerator::generate(IdType::Driver);
    let driver = DriverProfile {
        id: driver_id.clone(),
        first_name: "Demo".to_string(),
        last_name: "Driver".to_string(),
        phone_number: "+15550100000".to_string(),
        is_verified: true,
        verification_status: VerificationStatus::Approved,
        kyc_status: KycStatus::Approved,
        is_suspended: false,
        current_lat: Some(40.7580),
        current_lng: Some(-73.9855),
        availability_status: AvailabilityStatus::Online,
        vehicle: Some(Vehicle {
            id: IdGenerator::generate(IdType::Vehicle),
            license_plate: "DEMO-001".to_string(),
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2022,
            color: "Black".to_string(),
            is_online: true,
        }),
        wallet: Some(DriverWallet {
            id: IdGenerator::generate(IdType::Wallet),
            balance: 0.0,
            negative_balance: 0.0,
            country: "US".to_string(),
        }),
        device_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let session = Session::issue(&driver_id, Role::Driver);
    let token = session.token.clone();

    let ride = Trip {
        id: IdGenerator::generate(IdType::Ride),
        service_type: ServiceType::Ride,
        status: TripStatus::Requested,
        driver_id: None,
        customer_id: IdGenerator::generate(IdType::Customer),
        pickup_address: "350 5th Ave, New York".to_string(),
        dropoff_address: "1 World Trade Center, New York".to_string(),
        pickup_coords: Some(Coordinates { lat: 40.7484, lng: -73.9857 }),
        dropoff_coords: Some(Coordinates { lat: 40.7127, lng: -74.0134 }),
        fares: FareLedger {
            base_fare: 8.0,
            distance_fare: 6.5,
            time_fare: 4.0,
            ..FareLedger::default()
        },
        fare_breakdown: Vec::new(),
        safego_commission: 4.6,
        driver_payout: 13.9,
        payment_method: PaymentMethod::Card,
        created_at: Utc::now(),
        arrived_at: None,
        trip_started_at: None,
        completed_at: None,
        delivered_at: None,
        updated_at: Utc::now(),
        metadata: serde_json::Map::new(),
    };

    let food = Trip {
        id: IdGenerator::generate(IdType::FoodOrder),
        service_type: ServiceType::Food,
        status: TripStatus::ReadyForPickup,
        payment_method: PaymentMethod::Cash,
        pickup_address: "Joe's Pizza, 7 Carmine St".to_string(),
        dropoff_address: "90 Bedford St, New York".to_string(),
        pickup_coords: Some(Coordinates { lat: 40.7305, lng: -74.0021 }),
        dropoff_coords: Some(Coordinates { lat: 40.7320, lng: -74.0037 }),
        fares: FareLedger { delivery_fee: 5.0, ..FareLedger::default() },
        safego_commission: 1.0,
        driver_payout: 4.0,
        ..ride.clone()
    };

    let seed = async {
        state.store.upsert_driver(driver).await?;
        state.store.insert_session(session).await?;
        state.store.insert_trip(ride).await?;
        state.store.insert_trip(food).await
    };
    match seed.await {
        Ok(()) => tracing::info!(%driver_id, %token, "demo data seeded"),
        Err(e) => tracing::warn!(error = %e, "demo seeding failed"),
    }
}
