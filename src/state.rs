// src/state.rs
use std::collections::HashMap;
use std::sync::Arc;

use crate::services::acceptance_service::AcceptanceService;
use crate::services::earnings_service::EarningsService;
use crate::services::notification_service::{LogNotificationService, NotificationService};
use crate::services::offer_service::OfferService;
use crate::services::trip_service::TripService;
use crate::services::trust_service::TrustService;
use crate::store::audit::AuditLog;
use crate::store::MemoryStore;
use crate::models::trip::ServiceType;

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub audit_log: Arc<AuditLog>,
    pub offer_service: Arc<OfferService>,
    pub acceptance_service: Arc<AcceptanceService>,
    pub trip_service: Arc<TripService>,
    pub earnings_service: Arc<EarningsService>,
    pub trust_service: Arc<TrustService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Fixed assumed speed for offer ETAs; not a routing estimate.
    pub assumed_speed_kmh: f64,
    pub offer_limit_per_type: usize,
    pub ride_offer_ttl_secs: i64,
    pub food_offer_ttl_secs: i64,
    pub parcel_offer_ttl_secs: i64,
    /// Per-country outstanding-balance limits for cash-payment acceptance.
    pub cash_debt_thresholds: HashMap<String, f64>,
    pub default_cash_debt_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut cash_debt_thresholds = HashMap::new();
        cash_debt_thresholds.insert("US".to_string(), 50.0);
        cash_debt_thresholds.insert("GH".to_string(), 100.0);

        AppConfig {
            bind_addr: "0.0.0.0:3000".to_string(),
            assumed_speed_kmh: 30.0,
            offer_limit_per_type: 10,
            ride_offer_ttl_secs: 30,
            food_offer_ttl_secs: 60,
            parcel_offer_ttl_secs: 30,
            cash_debt_thresholds,
            default_cash_debt_threshold: 50.0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            assumed_speed_kmh: env_parse("ASSUMED_SPEED_KMH", defaults.assumed_speed_kmh),
            offer_limit_per_type: env_parse("OFFER_LIMIT_PER_TYPE", defaults.offer_limit_per_type),
            ride_offer_ttl_secs: env_parse("RIDE_OFFER_TTL_SECS", defaults.ride_offer_ttl_secs),
            food_offer_ttl_secs: env_parse("FOOD_OFFER_TTL_SECS", defaults.food_offer_ttl_secs),
            parcel_offer_ttl_secs: env_parse("PARCEL_OFFER_TTL_SECS", defaults.parcel_offer_ttl_secs),
            cash_debt_thresholds: defaults.cash_debt_thresholds,
            default_cash_debt_threshold: env_parse(
                "DEFAULT_CASH_DEBT_THRESHOLD",
                defaults.default_cash_debt_threshold,
            ),
        }
    }

    pub fn offer_ttl(&self, kind: ServiceType) -> chrono::Duration {
        let secs = match kind {
            ServiceType::Ride => self.ride_offer_ttl_secs,
            ServiceType::Food => self.food_offer_ttl_secs,
            ServiceType::Parcel => self.parcel_offer_ttl_secs,
        };
        chrono::Duration::seconds(secs)
    }

    pub fn cash_debt_threshold(&self, country: &str) -> f64 {
        self.cash_debt_thresholds
            .get(country)
            .copied()
            .unwrap_or(self.default_cash_debt_threshold)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let audit_log = Arc::new(AuditLog::new());
        let notification_service: Arc<dyn NotificationService> = Arc::new(LogNotificationService);

        let offer_service = Arc::new(OfferService::new(
            store.clone(),
            audit_log.clone(),
            config.clone(),
        ));
        let acceptance_service = Arc::new(AcceptanceService::new(
            store.clone(),
            audit_log.clone(),
            notification_service.clone(),
            config.clone(),
        ));
        let trip_service = Arc::new(TripService::new(
            store.clone(),
            audit_log.clone(),
            notification_service.clone(),
        ));
        let earnings_service = Arc::new(EarningsService::new(store.clone(), audit_log.clone()));
        let trust_service = Arc::new(TrustService::new(store.clone(), audit_log.clone()));

        Self {
            store,
            audit_log,
            offer_service,
            acceptance_service,
            trip_service,
            earnings_service,
            trust_service,
            notification_service,
            config,
        }
    }
}
