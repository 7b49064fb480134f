// src/services/trust_service.rs
//! Driver trust score: a weighted composite (0-100) of behavioral metrics.
//! The score is cached on the stats record with a JSON snapshot of its
//! components; reads serve the cache, recalculation refreshes it.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::DispatchError,
    models::driver::{DriverStats, TrustScoreView},
    store::{audit::AuditLog, MemoryStore},
};

const WEIGHT_ON_TIME: f64 = 0.25;
const WEIGHT_RATING: f64 = 0.30;
const WEIGHT_CANCELLATION: f64 = 0.20;
const WEIGHT_SAFETY: f64 = 0.15;
const WEIGHT_SUPPORT: f64 = 0.10;

/// Points docked per recorded safety violation.
const SAFETY_PENALTY_PER_VIOLATION: f64 = 10.0;

#[async_trait]
pub trait TrustOperations: Send + Sync {
    /// Cached score; stats are seeded (and scored once) on first read.
    async fn trust_score(&self, driver_id: &str) -> Result<TrustScoreView, DispatchError>;

    /// Recompute from the current counters and refresh the cache.
    async fn recalculate(&self, driver_id: &str) -> Result<TrustScoreView, DispatchError>;
}

pub struct TrustService {
    store: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl TrustService {
    pub fn new(store: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { store, audit }
    }

    fn score(stats: &DriverStats) -> (f64, serde_json::Value) {
        let on_time_pts = (stats.on_time_arrival_rate.clamp(0.0, 1.0) * 100.0) * WEIGHT_ON_TIME;
        let rating_pts = (stats.rider_rating_avg.clamp(0.0, 5.0) / 5.0 * 100.0) * WEIGHT_RATING;
        let cancellation_pts =
            ((1.0 - stats.cancellation_rate.clamp(0.0, 1.0)) * 100.0) * WEIGHT_CANCELLATION;
        let safety_raw =
            (100.0 - SAFETY_PENALTY_PER_VIOLATION * stats.safety_violation_count as f64).max(0.0);
        let safety_pts = safety_raw * WEIGHT_SAFETY;
        let support_pts = stats.support_ticket_score.clamp(0.0, 100.0) * WEIGHT_SUPPORT;

        let total =
            (on_time_pts + rating_pts + cancellation_pts + safety_pts + support_pts).clamp(0.0, 100.0);

        let breakdown = json!({
            "onTimeArrival": { "weight": WEIGHT_ON_TIME, "raw": stats.on_time_arrival_rate, "points": on_time_pts },
            "riderRating": { "weight": WEIGHT_RATING, "raw": stats.rider_rating_avg, "points": rating_pts },
            "cancellation": { "weight": WEIGHT_CANCELLATION, "raw": stats.cancellation_rate, "points": cancellation_pts },
            "safety": { "weight": WEIGHT_SAFETY, "raw": stats.safety_violation_count, "points": safety_pts },
            "supportTickets": { "weight": WEIGHT_SUPPORT, "raw": stats.support_ticket_score, "points": support_pts },
        });
        (total, breakdown)
    }

    fn to_view(stats: &DriverStats) -> TrustScoreView {
        TrustScoreView {
            driver_id: stats.driver_id.clone(),
            trust_score: stats.trust_score,
            breakdown: stats.trust_score_breakdown.clone(),
            last_updated: stats.last_trust_score_update,
            total_trips: stats.total_trips,
        }
    }

    async fn recalculate_inner(&self, driver_id: &str) -> Result<DriverStats, DispatchError> {
        let mut stats = self.store.get_or_seed_stats(driver_id).await?;
        let (score, breakdown) = Self::score(&stats);
        stats.trust_score = score;
        stats.trust_score_breakdown = breakdown;
        stats.last_trust_score_update = Utc::now();
        self.store.put_stats(stats.clone()).await?;
        Ok(stats)
    }
}

#[async_trait]
impl TrustOperations for TrustService {
    async fn trust_score(&self, driver_id: &str) -> Result<TrustScoreView, DispatchError> {
        let stats = self.store.get_or_seed_stats(driver_id).await?;
        // freshly seeded stats have never been scored
        let stats = if stats.trust_score_breakdown.is_null() {
            self.recalculate_inner(driver_id).await?
        } else {
            stats
        };
        Ok(Self::to_view(&stats))
    }

    async fn recalculate(&self, driver_id: &str) -> Result<TrustScoreView, DispatchError> {
        let stats = self.recalculate_inner(driver_id).await?;
        tracing::info!(driver_id, score = stats.trust_score, "trust score recalculated");
        self.audit
            .record(
                "driver.trust_score_recalculated",
                driver_id,
                json!({ "score": stats.trust_score }),
            )
            .await;
        Ok(Self::to_view(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::DriverStats;

    fn service(store: Arc<MemoryStore>) -> TrustService {
        TrustService::new(store, Arc::new(AuditLog::new()))
    }

    #[tokio::test]
    async fn first_read_seeds_and_scores() {
        let store = Arc::new(MemoryStore::new());
        let view = service(store).trust_score("drv-new").await.unwrap();
        // seeded defaults: 0.95 on-time, 5.0 rating, clean record
        // 23.75 + 30 + 20 + 15 + 10 = 98.75
        assert!((view.trust_score - 98.75).abs() < 1e-9);
        assert!(view.breakdown.is_object());
    }

    #[tokio::test]
    async fn violations_and_cancellations_dock_points() {
        let store = Arc::new(MemoryStore::new());
        let mut stats = DriverStats::seeded("drv-1");
        stats.on_time_arrival_rate = 0.80;
        stats.rider_rating_avg = 4.0;
        stats.cancellation_rate = 0.25;
        stats.safety_violation_count = 3;
        stats.support_ticket_score = 60.0;
        store.put_stats(stats).await.unwrap();

        let view = service(store).recalculate("drv-1").await.unwrap();
        // 20 + 24 + 15 + 10.5 + 6 = 75.5
        assert!((view.trust_score - 75.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn heavy_violations_floor_the_safety_component() {
        let store = Arc::new(MemoryStore::new());
        let mut stats = DriverStats::seeded("drv-1");
        stats.safety_violation_count = 25; // would go negative without the floor
        store.put_stats(stats).await.unwrap();

        let view = service(store).recalculate("drv-1").await.unwrap();
        let safety_points = view.breakdown["safety"]["points"].as_f64().unwrap();
        assert_eq!(safety_points, 0.0);
        assert!(view.trust_score >= 0.0 && view.trust_score <= 100.0);
    }

    #[tokio::test]
    async fn read_serves_cache_until_recalculated() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let first = svc.trust_score("drv-1").await.unwrap();

        // counters change behind the cache
        let mut stats = store.get_or_seed_stats("drv-1").await.unwrap();
        stats.rider_rating_avg = 1.0;
        store.put_stats(stats).await.unwrap();

        let cached = svc.trust_score("drv-1").await.unwrap();
        assert_eq!(cached.trust_score, first.trust_score);

        let refreshed = svc.recalculate("drv-1").await.unwrap();
        assert!(refreshed.trust_score < first.trust_score);
    }
}
