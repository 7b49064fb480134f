// src/services/notification_service.rs
use async_trait::async_trait;
use thiserror::Error;

use crate::models::trip::Trip;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("no device token for recipient")]
    NoDeviceToken,
}

/// Customer-facing notification seam. Actual delivery (push, SMS) is an
/// external collaborator; callers treat every send as best-effort.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify_trip_accepted(&self, trip: &Trip) -> Result<(), NotificationError>;
    async fn notify_status_update(&self, trip: &Trip, status: &str) -> Result<(), NotificationError>;
}

/// Logs instead of delivering.
pub struct LogNotificationService;

#[async_trait]
impl NotificationService for LogNotificationService {
    async fn notify_trip_accepted(&self, trip: &Trip) -> Result<(), NotificationError> {
        tracing::info!(
            trip_id = %trip.id,
            customer_id = %trip.customer_id,
            "notify: driver accepted trip"
        );
        Ok(())
    }

    async fn notify_status_update(&self, trip: &Trip, status: &str) -> Result<(), NotificationError> {
        tracing::info!(
            trip_id = %trip.id,
            customer_id = %trip.customer_id,
            status,
            "notify: trip status update"
        );
        Ok(())
    }
}
