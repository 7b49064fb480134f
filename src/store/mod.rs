// src/store/mod.rs
//! In-memory backing store. Real persistence is an external collaborator;
//! this keeps the same seam the services would use against it.
//!
//! Every lock acquisition is bounded by a timeout so a wedged store fails
//! loudly instead of hanging the request.

pub mod audit;

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;

use crate::auth::Session;
use crate::lifecycle;
use crate::models::driver::{AvailabilityStatus, DriverProfile, DriverStats};
use crate::models::trip::{ServiceType, Trip, TripStatus, TripStatusEvent};

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,
}

/// Outcome of the atomic conditional assignment. The check and the write
/// happen under one write lock, so concurrent accepts cannot both win.
#[derive(Debug)]
pub enum AssignOutcome {
    Assigned(Trip),
    AlreadyAssigned,
    NotOfferable(TripStatus),
    NotFound,
}

pub struct MemoryStore {
    trips: RwLock<HashMap<String, Trip>>,
    drivers: RwLock<HashMap<String, DriverProfile>>,
    stats: RwLock<HashMap<String, DriverStats>>,
    sessions: RwLock<HashMap<String, Session>>,
    status_events: RwLock<Vec<TripStatusEvent>>,
    op_timeout: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(op_timeout: Duration) -> Self {
        MemoryStore {
            trips: RwLock::new(HashMap::new()),
            drivers: RwLock::new(HashMap::new()),
            stats: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            status_events: RwLock::new(Vec::new()),
            op_timeout,
        }
    }

    async fn read<'a, T>(
        &self,
        lock: &'a RwLock<T>,
    ) -> Result<RwLockReadGuard<'a, T>, StoreError> {
        timeout(self.op_timeout, lock.read())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    async fn write<'a, T>(
        &self,
        lock: &'a RwLock<T>,
    ) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
        timeout(self.op_timeout, lock.write())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    // ---- trips ----

    pub async fn insert_trip(&self, trip: Trip) -> Result<(), StoreError> {
        let mut trips = self.write(&self.trips).await?;
        trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>, StoreError> {
        let trips = self.read(&self.trips).await?;
        Ok(trips.get(trip_id).cloned())
    }

    /// Unassigned trips of one kind still in an offerable status, most
    /// recent first. No fairness or wait-time boosting.
    pub async fn list_unassigned(
        &self,
        kind: ServiceType,
        limit: usize,
    ) -> Result<Vec<Trip>, StoreError> {
        let trips = self.read(&self.trips).await?;
        let offerable = lifecycle::offerable_statuses(kind);
        let mut pending: Vec<Trip> = trips
            .values()
            .filter(|t| {
                t.service_type == kind && t.driver_id.is_none() && offerable.contains(&t.status)
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending.truncate(limit);
        Ok(pending)
    }

    pub async fn find_active_trip(&self, driver_id: &str) -> Result<Option<Trip>, StoreError> {
        let trips = self.read(&self.trips).await?;
        Ok(trips
            .values()
            .find(|t| t.driver_id.as_deref() == Some(driver_id) && lifecycle::is_active(t.status))
            .cloned())
    }

    /// Compare-and-swap driver assignment: assigns only while the trip is
    /// still unassigned and offerable. Losing racers see `AlreadyAssigned`.
    pub async fn assign_driver_if_unassigned(
        &self,
        trip_id: &str,
        driver_id: &str,
    ) -> Result<AssignOutcome, StoreError> {
        let mut trips = self.write(&self.trips).await?;
        let trip = match trips.get_mut(trip_id) {
            Some(trip) => trip,
            None => return Ok(AssignOutcome::NotFound),
        };

        if trip.driver_id.is_some() {
            return Ok(AssignOutcome::AlreadyAssigned);
        }
        if !lifecycle::offerable_statuses(trip.service_type).contains(&trip.status) {
            return Ok(AssignOutcome::NotOfferable(trip.status));
        }

        trip.driver_id = Some(driver_id.to_string());
        trip.status = TripStatus::Accepted;
        trip.updated_at = Utc::now();
        Ok(AssignOutcome::Assigned(trip.clone()))
    }

    /// Run a mutation against a trip under the write lock. Returns `None`
    /// if the trip does not exist; otherwise the closure's result.
    pub async fn with_trip_mut<R>(
        &self,
        trip_id: &str,
        f: impl FnOnce(&mut Trip) -> R + Send,
    ) -> Result<Option<R>, StoreError> {
        let mut trips = self.write(&self.trips).await?;
        Ok(trips.get_mut(trip_id).map(f))
    }

    // ---- drivers ----

    pub async fn upsert_driver(&self, driver: DriverProfile) -> Result<(), StoreError> {
        let mut drivers = self.write(&self.drivers).await?;
        drivers.insert(driver.id.clone(), driver);
        Ok(())
    }

    pub async fn get_driver(&self, driver_id: &str) -> Result<Option<DriverProfile>, StoreError> {
        let drivers = self.read(&self.drivers).await?;
        Ok(drivers.get(driver_id).cloned())
    }

    pub async fn update_driver_location(
        &self,
        driver_id: &str,
        lat: f64,
        lng: f64,
    ) -> Result<(), StoreError> {
        let mut drivers = self.write(&self.drivers).await?;
        if let Some(driver) = drivers.get_mut(driver_id) {
            driver.current_lat = Some(lat);
            driver.current_lng = Some(lng);
            driver.updated_at = Utc::now();
        }
        Ok(())
    }

    pub async fn set_driver_availability(
        &self,
        driver_id: &str,
        availability: AvailabilityStatus,
    ) -> Result<(), StoreError> {
        let mut drivers = self.write(&self.drivers).await?;
        if let Some(driver) = drivers.get_mut(driver_id) {
            driver.availability_status = availability;
            driver.updated_at = Utc::now();
        }
        Ok(())
    }

    // ---- driver stats ----

    /// Stats are created lazily with seeded defaults on first read.
    pub async fn get_or_seed_stats(&self, driver_id: &str) -> Result<DriverStats, StoreError> {
        let mut stats = self.write(&self.stats).await?;
        Ok(stats
            .entry(driver_id.to_string())
            .or_insert_with(|| DriverStats::seeded(driver_id))
            .clone())
    }

    pub async fn put_stats(&self, stats: DriverStats) -> Result<(), StoreError> {
        let mut map = self.write(&self.stats).await?;
        map.insert(stats.driver_id.clone(), stats);
        Ok(())
    }

    // ---- sessions ----

    pub async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.write(&self.sessions).await?;
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let sessions = self.read(&self.sessions).await?;
        Ok(sessions.get(token).cloned())
    }

    // ---- status events ----

    pub async fn append_status_event(&self, event: TripStatusEvent) -> Result<(), StoreError> {
        let mut events = self.write(&self.status_events).await?;
        events.push(event);
        Ok(())
    }

    pub async fn status_events_for(&self, trip_id: &str) -> Result<Vec<TripStatusEvent>, StoreError> {
        let events = self.read(&self.status_events).await?;
        Ok(events.iter().filter(|e| e.trip_id == trip_id).cloned().collect())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
