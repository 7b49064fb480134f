// src/lifecycle.rs
//! Trip state machine tables.
//!
//! Drivers speak one uniform vocabulary (`DriverTripStatus`); each service
//! kind persists its own vocabulary (`TripStatus`). The tables below are the
//! single source of truth for which transitions are legal from a given
//! *stored* status and which storage status a semantic request lands on.

use serde::{Deserialize, Serialize};

use crate::models::trip::{ServiceType, TripStatus};

/// Driver-facing semantic status vocabulary, uniform across service types.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverTripStatus {
    Arriving,
    Arrived,
    Started,
    Completed,
    Cancelled,
}

impl DriverTripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverTripStatus::Arriving => "arriving",
            DriverTripStatus::Arrived => "arrived",
            DriverTripStatus::Started => "started",
            DriverTripStatus::Completed => "completed",
            DriverTripStatus::Cancelled => "cancelled",
        }
    }
}

/// Statuses a trip can hold while still unassigned and offerable.
pub fn offerable_statuses(kind: ServiceType) -> &'static [TripStatus] {
    match kind {
        ServiceType::Ride | ServiceType::Parcel => {
            &[TripStatus::Requested, TripStatus::SearchingDriver]
        }
        ServiceType::Food => &[
            TripStatus::Requested,
            TripStatus::SearchingDriver,
            TripStatus::ReadyForPickup,
        ],
    }
}

/// Statuses that count as an active (in-flight) trip for a driver.
pub fn is_active(status: TripStatus) -> bool {
    matches!(
        status,
        TripStatus::Accepted
            | TripStatus::DriverArriving
            | TripStatus::Arrived
            | TripStatus::Started
            | TripStatus::PickedUp
            | TripStatus::InTransit
    )
}

pub fn is_terminal(status: TripStatus) -> bool {
    matches!(
        status,
        TripStatus::Completed | TripStatus::Delivered | TripStatus::Cancelled | TripStatus::Refunded
    )
}

/// Legal semantic transitions out of the given *stored* status.
/// Terminal states allow nothing; `cancelled` is reachable from every
/// non-terminal state.
pub fn allowed_transitions(kind: ServiceType, current: TripStatus) -> &'static [DriverTripStatus] {
    use DriverTripStatus::*;

    match kind {
        ServiceType::Ride => match current {
            TripStatus::Accepted => &[Arriving, Cancelled],
            TripStatus::DriverArriving => &[Arrived, Cancelled],
            TripStatus::Arrived => &[Started, Cancelled],
            TripStatus::Started => &[Completed, Cancelled],
            TripStatus::Requested | TripStatus::SearchingDriver => &[Cancelled],
            _ => &[],
        },
        ServiceType::Food | ServiceType::Parcel => match current {
            TripStatus::Accepted => &[Arriving, Cancelled],
            TripStatus::PickedUp => &[Arrived, Started, Cancelled],
            TripStatus::InTransit => &[Completed, Cancelled],
            TripStatus::Requested
            | TripStatus::SearchingDriver
            | TripStatus::ReadyForPickup => &[Cancelled],
            _ => &[],
        },
    }
}

/// Map a semantic status onto the storage status the given kind persists.
/// Food and parcel fold four semantic statuses onto three stored ones:
/// `arrived` and `started` both land on `in_transit`.
pub fn storage_status(kind: ServiceType, requested: DriverTripStatus) -> TripStatus {
    match kind {
        ServiceType::Ride => match requested {
            DriverTripStatus::Arriving => TripStatus::DriverArriving,
            DriverTripStatus::Arrived => TripStatus::Arrived,
            DriverTripStatus::Started => TripStatus::Started,
            DriverTripStatus::Completed => TripStatus::Completed,
            DriverTripStatus::Cancelled => TripStatus::Cancelled,
        },
        ServiceType::Food | ServiceType::Parcel => match requested {
            DriverTripStatus::Arriving => TripStatus::PickedUp,
            DriverTripStatus::Arrived | DriverTripStatus::Started => TripStatus::InTransit,
            DriverTripStatus::Completed => TripStatus::Delivered,
            DriverTripStatus::Cancelled => TripStatus::Cancelled,
        },
    }
}
