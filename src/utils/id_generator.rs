// src/utils/id_generator.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    Ride,
    FoodOrder,
    Parcel,
    Driver,
    Customer,
    Vehicle,
    Wallet,
    StatusEvent,
    AuditRecord,
}

impl IdType {
    pub fn to_prefix(&self) -> &'static str {
        match self {
            IdType::Ride => "ride",
            IdType::FoodOrder => "food",
            IdType::Parcel => "pcl",
            IdType::Driver => "drv",
            IdType::Customer => "cus",
            IdType::Vehicle => "veh",
            IdType::Wallet => "wlt",
            IdType::StatusEvent => "evt",
            IdType::AuditRecord => "aud",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefix())
    }
}

pub struct IdGenerator;

impl IdGenerator {
    /// Generate a unique ID with format: {prefix}-{yymmdd}-{random_suffix}
    pub fn generate(id_type: IdType) -> String {
        Self::generate_with_timestamp(id_type, Utc::now())
    }

    /// Generate ID with a specific timestamp (useful for testing)
    pub fn generate_with_timestamp(id_type: IdType, timestamp: DateTime<Utc>) -> String {
        let date_part = timestamp.format("%y%m%d").to_string();
        let random_suffix = Self::generate_suffix(8);

        format!("{}-{}-{}", id_type.to_prefix(), date_part, random_suffix)
    }

    fn generate_suffix(n: usize) -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Check whether an ID is well-formed, optionally for a specific type.
    pub fn validate_id(id: &str, expected: Option<IdType>) -> bool {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 {
            return false;
        }
        if parts[1].len() != 6 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        if parts[2].is_empty() {
            return false;
        }
        match expected {
            Some(id_type) => parts[0] == id_type.to_prefix(),
            None => matches!(
                parts[0],
                "ride" | "food" | "pcl" | "drv" | "cus" | "veh" | "wlt" | "evt" | "aud"
            ),
        }
    }
}
