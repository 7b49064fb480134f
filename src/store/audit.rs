// src/store/audit.rs
//! Append-only audit log. Each record carries the SHA-256 hash of its
//! predecessor, computed inside the same lock as the append, so the chain
//! holds without any process-global "last hash" state.
//!
//! Writes are best-effort everywhere in the service: callers use `record`,
//! which warns on failure and never propagates it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::store::{StoreError, DEFAULT_OP_TIMEOUT};
use crate::utils::id_generator::{IdGenerator, IdType};

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: String,
    pub action: String,
    pub actor: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub prev_hash: String,
    pub hash: String,
}

pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
    op_timeout: Duration,
}

impl AuditLog {
    pub fn new() -> Self {
        AuditLog {
            records: Mutex::new(Vec::new()),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Append a record, chaining it to the previous one.
    pub async fn append(
        &self,
        action: &str,
        actor: &str,
        details: serde_json::Value,
    ) -> Result<AuditRecord, StoreError> {
        let mut records = timeout(self.op_timeout, self.records.lock())
            .await
            .map_err(|_| StoreError::Timeout)?;

        let prev_hash = records
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let id = IdGenerator::generate(IdType::AuditRecord);
        let created_at = Utc::now();
        let hash = Self::hash_record(&prev_hash, &id, action, actor, &details, created_at);

        let record = AuditRecord {
            id,
            action: action.to_string(),
            actor: actor.to_string(),
            details,
            created_at,
            prev_hash,
            hash,
        };
        records.push(record.clone());
        Ok(record)
    }

    /// Best-effort append: a failed audit write is warned about, never
    /// surfaced to the caller.
    pub async fn record(&self, action: &str, actor: &str, details: serde_json::Value) {
        if let Err(e) = self.append(action, actor, details).await {
            tracing::warn!(action, actor, error = %e, "audit write failed, continuing");
        }
    }

    pub async fn records(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let records = timeout(self.op_timeout, self.records.lock())
            .await
            .map_err(|_| StoreError::Timeout)?;
        Ok(records.clone())
    }

    /// Walk the chain and check every parent reference.
    pub async fn verify_chain(&self) -> Result<bool, StoreError> {
        let records = self.records().await?;
        let mut expected_prev = GENESIS_HASH.to_string();
        for record in &records {
            if record.prev_hash != expected_prev {
                return Ok(false);
            }
            let recomputed = Self::hash_record(
                &record.prev_hash,
                &record.id,
                &record.action,
                &record.actor,
                &record.details,
                record.created_at,
            );
            if recomputed != record.hash {
                return Ok(false);
            }
            expected_prev = record.hash.clone();
        }
        Ok(true)
    }

    fn hash_record(
        prev_hash: &str,
        id: &str,
        action: &str,
        actor: &str,
        details: &serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prev_hash.as_bytes());
        hasher.update(id.as_bytes());
        hasher.update(action.as_bytes());
        hasher.update(actor.as_bytes());
        hasher.update(details.to_string().as_bytes());
        hasher.update(created_at.to_rfc3339().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
