// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants;
use crate::domain::error::AppError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_false")]
    pub log_json: bool,

    // Endpoints
    pub rpc_url: String,
    pub backend_base_url: String,
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,

    // Aggregate reads
    #[serde(default = "default_multicall_address")]
    pub multicall_address: Address,

    // Log discovery
    #[serde(default = "default_log_chunk")]
    pub log_chunk: u64,
    #[serde(default = "default_log_chunk_floor")]
    pub log_chunk_floor: u64,

    // Receipt polling
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_poll_attempts")]
    pub receipt_poll_attempts: u32,

    // Targeting
    #[serde(default = "default_selecting_horizon_secs")]
    pub selecting_horizon_secs: u64,
    #[serde(default = "default_committed_horizon_secs")]
    pub committed_horizon_secs: u64,
    #[serde(default = "default_reconcile_interval_ms")]
    pub reconcile_interval_ms: u64,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_false() -> bool {
    false
}
fn default_log_level() -> String {
    constants::DEFAULT_LOG_LEVEL.to_string()
}
fn default_backend_timeout_ms() -> u64 {
    constants::DEFAULT_BACKEND_TIMEOUT_MS
}
fn default_multicall_address() -> Address {
    constants::MULTICALL3_ADDRESS
}
fn default_log_chunk() -> u64 {
    constants::DEFAULT_LOG_CHUNK
}
fn default_log_chunk_floor() -> u64 {
    constants::DEFAULT_LOG_CHUNK_FLOOR
}
fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_poll_attempts() -> u32 {
    constants::DEFAULT_RECEIPT_POLL_ATTEMPTS
}
fn default_selecting_horizon_secs() -> u64 {
    constants::DEFAULT_SELECTING_HORIZON_SECS
}
fn default_committed_horizon_secs() -> u64 {
    constants::DEFAULT_COMMITTED_HORIZON_SECS
}
fn default_reconcile_interval_ms() -> u64 {
    constants::DEFAULT_RECONCILE_INTERVAL_MS
}

impl GlobalSettings {
    /// Load from an optional config file plus `RAID_*` environment
    /// overrides, then validate.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(p) => builder.add_source(File::with_name(p)),
            None => builder.add_source(File::with_name("config").required(false)),
        };
        let settings: GlobalSettings = builder
            .add_source(Environment::with_prefix("RAID"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Library defaults for the given endpoints. Embedders that configure
    /// programmatically (and tests) start from this.
    pub fn with_endpoints(
        rpc_url: impl Into<String>,
        backend_base_url: impl Into<String>,
    ) -> Self {
        Self {
            debug: default_debug(),
            log_level: default_log_level(),
            log_json: default_false(),
            rpc_url: rpc_url.into(),
            backend_base_url: backend_base_url.into(),
            backend_timeout_ms: default_backend_timeout_ms(),
            multicall_address: default_multicall_address(),
            log_chunk: default_log_chunk(),
            log_chunk_floor: default_log_chunk_floor(),
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_poll_attempts: default_receipt_poll_attempts(),
            selecting_horizon_secs: default_selecting_horizon_secs(),
            committed_horizon_secs: default_committed_horizon_secs(),
            reconcile_interval_ms: default_reconcile_interval_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        Url::parse(&self.rpc_url).map_err(|e| AppError::Validation {
            field: "rpc_url".into(),
            message: e.to_string(),
        })?;
        Url::parse(&self.backend_base_url).map_err(|e| AppError::Validation {
            field: "backend_base_url".into(),
            message: e.to_string(),
        })?;
        if self.log_chunk == 0 {
            return Err(AppError::Validation {
                field: "log_chunk".into(),
                message: "must be at least 1 block".into(),
            });
        }
        if self.log_chunk_floor == 0 || self.log_chunk_floor > self.log_chunk {
            return Err(AppError::Validation {
                field: "log_chunk_floor".into(),
                message: format!(
                    "must be in 1..={} (the initial chunk size)",
                    self.log_chunk
                ),
            });
        }
        if self.reconcile_interval_ms == 0 {
            return Err(AppError::Validation {
                field: "reconcile_interval_ms".into(),
                message: "must be nonzero".into(),
            });
        }
        if self.receipt_poll_ms == 0 || self.receipt_poll_attempts == 0 {
            return Err(AppError::Validation {
                field: "receipt_poll".into(),
                message: "poll interval and attempt ceiling must be nonzero".into(),
            });
        }
        Ok(())
    }
}
