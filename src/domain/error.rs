// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    /// Transport-level RPC failure. The provider's message is preserved
    /// verbatim; `logs::is_range_too_large_error` classifies on it.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error(
        "Log window [{from_block}, {to_block}] rejected at the {floor}-block floor; giving up"
    )]
    LogWindowExhausted {
        floor: u64,
        from_block: u64,
        to_block: u64,
    },

    #[error("External API error: {provider} responded with {status}")]
    Api { provider: String, status: u16 },

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
