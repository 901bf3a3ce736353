// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// =============================================================================
// CHAIN CONSTANTS
// =============================================================================

// Canonical Multicall3 deployment; same address on every chain we target.
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

// =============================================================================
// LOG DISCOVERY
// =============================================================================

pub const DEFAULT_LOG_CHUNK: u64 = 4_500;
// Never shrink a rejected window below this; a rejection at the floor is
// terminal rather than an unbounded halving loop.
pub const DEFAULT_LOG_CHUNK_FLOOR: u64 = 64;

// =============================================================================
// REFRESH & POLLING CADENCE
// =============================================================================

pub const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 20_000;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 4_000;
pub const DEFAULT_RECEIPT_POLL_ATTEMPTS: u32 = 45;
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// TARGETING HORIZONS
// =============================================================================

// "Currently selecting" markers linger for minutes; committed strikes are
// transient and fall out within seconds.
pub const DEFAULT_SELECTING_HORIZON_SECS: u64 = 120;
pub const DEFAULT_COMMITTED_HORIZON_SECS: u64 = 15;

// =============================================================================
// EVENT BUS
// =============================================================================

// Reserved channel receiving every event regardless of name.
pub const ALL_CHANNELS: &str = "*";
pub const TARGETING_CHANNEL_PREFIX: &str = "targeting";

// =============================================================================
// LOGGING DEFAULTS
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
