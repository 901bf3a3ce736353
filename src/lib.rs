// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

pub mod app;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Convenience re-exports for embedders.
pub use app::config::GlobalSettings;
pub use domain::error::AppError;
pub use infrastructure::network;
pub use services::sync;
pub use services::sync::SyncService;
