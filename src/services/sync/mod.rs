// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

pub mod bus;
pub mod scheduler;
pub mod targeting;

use crate::app::config::GlobalSettings;
use crate::domain::error::AppError;
use crate::infrastructure::network::backend::{BackendClient, TargetingRemote};
use crate::infrastructure::network::chain::{self, ChainApi, ChainReader};
use crate::infrastructure::network::logs::LogScanner;
use crate::infrastructure::network::multicall::BatchAggregator;
use crate::infrastructure::network::provider::ConnectionFactory;
use bus::EventBus;
use scheduler::RefreshScheduler;
use std::sync::Arc;
use std::time::Duration;
use targeting::{Horizons, TargetingLedger};

pub const RECONCILE_TASK_KEY: &str = "targeting-reconcile";

/// The sync layer, wired. Explicitly constructed with injected settings;
/// callers receive an instance rather than importing a shared global.
pub struct SyncService {
    pub settings: GlobalSettings,
    pub reader: Arc<ChainReader>,
    pub aggregator: Arc<BatchAggregator>,
    pub scanner: Arc<LogScanner>,
    pub scheduler: Arc<RefreshScheduler>,
    pub ledger: Arc<TargetingLedger>,
    pub backend: Arc<BackendClient>,
}

impl SyncService {
    pub fn new(settings: GlobalSettings) -> Result<Self, AppError> {
        settings.validate()?;

        let provider = ConnectionFactory::from_settings(&settings)?;
        let reader = Arc::new(ChainReader::new(provider));
        let chain: Arc<dyn ChainApi> = reader.clone();

        let backend = Arc::new(BackendClient::new(
            settings.backend_base_url.clone(),
            Duration::from_millis(settings.backend_timeout_ms),
        ));

        let bus = EventBus::new();
        let scheduler = RefreshScheduler::new(bus.clone());
        let ledger = TargetingLedger::new(
            Horizons {
                selecting: Duration::from_secs(settings.selecting_horizon_secs),
                committed: Duration::from_secs(settings.committed_horizon_secs),
            },
            bus,
            backend.clone(),
        );

        Ok(Self {
            aggregator: Arc::new(BatchAggregator::new(
                chain.clone(),
                settings.multicall_address,
            )),
            scanner: Arc::new(LogScanner::new(chain, settings.log_chunk_floor)),
            settings,
            reader,
            scheduler,
            ledger,
            backend,
        })
    }

    /// Poll for a transaction receipt at the configured cadence, giving up
    /// after the configured attempt ceiling.
    pub async fn wait_for_receipt(
        &self,
        hash: alloy::primitives::B256,
    ) -> Result<Option<alloy::rpc::types::eth::TransactionReceipt>, AppError> {
        chain::wait_for_receipt(
            self.reader.as_ref(),
            hash,
            Duration::from_millis(self.settings.receipt_poll_ms),
            self.settings.receipt_poll_attempts,
        )
        .await
    }

    /// Register the periodic backend reconcile task. The body fetches the
    /// authoritative snapshot and applies it only if its tick is still
    /// current; a failed fetch skips the cycle and keeps local state.
    pub fn spawn_targeting_reconciler(&self) {
        let ledger = self.ledger.clone();
        let remote: Arc<dyn TargetingRemote> = self.backend.clone();
        self.scheduler.start(
            RECONCILE_TASK_KEY,
            Duration::from_millis(self.settings.reconcile_interval_ms),
            move |tick| {
                let ledger = ledger.clone();
                let remote = remote.clone();
                async move {
                    let snapshot = match remote.snapshot().await {
                        Ok(snapshot) => snapshot,
                        Err(e) => {
                            tracing::debug!(
                                target: "targeting",
                                error = %e,
                                "reconcile snapshot fetch failed; keeping local state"
                            );
                            return;
                        }
                    };
                    if !tick.is_current() {
                        return;
                    }
                    ledger.reconcile(snapshot);
                }
            },
        );
    }
}
