// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::infrastructure::network::provider::HttpProvider;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{Filter, Log, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Read-only chain access for the sync layer.
///
/// Implementations surface transport failures with the provider's message
/// preserved verbatim and never retry; retry policy belongs to callers,
/// because only they know what counts as retryable for their use case.
#[async_trait]
pub trait ChainApi: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError>;
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, AppError>;
    async fn block_number(&self) -> Result<u64, AppError>;
    async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, AppError>;
}

pub struct ChainReader {
    provider: HttpProvider,
}

impl ChainReader {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }
}

/// Best-effort receipt wait: poll at a fixed cadence and give up with
/// `Ok(None)` once the attempt ceiling is reached. A transport failure
/// mid-poll propagates instead of burning the remaining attempts.
pub async fn wait_for_receipt(
    chain: &dyn ChainApi,
    hash: B256,
    poll: Duration,
    attempts: u32,
) -> Result<Option<TransactionReceipt>, AppError> {
    for attempt in 1..=attempts {
        if let Some(receipt) = chain.receipt(hash).await? {
            return Ok(Some(receipt));
        }
        tracing::trace!(target: "chain", %hash, attempt, "receipt not yet available");
        if attempt < attempts {
            sleep(poll).await;
        }
    }
    tracing::debug!(target: "chain", %hash, "gave up waiting for receipt");
    Ok(None)
}

#[async_trait]
impl ChainApi for ChainReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, AppError> {
        self.provider
            .get_logs(filter)
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))
    }

    async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, AppError> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))
    }
}
