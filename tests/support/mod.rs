// SPDX-License-Identifier: MIT
#![allow(dead_code)]

use alloy::primitives::{Address, B256, Bytes};
use alloy::rpc::types::eth::{Filter, FilterBlockOption, Log, TransactionReceipt};
use async_trait::async_trait;
use raid_sync::domain::error::AppError;
use raid_sync::network::chain::ChainApi;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted chain double: records every request and serves queued
/// outcomes in order.
#[derive(Default)]
pub struct MockChain {
    call_responses: Mutex<VecDeque<Result<Bytes, AppError>>>,
    log_responses: Mutex<VecDeque<Result<Vec<Log>, AppError>>>,
    pub calls: Mutex<Vec<(Address, Bytes)>>,
    pub windows: Mutex<Vec<(u64, u64)>>,
    pub receipt_polls: Mutex<usize>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_call(&self, response: Result<Bytes, AppError>) {
        self.call_responses.lock().unwrap().push_back(response);
    }

    pub fn push_logs(&self, response: Result<Vec<Log>, AppError>) {
        self.log_responses.lock().unwrap().push_back(response);
    }

    pub fn recorded_windows(&self) -> Vec<(u64, u64)> {
        self.windows.lock().unwrap().clone()
    }

    pub fn recorded_calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainApi for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError> {
        self.calls.lock().unwrap().push((to, data));
        self.call_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Rpc("unscripted eth_call".into())))
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, AppError> {
        let (from, to) = match filter.block_option {
            FilterBlockOption::Range {
                from_block,
                to_block,
            } => (
                from_block.and_then(|b| b.as_number()).unwrap_or_default(),
                to_block.and_then(|b| b.as_number()).unwrap_or_default(),
            ),
            FilterBlockOption::AtBlockHash(_) => (0, 0),
        };
        self.windows.lock().unwrap().push((from, to));
        self.log_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Rpc("unscripted eth_getLogs".into())))
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        Ok(0)
    }

    async fn receipt(&self, _hash: B256) -> Result<Option<TransactionReceipt>, AppError> {
        *self.receipt_polls.lock().unwrap() += 1;
        Ok(None)
    }
}

/// A log whose topic #1 carries `actor`, the shape the scanner extracts
/// from.
pub fn actor_log(actor: Address) -> Log {
    Log {
        inner: alloy::primitives::Log::new_unchecked(
            Address::ZERO,
            vec![B256::ZERO, actor.into_word()],
            Bytes::new(),
        ),
        ..Default::default()
    }
}
