// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::infrastructure::network::chain::ChainApi;
use alloy::primitives::{Address, B256};
use alloy::rpc::types::eth::{Filter, Log};
use std::collections::HashSet;
use std::sync::Arc;

/// A historical event-log discovery request over `[from_block, to_block]`
/// (inclusive). Chunking during execution is the scanner's business, not
/// part of the query value.
#[derive(Clone, Debug)]
pub struct LogQuery {
    pub address: Option<Address>,
    pub topic0: Option<B256>,
    /// Indexed-topic position carrying the actor address (1..=3).
    pub actor_topic: usize,
    pub from_block: u64,
    pub to_block: u64,
}

/// Addresses accumulated across chunks. Typed addresses are canonical by
/// construction, so value equality is the only dedup needed.
pub type DiscoveredSet = HashSet<Address>;

/// Walks a block range in bounded chunks, shrinking the window when the
/// provider rejects it as too wide.
pub struct LogScanner {
    chain: Arc<dyn ChainApi>,
    chunk_floor: u64,
}

impl LogScanner {
    pub fn new(chain: Arc<dyn ChainApi>, chunk_floor: u64) -> Self {
        Self {
            chain,
            chunk_floor: chunk_floor.max(1),
        }
    }

    /// Scan `[query.from_block, query.to_block]` in chunks of at most
    /// `max_chunk` blocks, collecting the actor address from each matching
    /// log's designated topic.
    ///
    /// A range rejection halves the chunk and retries the same
    /// `from_block`; any other error propagates. The chunk never shrinks
    /// below the configured floor: a rejection at the floor is terminal,
    /// so a hostile provider cannot pin us in a halving loop.
    pub async fn discover(
        &self,
        query: &LogQuery,
        max_chunk: u64,
    ) -> Result<DiscoveredSet, AppError> {
        let mut chunk = max_chunk.max(self.chunk_floor);
        let mut from = query.from_block;
        let mut found = DiscoveredSet::new();

        while from <= query.to_block {
            let to = query.to_block.min(from.saturating_add(chunk - 1));
            let filter = build_filter(query, from, to);

            match self.chain.get_logs(&filter).await {
                Ok(logs) => {
                    for log in &logs {
                        if let Some(actor) = extract_actor(log, query.actor_topic) {
                            found.insert(actor);
                        }
                    }
                    tracing::trace!(
                        target: "logs",
                        from, to,
                        matched = logs.len(),
                        discovered = found.len(),
                        "chunk scanned"
                    );
                    from = match to.checked_add(1) {
                        Some(next) => next,
                        None => break,
                    };
                }
                Err(err) if is_range_too_large_error(&err) => {
                    if chunk <= self.chunk_floor {
                        return Err(AppError::LogWindowExhausted {
                            floor: self.chunk_floor,
                            from_block: from,
                            to_block: to,
                        });
                    }
                    chunk = (chunk / 2).max(self.chunk_floor);
                    tracing::debug!(
                        target: "logs",
                        from, to, chunk,
                        "provider rejected window; shrinking and retrying same start"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(found)
    }
}

fn build_filter(query: &LogQuery, from: u64, to: u64) -> Filter {
    let mut filter = Filter::new().from_block(from).to_block(to);
    if let Some(address) = query.address {
        filter = filter.address(address);
    }
    if let Some(topic0) = query.topic0 {
        filter = filter.event_signature(topic0);
    }
    filter
}

fn extract_actor(log: &Log, actor_topic: usize) -> Option<Address> {
    let word = log.data().topics().get(actor_topic)?;
    Some(Address::from_word(*word))
}

/// Best-effort classification of "the requested log window is too wide".
///
/// Providers phrase this differently and none of it is typed, so this
/// matches known message fragments on the transport error text. Anything
/// not matched here is treated as a plain transport failure by callers.
pub fn is_range_too_large_error(err: &AppError) -> bool {
    let AppError::Rpc(message) = err else {
        return false;
    };
    let message = message.to_ascii_lowercase();
    const MARKERS: [&str; 6] = [
        "query returned more than",
        "response size exceeded",
        "block range",
        "range too large",
        "range too wide",
        "limit exceeded",
    ];
    MARKERS.iter().any(|marker| message.contains(marker))
}
