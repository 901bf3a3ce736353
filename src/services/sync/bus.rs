// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants::ALL_CHANNELS;
use alloy::primitives::Address;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Payloads delivered on the bus. Core events are typed; feature-specific
/// payloads travel as JSON and are the embedder's business.
#[derive(Clone, Debug)]
pub enum BusEvent {
    /// Targeting state changed for `target`; `attackers` is the live
    /// intent count after the change.
    TargetSelection { target: Address, attackers: usize },
    /// A refresh task published a new snapshot under its key.
    Refreshed { key: String, payload: Value },
    Json(Value),
}

type Handler = Arc<dyn Fn(&BusEvent) + Send + Sync>;

/// Named-channel pub/sub with a reserved wildcard channel (`"*"`) that
/// receives every event. Handlers run synchronously on the emitting task,
/// outside the registry lock.
#[derive(Default)]
pub struct EventBus {
    channels: RwLock<HashMap<String, HashMap<u64, Handler>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `handler` on `channel`. The returned subscription is the
    /// capability to deregister; dropping it unsubscribes.
    pub fn subscribe(
        self: &Arc<Self>,
        channel: &str,
        handler: impl Fn(&BusEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(channel.to_string())
            .or_default()
            .insert(id, Arc::new(handler));
        Subscription {
            bus: Arc::downgrade(self),
            channel: channel.to_string(),
            id,
        }
    }

    /// Deliver `event` to every handler on `channel` and on the wildcard.
    pub fn emit(&self, channel: &str, event: &BusEvent) {
        let handlers: Vec<Handler> = {
            let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
            let mut handlers: Vec<Handler> = channels
                .get(channel)
                .map(|set| set.values().cloned().collect())
                .unwrap_or_default();
            if channel != ALL_CHANNELS
                && let Some(set) = channels.get(ALL_CHANNELS)
            {
                handlers.extend(set.values().cloned());
            }
            handlers
        };
        for handler in handlers {
            handler(event);
        }
    }

    fn unsubscribe(&self, channel: &str, id: u64) {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = channels.get_mut(channel) {
            set.remove(&id);
            if set.is_empty() {
                channels.remove(channel);
            }
        }
    }
}

/// Capability to deregister a bus handler.
pub struct Subscription {
    bus: Weak<EventBus>,
    channel: String,
    id: u64,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(&self.channel, self.id);
        }
    }
}
