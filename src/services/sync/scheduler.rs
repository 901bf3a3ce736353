// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::services::sync::bus::{BusEvent, EventBus, Subscription};
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle passed to every refresh invocation, carrying the generation
/// captured at dispatch time.
#[derive(Clone)]
pub struct RefreshTick {
    key: Arc<str>,
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl RefreshTick {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Staleness fence: true only while this invocation is still the most
    /// recent one dispatched for its key. A body that awaited the network
    /// must check this before publishing or mutating shared state, so an
    /// older, slower request can never overwrite a newer, faster one.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

struct TaskEntry {
    counter: Arc<AtomicU64>,
    cancel: CancellationToken,
}

/// Keyed polling engine. One logical task per key; restarting a key
/// replaces its task, and every invocation gets a [`RefreshTick`] fence.
pub struct RefreshScheduler {
    tasks: DashMap<String, TaskEntry>,
    bus: Arc<EventBus>,
}

impl RefreshScheduler {
    pub fn new(bus: Arc<EventBus>) -> Arc<Self> {
        Arc::new(Self {
            tasks: DashMap::new(),
            bus,
        })
    }

    /// Start (or replace) the task under `key`: run `body` immediately,
    /// then every `interval`. Invocations are spawned as their own tasks,
    /// so a slow body never delays the next tick; ticks are dispatched in
    /// order but may complete out of order, and the tick fence is the only
    /// ordering guarantee on applied results.
    pub fn start<F, Fut>(&self, key: &str, interval: Duration, body: F)
    where
        F: Fn(RefreshTick) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop(key);

        let counter = Arc::new(AtomicU64::new(0));
        let cancel = CancellationToken::new();
        self.tasks.insert(
            key.to_string(),
            TaskEntry {
                counter: counter.clone(),
                cancel: cancel.clone(),
            },
        );

        let key: Arc<str> = Arc::from(key);
        let body = Arc::new(body);
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(target: "refresh", key = %key, "task cancelled");
                        return;
                    }
                    _ = ticker.tick() => {
                        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        let tick = RefreshTick {
                            key: key.clone(),
                            generation,
                            counter: counter.clone(),
                        };
                        let body = body.clone();
                        tokio::spawn(async move { (*body)(tick).await });
                    }
                }
            }
        });
    }

    /// Cancel the keyed task. In-flight invocations are not aborted; the
    /// generation bump makes their fence checks fail instead, so results
    /// arriving after logical cancellation are discarded by their owners.
    pub fn stop(&self, key: &str) {
        if let Some((_, entry)) = self.tasks.remove(key) {
            entry.cancel.cancel();
            entry.counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn subscribe(
        &self,
        channel: &str,
        handler: impl Fn(&BusEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.subscribe(channel, handler)
    }

    pub fn emit(&self, channel: &str, event: &BusEvent) {
        self.bus.emit(channel, event);
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    /// Wrap `action` so a burst of triggers collapses into one run,
    /// `delay` after the last trigger.
    pub fn debounce<F, Fut>(&self, delay: Duration, action: F) -> Debouncer
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Debouncer::new(delay, action)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().cancel.cancel();
        }
    }
}

type DebouncedAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Collapses a burst of triggers into a single action, re-timed from the
/// most recent trigger.
pub struct Debouncer {
    delay: Duration,
    action: DebouncedAction,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(action()) }),
            pending: Mutex::new(None),
        }
    }

    /// Arm (or re-arm) the timer; the action runs once the quiet period
    /// elapses without another trigger.
    pub fn trigger(&self) {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let action = self.action.clone();
        let delay = self.delay;
        *slot = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            action().await;
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.take() {
            pending.abort();
        }
    }
}
