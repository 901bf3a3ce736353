// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::time::current_unix_ms;
use crate::domain::constants::TARGETING_CHANNEL_PREFIX;
use crate::infrastructure::network::backend::{RemoteIntent, TargetingRemote};
use crate::services::sync::bus::{BusEvent, EventBus};
use alloy::primitives::Address;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{Duration, Instant, sleep};

/// What the attacker is preparing to do to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentKind {
    Strike,
}

impl IntentKind {
    fn as_str(self) -> &'static str {
        match self {
            IntentKind::Strike => "strike",
        }
    }

    // Unknown kinds from newer backends degrade to the only kind the
    // client acts on.
    fn parse(_s: &str) -> Self {
        IntentKind::Strike
    }
}

/// How far along the attacker is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentPhase {
    /// Browsing the target's defenses; lingers for minutes.
    Selecting,
    /// Strike transaction sent; transient marker measured in seconds.
    Committed,
}

impl IntentPhase {
    fn as_str(self) -> &'static str {
        match self {
            IntentPhase::Selecting => "selecting",
            IntentPhase::Committed => "committed",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "committed" => IntentPhase::Committed,
            _ => IntentPhase::Selecting,
        }
    }
}

/// A live "who is about to act on whom" record.
#[derive(Clone, Debug)]
pub struct TargetingIntent {
    pub target: Address,
    pub attacker: Address,
    pub kind: IntentKind,
    pub phase: IntentPhase,
    pub created_at: Instant,
    pub created_at_ms: u64,
}

impl TargetingIntent {
    fn horizon(&self, horizons: Horizons) -> Duration {
        match self.phase {
            IntentPhase::Selecting => horizons.selecting,
            IntentPhase::Committed => horizons.committed,
        }
    }

    fn expired(&self, horizons: Horizons) -> bool {
        self.created_at.elapsed() >= self.horizon(horizons)
    }

    fn to_remote(&self) -> RemoteIntent {
        RemoteIntent {
            target: self.target,
            attacker: self.attacker,
            kind: self.kind.as_str().to_string(),
            phase: self.phase.as_str().to_string(),
            created_at_ms: self.created_at_ms,
        }
    }
}

/// Per-phase TTLs.
#[derive(Clone, Copy, Debug)]
pub struct Horizons {
    pub selecting: Duration,
    pub committed: Duration,
}

struct Entry {
    intent: TargetingIntent,
    // Distinguishes replacements so a scheduled expiry never removes a
    // newer entry under the same (attacker, target) key.
    epoch: u64,
}

/// Channel carrying targeting changes for one defender.
pub fn targeting_channel(target: &Address) -> String {
    format!("{TARGETING_CHANNEL_PREFIX}:{target:#x}")
}

/// Ephemeral multi-writer ledger of in-flight targeting intents.
///
/// Local registrations are a responsiveness optimization; the backend
/// snapshot applied by [`TargetingLedger::reconcile`] is the eventual
/// source of truth.
pub struct TargetingLedger {
    entries: Mutex<HashMap<(Address, Address), Entry>>,
    horizons: Horizons,
    bus: Arc<EventBus>,
    remote: Arc<dyn TargetingRemote>,
    epoch: AtomicU64,
}

impl TargetingLedger {
    pub fn new(
        horizons: Horizons,
        bus: Arc<EventBus>,
        remote: Arc<dyn TargetingRemote>,
    ) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            horizons,
            bus,
            remote,
            epoch: AtomicU64::new(0),
        })
    }

    /// Record that `attacker` is moving against `target`, replacing any
    /// prior intent from the same pair. Schedules the intent's own expiry,
    /// announces the change on the target's channel and broadcasts it to
    /// the backend fire-and-forget.
    pub fn register(
        self: &Arc<Self>,
        target: Address,
        attacker: Address,
        kind: IntentKind,
        phase: IntentPhase,
    ) {
        let intent = TargetingIntent {
            target,
            attacker,
            kind,
            phase,
            created_at: Instant::now(),
            created_at_ms: current_unix_ms(),
        };
        let horizon = intent.horizon(self.horizons);
        let remote_intent = intent.to_remote();
        let epoch = self.next_epoch();

        {
            let mut entries = self.lock_entries();
            entries.insert((attacker, target), Entry { intent, epoch });
        }
        self.announce(target);
        self.schedule_expiry(target, attacker, epoch, horizon);

        let remote = self.remote.clone();
        tokio::spawn(async move {
            if let Err(e) = remote.broadcast(&remote_intent).await {
                tracing::debug!(target: "targeting", error = %e, "intent broadcast failed; relying on reconcile");
            }
        });
    }

    /// Drop the (attacker, target) intent on completion, cancellation or
    /// error, and re-announce the target's state.
    pub fn clear(&self, target: Address, attacker: Address) {
        let removed = {
            let mut entries = self.lock_entries();
            entries.remove(&(attacker, target)).is_some()
        };
        if removed {
            self.announce(target);
        }
    }

    /// Live intents against `target`. Expired entries are purged on read.
    pub fn get_attackers(&self, target: Address) -> Vec<TargetingIntent> {
        let mut entries = self.lock_entries();
        let horizons = self.horizons;
        entries.retain(|_, entry| !entry.intent.expired(horizons));
        entries
            .values()
            .filter(|entry| entry.intent.target == target)
            .map(|entry| entry.intent.clone())
            .collect()
    }

    /// Replace the ledger with the backend's authoritative snapshot,
    /// deduplicating on (attacker, target). Local optimistic entries not
    /// in the snapshot are superseded.
    pub fn reconcile(self: &Arc<Self>, snapshot: Vec<RemoteIntent>) {
        let now = Instant::now();
        let now_ms = current_unix_ms();
        let mut fresh: HashMap<(Address, Address), Entry> = HashMap::new();
        let mut expiries = Vec::new();

        for remote in snapshot {
            let key = (remote.attacker, remote.target);
            if fresh.contains_key(&key) {
                continue;
            }
            let age = Duration::from_millis(now_ms.saturating_sub(remote.created_at_ms));
            let intent = TargetingIntent {
                target: remote.target,
                attacker: remote.attacker,
                kind: IntentKind::parse(&remote.kind),
                phase: IntentPhase::parse(&remote.phase),
                created_at: now.checked_sub(age).unwrap_or(now),
                created_at_ms: remote.created_at_ms,
            };
            if intent.expired(self.horizons) {
                continue;
            }
            let epoch = self.next_epoch();
            let remaining = intent
                .horizon(self.horizons)
                .saturating_sub(intent.created_at.elapsed());
            expiries.push((remote.target, remote.attacker, epoch, remaining));
            fresh.insert(key, Entry { intent, epoch });
        }

        let affected: HashSet<Address> = {
            let mut entries = self.lock_entries();
            let mut targets: HashSet<Address> =
                entries.values().map(|entry| entry.intent.target).collect();
            targets.extend(fresh.values().map(|entry| entry.intent.target));
            *entries = fresh;
            targets
        };

        for (target, attacker, epoch, remaining) in expiries {
            self.schedule_expiry(target, attacker, epoch, remaining);
        }
        for target in affected {
            self.announce(target);
        }
    }

    fn schedule_expiry(
        self: &Arc<Self>,
        target: Address,
        attacker: Address,
        epoch: u64,
        horizon: Duration,
    ) {
        let ledger = self.clone();
        tokio::spawn(async move {
            sleep(horizon).await;
            let removed = {
                let mut entries = ledger.lock_entries();
                match entries.get(&(attacker, target)) {
                    Some(entry) if entry.epoch == epoch => {
                        entries.remove(&(attacker, target));
                        true
                    }
                    _ => false,
                }
            };
            if removed {
                ledger.announce(target);
            }
        });
    }

    fn announce(&self, target: Address) {
        let attackers = {
            let entries = self.lock_entries();
            let horizons = self.horizons;
            entries
                .values()
                .filter(|entry| {
                    entry.intent.target == target && !entry.intent.expired(horizons)
                })
                .count()
        };
        self.bus.emit(
            &targeting_channel(&target),
            &BusEvent::TargetSelection { target, attackers },
        );
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_entries(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<(Address, Address), Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
