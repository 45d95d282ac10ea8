//! Subscriber groups and per-subscriber delivery.
//!
//! A [`SubscriberGroup`] holds every subscriber of one tier. Fan-out takes
//! a snapshot of the membership, attempts one non-blocking delivery per
//! member, and only afterwards removes the members whose delivery failed.
//! Concurrent joins and leaves never observe a half-iterated set, and one
//! dead or slow subscriber never stops delivery to the rest.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hazard_types::{AlertPayload, SubscriberId, Tier};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

/// Why a single delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The receiving end is gone.
    #[error("subscriber closed")]
    Closed,

    /// The subscriber's buffer is full.
    #[error("subscriber is not keeping up")]
    Lagging,
}

/// Anything that can receive alert payloads.
///
/// Implementations must not block; a subscriber that cannot accept a
/// payload right now should fail and will be pruned.
pub trait Subscriber: Send + Sync + fmt::Debug {
    /// Attempt to hand over one payload.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the payload could not be accepted.
    fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError>;
}

/// Subscriber backed by a bounded channel, typically drained by a
/// WebSocket writer.
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    tx: mpsc::Sender<AlertPayload>,
}

impl ChannelSubscriber {
    /// Wrap a sender.
    pub const fn new(tx: mpsc::Sender<AlertPayload>) -> Self {
        Self { tx }
    }

    /// Create a subscriber and the receiver that drains it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AlertPayload>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        self.tx.try_send(payload.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Successful deliveries.
    pub delivered: usize,
    /// Members removed because delivery failed.
    pub pruned: usize,
}

/// The members of one tier.
#[derive(Debug)]
pub struct SubscriberGroup {
    tier: Tier,
    members: RwLock<BTreeMap<SubscriberId, Arc<dyn Subscriber>>>,
}

impl SubscriberGroup {
    /// Create an empty group for `tier`.
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            members: RwLock::new(BTreeMap::new()),
        }
    }

    /// The tier this group serves.
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Add a subscriber and return its id.
    pub async fn add(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId::new();
        self.members.write().await.insert(id, subscriber);
        debug!(tier = self.tier.as_str(), subscriber = %id, "Subscriber joined");
        id
    }

    /// Register a channel-backed subscriber.
    pub async fn subscribe(&self, capacity: usize) -> (SubscriberId, mpsc::Receiver<AlertPayload>) {
        let (subscriber, rx) = ChannelSubscriber::channel(capacity);
        let id = self.add(Arc::new(subscriber)).await;
        (id, rx)
    }

    /// Remove a subscriber. Returns whether it was still a member.
    pub async fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.members.write().await.remove(&id).is_some();
        if removed {
            debug!(tier = self.tier.as_str(), subscriber = %id, "Subscriber left");
        }
        removed
    }

    /// Current member count.
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Whether the group has no members.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Deliver `payload` to every member and prune the ones that fail.
    pub async fn broadcast(&self, payload: &AlertPayload) -> FanOut {
        let snapshot: Vec<(SubscriberId, Arc<dyn Subscriber>)> = self
            .members
            .read()
            .await
            .iter()
            .map(|(id, sub)| (*id, Arc::clone(sub)))
            .collect();

        let mut failed = Vec::new();
        let mut delivered: usize = 0;
        for (id, subscriber) in &snapshot {
            match subscriber.deliver(payload) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(e) => {
                    debug!(tier = self.tier.as_str(), subscriber = %id, error = %e, "Delivery failed");
                    failed.push(*id);
                }
            }
        }

        let mut pruned: usize = 0;
        if !failed.is_empty() {
            let mut members = self.members.write().await;
            for id in &failed {
                if members.remove(id).is_some() {
                    pruned = pruned.saturating_add(1);
                }
            }
            info!(tier = self.tier.as_str(), pruned, "Pruned dead subscribers");
        }

        FanOut { delivered, pruned }
    }
}

/// The three disjoint tier groups.
#[derive(Debug, Clone)]
pub struct TierGroups {
    /// Monitor tier.
    pub monitor: Arc<SubscriberGroup>,
    /// Authority tier.
    pub authority: Arc<SubscriberGroup>,
    /// Civilian tier.
    pub civilian: Arc<SubscriberGroup>,
}

impl TierGroups {
    /// Three empty groups.
    pub fn new() -> Self {
        Self {
            monitor: Arc::new(SubscriberGroup::new(Tier::Monitor)),
            authority: Arc::new(SubscriberGroup::new(Tier::Authority)),
            civilian: Arc::new(SubscriberGroup::new(Tier::Civilian)),
        }
    }

    /// The group for `tier`.
    pub const fn get(&self, tier: Tier) -> &Arc<SubscriberGroup> {
        match tier {
            Tier::Monitor => &self.monitor,
            Tier::Authority => &self.authority,
            Tier::Civilian => &self.civilian,
        }
    }

    /// Member count per tier.
    pub async fn counts(&self) -> BTreeMap<Tier, usize> {
        let mut counts = BTreeMap::new();
        for tier in Tier::ALL {
            counts.insert(tier, self.get(tier).len().await);
        }
        counts
    }
}

impl Default for TierGroups {
    fn default() -> Self {
        Self::new()
    }
}
