//! Collision event channels.
//!
//! A controller owns three channels. Every resolved hit is delivered to
//! [`CollisionChannel::Any`] and then to the channel of its axis, so `Any`
//! may fire twice in one move. Delivery is synchronous and in subscription
//! order; nothing is queued across steps.

use std::fmt;

use crate::collision::HitRecord;

/// Error type subscribers may return.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// A collision callback.
pub type CollisionSubscriber = Box<dyn FnMut(&HitRecord) -> Result<(), SubscriberError>>;

/// The three broadcast channels of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionChannel {
    /// Any resolved hit, horizontal or vertical.
    Any,
    /// Hits that stopped horizontal movement.
    Horizontal,
    /// Hits that clamped vertical movement.
    Vertical,
}

/// Token returned by [`CollisionEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber lists for the three channels.
#[derive(Default)]
pub struct CollisionEvents {
    any: Vec<(SubscriptionId, CollisionSubscriber)>,
    horizontal: Vec<(SubscriptionId, CollisionSubscriber)>,
    vertical: Vec<(SubscriptionId, CollisionSubscriber)>,
    next_id: u64,
}

impl CollisionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback on a channel.
    pub fn subscribe<F>(&mut self, channel: CollisionChannel, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&HitRecord) -> Result<(), SubscriberError> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.list_mut(channel).push((id, Box::new(subscriber)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in [&mut self.any, &mut self.horizontal, &mut self.vertical] {
            if let Some(index) = list.iter().position(|(sub, _)| *sub == id) {
                drop(list.remove(index));
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, channel: CollisionChannel) -> usize {
        match channel {
            CollisionChannel::Any => self.any.len(),
            CollisionChannel::Horizontal => self.horizontal.len(),
            CollisionChannel::Vertical => self.vertical.len(),
        }
    }

    /// Deliver a hit to every subscriber of a channel.
    ///
    /// A subscriber returning an error is logged and skipped; the remaining
    /// subscribers still run. Returns the number of failures.
    pub fn emit(&mut self, channel: CollisionChannel, record: &HitRecord) -> usize {
        let mut failures = 0;
        for (id, subscriber) in self.list_mut(channel).iter_mut() {
            if let Err(err) = subscriber(record) {
                failures += 1;
                log::warn!("{channel:?} collision subscriber {id:?} failed: {err}");
            }
        }
        failures
    }

    fn list_mut(
        &mut self,
        channel: CollisionChannel,
    ) -> &mut Vec<(SubscriptionId, CollisionSubscriber)> {
        match channel {
            CollisionChannel::Any => &mut self.any,
            CollisionChannel::Horizontal => &mut self.horizontal,
            CollisionChannel::Vertical => &mut self.vertical,
        }
    }
}

impl fmt::Debug for CollisionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionEvents")
            .field("any", &self.any.len())
            .field("horizontal", &self.horizontal.len())
            .field("vertical", &self.vertical.len())
            .finish()
    }
}
