//! Typed notifications between the grid and its collaborators.
//!
//! A component subscribes when it is constructed and holds on to its [`Subscription`]; when
//! the component is torn down the subscription drops and is removed from the channel.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use satchel_utils::CellPos;

use crate::item::ItemId;

/// Something that happened to, or around, the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// A new stack was created.
    ItemPlaced {
        /// The new item.
        item: ItemId,
        /// Its kind id.
        kind: String,
        /// Top-left cell of its footprint.
        origin: CellPos,
        /// Count it was created with.
        count: u32,
    },
    /// Items were merged into an existing stack.
    StackMerged {
        /// The stack that grew.
        item: ItemId,
        /// How many items were added.
        added: u32,
        /// The stack's new count.
        count: u32,
    },
    /// An acquisition found no room.
    AcquireRejected {
        /// The requested kind id.
        kind: String,
        /// The requested count.
        requested: u32,
    },
    /// A drag was committed.
    ItemMoved {
        /// The moved item.
        item: ItemId,
        /// The old origin.
        from: CellPos,
        /// The new origin.
        to: CellPos,
    },
    /// A drop was refused; the item stays where it was.
    MoveRejected {
        /// The item that was being dragged.
        item: ItemId,
        /// The refused origin, if a target was hovered at all.
        target: Option<CellPos>,
    },
    /// An item left the grid.
    ItemRemoved {
        /// The removed item.
        item: ItemId,
        /// Its kind id.
        kind: String,
        /// Its count when removed.
        count: u32,
    },
    /// The inventory panel was opened or closed.
    InventoryToggled {
        /// True when opened.
        open: bool,
    },
    /// The player started or stopped looking at something they can pick up.
    LootAvailabilityChanged {
        /// True when loot is in reach.
        available: bool,
    },
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: Vec<(u64, Sender<InventoryEvent>)>,
}

/// A many-subscriber channel of [`InventoryEvent`]s.
///
/// Cloning the channel yields another handle to the same subscriber list.
#[derive(Clone, Default)]
pub struct EventChannel {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl EventChannel {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Events published from now on are delivered to it.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = channel::unbounded();
        let mut subscribers = self.subscribers.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.push((id, sender));

        Subscription {
            id,
            channel: Arc::downgrade(&self.subscribers),
            receiver,
        }
    }

    /// Delivers `event` to every live subscriber, in subscription order.
    pub fn publish(&self, event: InventoryEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers
            .senders
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().senders.len()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// A live registration on an [`EventChannel`].
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: Weak<Mutex<Subscribers>>,
    receiver: Receiver<InventoryEvent>,
}

impl Subscription {
    /// Returns the next pending event without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<InventoryEvent> {
        self.receiver.try_recv().ok()
    }

    /// Takes every pending event.
    #[must_use]
    pub fn drain(&self) -> Vec<InventoryEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the underlying receiver, for use with `select!`.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<InventoryEvent> {
        &self.receiver
    }

    /// Explicitly unsubscribes. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.channel.upgrade() {
            subscribers
                .lock()
                .senders
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let channel = EventChannel::new();
        let first = channel.subscribe();
        let second = channel.subscribe();

        channel.publish(InventoryEvent::InventoryToggled { open: true });

        assert_eq!(
            first.try_recv(),
            Some(InventoryEvent::InventoryToggled { open: true })
        );
        assert_eq!(
            second.drain(),
            vec![InventoryEvent::InventoryToggled { open: true }]
        );
        assert_eq!(first.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel = EventChannel::new();
        let kept = channel.subscribe();
        let dropped = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 2);

        drop(dropped);
        assert_eq!(channel.subscriber_count(), 1);

        kept.unsubscribe();
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let channel = EventChannel::new();
        channel.publish(InventoryEvent::LootAvailabilityChanged { available: true });
        let late = channel.subscribe();
        assert!(late.drain().is_empty());
    }

    #[test]
    fn test_subscription_outlives_channel() {
        let channel = EventChannel::new();
        let subscription = channel.subscribe();
        channel.publish(InventoryEvent::InventoryToggled { open: false });
        drop(channel);

        assert_eq!(
            subscription.try_recv(),
            Some(InventoryEvent::InventoryToggled { open: false })
        );
        assert_eq!(subscription.try_recv(), None);
    }
}
