//! Subscriber registry: fans out replica change notifications.
//!
//! Explicit subscriber handles rather than a broadcast channel so that
//! `unsubscribe` is synchronous with respect to any notifier: once it
//! returns, no further event reaches that subscriber's queue.

use crate::model::PrinterRecord;
use log::debug;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

/// A change to the replicated printer set, pushed to every subscriber.
#[derive(Debug, Clone)]
pub enum ReplicaEvent {
    /// The record set was replaced. Could be adds, updates or deletes; the
    /// subscriber is expected to re-read the snapshot wholesale.
    RecordsChanged,

    /// The default printer changed on the remote side. The snapshot already
    /// embeds the new default, so subscribers may treat this exactly like
    /// `RecordsChanged`.
    DefaultChanged(PrinterRecord),
}

/// Identifies one registered subscriber.
pub type SubscriberId = Uuid;

/// One subscriber's end of the registry: its id plus the event queue.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<ReplicaEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, in raise order. `None` once the registry dropped this
    /// subscriber's sender (i.e. after `unsubscribe`).
    pub async fn recv(&mut self) -> Option<ReplicaEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is
    /// queued right now.
    pub fn try_recv(&mut self) -> Option<ReplicaEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Registry of observers interested in replica changes.
///
/// Cheap to clone; the subscriber list is shared. Notification is
/// fire-and-forget: the list is copied under the lock, then each sender is
/// tried outside it, so a closed subscriber never blocks the rest.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    subscribers: Arc<Mutex<Vec<(SubscriberId, mpsc::UnboundedSender<ReplicaEvent>)>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and hands back its end of the queue.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.subscribers
            .lock()
            .expect("subscriber list lock poisoned")
            .push((id, sender));
        debug!("SubscriberRegistry: subscriber {} registered", id);
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Synchronous: once this returns, no notifier
    /// will hand another event to that subscriber's queue. Unknown ids are
    /// a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("subscriber list lock poisoned");
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        if subscribers.len() < before {
            debug!("SubscriberRegistry: subscriber {} removed", id);
        }
    }

    pub fn notify_records_changed(&self) {
        self.broadcast(ReplicaEvent::RecordsChanged);
    }

    pub fn notify_default_changed(&self, record: PrinterRecord) {
        self.broadcast(ReplicaEvent::DefaultChanged(record));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber list lock poisoned")
            .len()
    }

    fn broadcast(&self, event: ReplicaEvent) {
        // Copy the list, release the lock, then deliver. A subscriber that
        // went away is pruned afterwards; its failure never stops delivery
        // to the others.
        let targets: Vec<(SubscriberId, mpsc::UnboundedSender<ReplicaEvent>)> = self
            .subscribers
            .lock()
            .expect("subscriber list lock poisoned")
            .clone();

        let mut dead: Vec<SubscriberId> = Vec::new();
        for (id, sender) in &targets {
            if sender.send(event.clone()).is_err() {
                dead.push(*id);
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self
                .subscribers
                .lock()
                .expect("subscriber list lock poisoned");
            subscribers.retain(|(id, _)| !dead.contains(id));
            debug!("SubscriberRegistry: pruned {} dead subscriber(s)", dead.len());
        }
    }
}
