use crate::channel::{PhoneLink, ReplicationChannel};
use crate::model::{PrinterRecord, ReplicaSnapshot};
use crate::registry::SubscriberRegistry;
use crate::store::RecordStore;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// The concrete replication channel: one phone link feeding one record
/// store, with the registry fanning out every mutation.
///
/// Remote failures stop here. A failed refresh or rejected default proposal
/// is logged and otherwise invisible to consumers; they only ever see the
/// store change (or not) through the normal notification path.
#[derive(Clone)]
pub struct SessionChannel {
    link: Arc<dyn PhoneLink>,
    store: RecordStore,
    registry: SubscriberRegistry,
}

impl SessionChannel {
    pub fn new(link: Arc<dyn PhoneLink>, store: RecordStore, registry: SubscriberRegistry) -> Self {
        Self {
            link,
            store,
            registry,
        }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Push path: the phone sent a new record set on its own initiative.
    ///
    /// Replaces the store wholesale and notifies. When the default identity
    /// moved, `DefaultChanged` is raised alongside `RecordsChanged`, so a
    /// subscriber listening to either event alone stays correct.
    pub fn apply_remote_snapshot(&self, records: Vec<PrinterRecord>) {
        let previous_default = self
            .store
            .snapshot()
            .default_record()
            .map(|r| r.name().to_string());

        self.store.replace_all(records);
        info!(
            "SessionChannel: remote push applied, {} records",
            self.store.len()
        );
        self.registry.notify_records_changed();

        let snapshot = self.store.snapshot();
        if let Some(new_default) = snapshot.default_record() {
            if previous_default.as_deref() != Some(new_default.name()) {
                self.registry.notify_default_changed(new_default.clone());
            }
        }
    }
}

#[async_trait]
impl ReplicationChannel for SessionChannel {
    fn current_snapshot(&self) -> ReplicaSnapshot {
        self.store.snapshot()
    }

    async fn request_refresh(&self) {
        match self.link.fetch_printers().await {
            Ok(records) => {
                self.store.replace_all(records);
                info!(
                    "SessionChannel: refresh complete, {} records",
                    self.store.len()
                );
                self.registry.notify_records_changed();
            }
            Err(err) => {
                // Absorbed: the caller only learns "refresh finished".
                warn!("SessionChannel: refresh failed: {}", err);
            }
        }
    }

    fn propose_default(&self, printer_name: &str) {
        let link = Arc::clone(&self.link);
        let printer_name = printer_name.to_string();
        tokio::spawn(async move {
            if let Err(err) = link.push_default(&printer_name).await {
                warn!(
                    "SessionChannel: default proposal for '{}' failed: {}",
                    printer_name, err
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryLink;
    use crate::registry::ReplicaEvent;

    fn channel_with(link: MemoryLink) -> SessionChannel {
        SessionChannel::new(Arc::new(link), RecordStore::new(), SubscriberRegistry::new())
    }

    #[tokio::test]
    async fn refresh_fills_store_and_notifies() {
        let _ = env_logger::builder().is_test(true).try_init();

        let link = MemoryLink::new(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);
        let channel = channel_with(link);
        let mut sub = channel.registry().subscribe();

        channel.request_refresh().await;

        assert_eq!(channel.current_snapshot().len(), 2);
        assert!(matches!(
            sub.recv().await,
            Some(ReplicaEvent::RecordsChanged)
        ));
    }

    #[tokio::test]
    async fn failed_refresh_is_absorbed() {
        let _ = env_logger::builder().is_test(true).try_init();

        let link = MemoryLink::new(vec![PrinterRecord::new("Ender", 1, true)]);
        link.set_failing(true);
        let channel = channel_with(link);

        // Completes without surfacing an error; the store stays untouched.
        channel.request_refresh().await;
        assert!(channel.current_snapshot().is_empty());
    }

    #[tokio::test]
    async fn propose_default_does_not_touch_the_store() {
        let link = MemoryLink::new(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);
        let channel = channel_with(link.clone());
        channel.request_refresh().await;

        channel.propose_default("Prusa");
        tokio::task::yield_now().await;

        // The phone side moved, the local replica did not; it catches up on
        // the next refresh or push.
        assert_eq!(
            channel.current_snapshot().default_record().unwrap().name(),
            "Ender"
        );

        channel.request_refresh().await;
        assert_eq!(
            channel.current_snapshot().default_record().unwrap().name(),
            "Prusa"
        );
    }

    #[tokio::test]
    async fn remote_push_raises_default_changed_when_default_moved() {
        let channel = channel_with(MemoryLink::default());
        channel.apply_remote_snapshot(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);

        let mut sub = channel.registry().subscribe();
        channel.apply_remote_snapshot(vec![
            PrinterRecord::new("Ender", 1, false),
            PrinterRecord::new("Prusa", 2, true),
        ]);

        assert!(matches!(
            sub.recv().await,
            Some(ReplicaEvent::RecordsChanged)
        ));
        match sub.recv().await {
            Some(ReplicaEvent::DefaultChanged(record)) => assert_eq!(record.name(), "Prusa"),
            other => panic!("expected DefaultChanged, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn remote_push_with_same_default_raises_only_records_changed() {
        let channel = channel_with(MemoryLink::default());
        channel.apply_remote_snapshot(vec![PrinterRecord::new("Ender", 1, true)]);

        let mut sub = channel.registry().subscribe();
        channel.apply_remote_snapshot(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);

        assert!(matches!(
            sub.recv().await,
            Some(ReplicaEvent::RecordsChanged)
        ));
        // Nothing else queued.
        assert!(sub.try_recv().is_none());
    }
}
