use crate::display::{PrinterDisplay, VisibilityHost};
use log::{debug, info};
use replica_core::channel::ReplicationChannel;
use replica_core::model::PrinterRecord;
use replica_core::registry::{ReplicaEvent, SubscriberRegistry, Subscription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Messages posted onto the controller's own queue.
///
/// Background work never touches controller state directly; it completes by
/// sending one of these, and the controller picks it up on its next turn.
#[derive(Debug)]
enum ControllerMsg {
    RefreshFinished,
}

enum Turn {
    Replica(ReplicaEvent),
    Local(ControllerMsg),
    Closed,
}

/// Keeps the displayed printer list, and the default selection within it,
/// synchronized with the replicated record set.
///
/// Lifecycle is `Inactive -> Active -> Inactive`, re-entrant: `activate`
/// subscribes to the registry and recomputes the view, `deactivate`
/// unsubscribes. All state lives on whichever single context owns the
/// controller; the only suspension is the refresh round trip, whose
/// completion is marshaled back through the message queue.
pub struct SelectionController<D: PrinterDisplay> {
    channel: Arc<dyn ReplicationChannel>,
    registry: SubscriberRegistry,
    display: D,
    visibility: Arc<dyn VisibilityHost>,

    // The last-rendered sorted sequence. Derived from the latest snapshot
    // (or, transiently, from an optimistic local selection); never persisted.
    rendered: Vec<PrinterRecord>,
    refreshing: bool,
    subscription: Option<Subscription>,

    msg_tx: mpsc::UnboundedSender<ControllerMsg>,
    msg_rx: mpsc::UnboundedReceiver<ControllerMsg>,
}

impl<D: PrinterDisplay> SelectionController<D> {
    pub fn new(
        channel: Arc<dyn ReplicationChannel>,
        registry: SubscriberRegistry,
        display: D,
        visibility: Arc<dyn VisibilityHost>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            channel,
            registry,
            display,
            visibility,
            rendered: Vec::new(),
            refreshing: false,
            subscription: None,
            msg_tx,
            msg_rx,
        }
    }

    /// Subscribe and render. The initial recomputation covers anything that
    /// changed in the replica while the controller was inactive.
    pub fn activate(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        self.subscription = Some(self.registry.subscribe());
        info!("SelectionController: activated");
        self.recompute_view();
    }

    /// Unsubscribe. Synchronous: once this returns, the registry hands no
    /// further event to this controller. An in-flight refresh keeps
    /// running; its completion message waits in the queue until the next
    /// active turn and never touches the display while inactive.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.registry.unsubscribe(subscription.id());
            info!("SelectionController: deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// The last-rendered sorted sequence.
    pub fn rendered(&self) -> &[PrinterRecord] {
        &self.rendered
    }

    /// Index of the rendered record currently marked default, if any.
    pub fn default_index(&self) -> Option<usize> {
        self.rendered.iter().position(|r| r.is_default())
    }

    /// The record set was replaced; re-read and re-render wholesale.
    pub fn on_records_changed(&mut self) {
        debug!("SelectionController: records changed");
        self.recompute_view();
    }

    /// Treated identically to a records change: the snapshot already embeds
    /// the new default, so both notifications converge on the same full
    /// recomputation.
    pub fn on_default_changed(&mut self, _new_default: PrinterRecord) {
        debug!("SelectionController: default changed");
        self.recompute_view();
    }

    /// User tapped row `index` of the rendered list.
    ///
    /// `index` must be within the last-rendered sequence; anything else
    /// means the display and the model desynchronized, which is a
    /// programming error, not a recoverable condition.
    pub fn select_record(&mut self, index: usize) {
        assert!(
            index < self.rendered.len(),
            "selection index {} outside rendered sequence of {} rows",
            index,
            self.rendered.len()
        );
        let name = self.rendered[index].name().to_string();
        info!("SelectionController: selecting printer '{}'", name);
        self.channel.propose_default(&name);

        // Optimistic: show the new default immediately. A later
        // notification whose snapshot disagrees silently overrides this.
        for record in self.rendered.iter_mut() {
            let is_selected = record.name() == name;
            record.set_default(is_selected);
        }
        self.push_to_display();
    }

    /// Kick off a phone round trip for a fresh record set.
    ///
    /// Guarded by the in-flight flag: a second call while one refresh is
    /// running issues nothing (no queueing, no coalescing). The affordance
    /// stays disabled until the round trip drains, however long that takes.
    pub fn force_refresh(&mut self) {
        if self.refreshing {
            debug!("SelectionController: refresh already in flight, ignoring");
            return;
        }
        self.refreshing = true;
        self.display.set_refresh_affordance_enabled(false);

        let channel = Arc::clone(&self.channel);
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            channel.request_refresh().await;
            // Send fails only if the controller itself is gone.
            let _ = msg_tx.send(ControllerMsg::RefreshFinished);
        });
    }

    /// Handle the next subscription event or internal message. Returns
    /// `false` once the controller is inactive.
    ///
    /// This queue IS the controller's single-threaded context: everything
    /// that mutates state funnels through here or through the direct
    /// user-action methods, never from a background task.
    pub async fn process_next(&mut self) -> bool {
        let turn = {
            let Some(subscription) = self.subscription.as_mut() else {
                return false;
            };
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => Turn::Replica(event),
                    None => Turn::Closed,
                },
                Some(msg) = self.msg_rx.recv() => Turn::Local(msg),
            }
        };
        match turn {
            Turn::Replica(ReplicaEvent::RecordsChanged) => self.on_records_changed(),
            Turn::Replica(ReplicaEvent::DefaultChanged(record)) => self.on_default_changed(record),
            Turn::Local(ControllerMsg::RefreshFinished) => self.handle_refresh_finished(),
            Turn::Closed => {
                // Registry side went away; treat as deactivation.
                self.subscription = None;
                return false;
            }
        }
        true
    }

    /// Drive the controller until it is deactivated.
    pub async fn run(&mut self) {
        while self.process_next().await {}
    }

    fn handle_refresh_finished(&mut self) {
        self.refreshing = false;
        debug!("SelectionController: refresh finished");
        if self.is_active() {
            self.display.set_refresh_affordance_enabled(true);
        }
    }

    /// Re-read the snapshot wholesale, sort it, and (if visible) push it to
    /// the display. The internal sequence updates regardless of visibility;
    /// only the display push is gated.
    fn recompute_view(&mut self) {
        let mut records = self.channel.current_snapshot().into_records();
        records.sort_by(|a, b| a.display_cmp(b));
        self.rendered = records;
        self.push_to_display();
    }

    fn push_to_display(&mut self) {
        if !self.visibility.is_currently_visible() {
            debug!("SelectionController: skipping display update, view not visible");
            return;
        }

        let empty = self.rendered.is_empty();
        self.display.set_awaiting_sync_indicator(empty);
        self.display.set_refresh_affordance_visible(!empty);

        self.display.set_row_count(self.rendered.len());
        for (index, record) in self.rendered.iter().enumerate() {
            self.display.set_row_label(index, record.name());
            self.display.set_row_checkmark(index, record.is_default());
        }
    }
}
