//! Replication channel: the boundary that moves printer data and selection
//! requests between the phone (authoritative) and the watch (replica).

pub mod link;
pub mod session;

pub use link::{LinkError, MemoryLink, PhoneLink};
pub use session::SessionChannel;

use crate::model::ReplicaSnapshot;
use async_trait::async_trait;

/// The watch-side face of replication.
///
/// Consumers (the selection controller) never talk to the phone directly;
/// they read the last-known snapshot synchronously and ask the channel to
/// refresh or to propose a new default.
#[async_trait]
pub trait ReplicationChannel: Send + Sync {
    /// Last-known replica state. Synchronous; never triggers a remote call.
    fn current_snapshot(&self) -> ReplicaSnapshot;

    /// Round trip to the phone for a fresh record set. Returns when the
    /// round trip finishes, success and failure alike; failure is absorbed
    /// at this boundary and only shows up as "refresh finished".
    async fn request_refresh(&self);

    /// Ask the phone to change the default printer. Fire-and-forget: does
    /// not mutate the local store. If the phone accepts, the change arrives
    /// later through the normal notification path.
    fn propose_default(&self, printer_name: &str);
}
