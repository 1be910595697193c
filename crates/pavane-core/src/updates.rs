//! Subscription to server-side change events.

use std::sync::Arc;

use pavane_proto::{Command, SubscriptionMask};
use tokio::sync::{Mutex, mpsc};

use crate::{client::Client, error::ClientError};

/// Shared handle on the client's update stream.
///
/// The underlying channel holds at most one notification: bursts coalesce
/// and extra events are dropped on purpose, since a consumer re-queries
/// whatever server state it cares about anyway. Clones share the one
/// receiver; each notification is observed by exactly one waiter.
#[derive(Clone)]
pub struct UpdateStream {
    receiver: Arc<Mutex<mpsc::Receiver<()>>>,
}

impl UpdateStream {
    pub(crate) fn new(receiver: Arc<Mutex<mpsc::Receiver<()>>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change notification.
    ///
    /// Returns `None` once the client has been dropped.
    pub async fn recv(&self) -> Option<()> {
        self.receiver.lock().await.recv().await
    }
}

impl Client {
    /// Subscribe to configuration updates on the server (all event
    /// categories) and return the update stream.
    ///
    /// Events carry no payload; receipt of one means "something changed,
    /// re-query what you need".
    pub async fn updates(&self) -> Result<UpdateStream, ClientError> {
        self.request_with(Command::Subscribe, |w| w.put_u32(SubscriptionMask::ALL.bits()))
            .await?;
        Ok(UpdateStream::new(self.updates_receiver()))
    }
}
