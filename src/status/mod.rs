//! One-way status reporting from components to the host.
//!
//! Components push fatal events they cannot return to a caller, typically
//! failures of background tasks that already escaped the caller's stack.
//! Delivery is fire-and-forget: no response is expected and a full or
//! closed channel drops the event after logging it.


#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::error;

use crate::constants::STATUS_CHANNEL_CAPACITY;
use crate::ComponentId;
use crate::Error;

#[derive(Debug)]
pub enum StatusEvent {
    /// The component is no longer functional and will not recover on its own
    FatalError { component: ComponentId, error: Error },
}

#[cfg_attr(test, automock)]
pub trait StatusReporter: Send + Sync + 'static {
    fn report_fatal(
        &self,
        component: ComponentId,
        error: Error,
    );
}

/// [`StatusReporter`] backed by a bounded mpsc channel
#[derive(Debug, Clone)]
pub struct ChannelStatusReporter {
    tx: mpsc::Sender<StatusEvent>,
}

/// Creates a reporter and the receiving end the host listens on
pub fn status_channel() -> (ChannelStatusReporter, mpsc::Receiver<StatusEvent>) {
    status_channel_with_capacity(STATUS_CHANNEL_CAPACITY)
}

pub fn status_channel_with_capacity(
    capacity: usize
) -> (ChannelStatusReporter, mpsc::Receiver<StatusEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelStatusReporter { tx }, rx)
}

impl StatusReporter for ChannelStatusReporter {
    fn report_fatal(
        &self,
        component: ComponentId,
        error: Error,
    ) {
        error!("[{}] fatal: {}", component, error);

        match self.tx.try_send(StatusEvent::FatalError { component, error }) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                error!("status channel full, dropping event: {:?}", event);
            }
            Err(TrySendError::Closed(event)) => {
                error!("status channel closed, dropping event: {:?}", event);
            }
        }
    }
}
