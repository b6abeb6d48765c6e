//! Inbound message routing
//!
//! The receiver is in one of two modes. While idle, a single query waiter
//! may be armed and is completed by the first message carrying its address.
//! While subscribed, every state update is handed to the subscription
//! callback and no waiter can be armed.

use std::sync::Arc;
use tokio::sync::oneshot;

use crate::error::{MixerError, Result};
use crate::state::StateUpdate;
use crate::value::MixerValue;

/// Listener for mirror updates while a subscription is active
pub type UpdateCallback = Arc<dyn Fn(&StateUpdate) + Send + Sync>;

pub(crate) struct PendingQuery {
    address: String,
    tx: oneshot::Sender<Vec<MixerValue>>,
}

pub(crate) enum Receiver {
    Idle { waiter: Option<PendingQuery> },
    Subscribed(UpdateCallback),
}

impl Default for Receiver {
    fn default() -> Self {
        Receiver::Idle { waiter: None }
    }
}

impl Receiver {
    /// Arm a single-shot waiter for the next response on `address`
    ///
    /// Replaces any previously armed waiter.
    pub fn arm(&mut self, address: &str) -> Result<oneshot::Receiver<Vec<MixerValue>>> {
        match self {
            Receiver::Subscribed(_) => Err(MixerError::SubscriptionActive(address.to_string())),
            Receiver::Idle { waiter } => {
                let (tx, rx) = oneshot::channel();
                *waiter = Some(PendingQuery {
                    address: address.to_string(),
                    tx,
                });
                Ok(rx)
            }
        }
    }

    /// Drop the waiter for `address` if it is still armed
    pub fn disarm(&mut self, address: &str) {
        if let Receiver::Idle { waiter } = self {
            if waiter.as_ref().is_some_and(|w| w.address == address) {
                *waiter = None;
            }
        }
    }

    /// Route one inbound message
    ///
    /// Completes a matching waiter, or returns the subscription callback the
    /// caller should notify once the receiver lock is released.
    pub fn route(&mut self, address: &str, values: &[MixerValue]) -> Option<UpdateCallback> {
        match self {
            Receiver::Subscribed(callback) => Some(Arc::clone(callback)),
            Receiver::Idle { waiter } => {
                if waiter.as_ref().is_some_and(|w| w.address == address) {
                    if let Some(pending) = waiter.take() {
                        let _ = pending.tx.send(values.to_vec());
                    }
                }
                None
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self, Receiver::Subscribed(_))
    }
}
