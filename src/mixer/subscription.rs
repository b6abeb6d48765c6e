//! Push subscription with periodic keepalive
//!
//! Consoles only push changes to clients that renewed their subscription
//! within the last ten seconds. The keepalive runs as its own task on a
//! fixed-period ticker and stops as soon as its cancel channel fires or is
//! dropped.

use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::receiver::{Receiver, UpdateCallback};
use super::Mixer;
use crate::error::Result;

/// Default subscribe command
pub const XREMOTE: &str = "/xremote";

/// Handle of a running keepalive task
pub(crate) struct Subscription {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Subscription {
    fn cancel(self) {
        let _ = self.cancel.send(());
        self.task.abort();
    }
}

/// Command that keeps a subscription alive
///
/// `/xremote` is renewed by repeating it; every other subscription uses `/renew`.
pub fn renew_command(command: &str) -> &'static str {
    if command == XREMOTE {
        XREMOTE
    } else {
        "/renew"
    }
}

impl Mixer {
    /// Subscribe to all console-side changes with `/xremote`
    pub async fn subscribe(&self, callback: UpdateCallback) -> Result<()> {
        self.subscribe_with(XREMOTE, callback).await
    }

    /// Subscribe with an arbitrary subscribe command
    ///
    /// Replaces an existing subscription. Returns once the subscribe command
    /// is sent; the keepalive keeps running in the background.
    pub async fn subscribe_with(&self, command: &str, callback: UpdateCallback) -> Result<()> {
        self.stop_keepalive();
        *self.inner.receiver.lock() = Receiver::Subscribed(callback);

        if let Err(e) = self.send(command, None).await {
            *self.inner.receiver.lock() = Receiver::default();
            return Err(e);
        }

        let renew = renew_command(command);
        let period = self.inner.settings.keepalive;
        let weak = Arc::downgrade(&self.inner);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = ticker.tick() => {
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        if let Err(e) = inner.send(renew, None).await {
                            warn!("Subscription renew failed: {}", e);
                        }
                    }
                }
            }
            debug!("Keepalive stopped");
        });

        *self.inner.subscription.lock() = Some(Subscription {
            cancel: cancel_tx,
            task,
        });
        info!("📡 Subscribed with {} (renew every {:?})", command, period);
        Ok(())
    }

    /// Stop the keepalive, tell the console and return to query mode
    pub async fn unsubscribe(&self) -> Result<()> {
        self.stop_keepalive();
        *self.inner.receiver.lock() = Receiver::default();
        self.send("/unsubscribe", None).await?;
        info!("Unsubscribed");
        Ok(())
    }

    fn stop_keepalive(&self) {
        let previous = self.inner.subscription.lock().take();
        if let Some(subscription) = previous {
            subscription.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renew_command() {
        assert_eq!(renew_command("/xremote"), "/xremote");
        assert_eq!(renew_command("/subscribe"), "/renew");
        assert_eq!(renew_command("/batchsubscribe"), "/renew");
    }
}
