//! Mixer client - the stateful console connection
//!
//! A [`Mixer`] owns the state mirror, the rewrite map and the set of
//! tracked addresses for one console, and drives them through a
//! [`Transport`].
//!
//! ```text
//!  transport receive task ──► handle_message ──► SyncState::apply_update ──► StateMirror
//!                                   │
//!                                   └──► Receiver ──► query waiter | subscription callback
//! ```
//!
//! All methods take `&self`; the shared state sits behind `parking_lot`
//! mutexes that are never held across an `.await`.

mod receiver;
mod subscription;
mod sync;


use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{MixerError, Result};
use crate::profile::DeviceProfile;
use crate::transport::{MessageHandler, OscUdpTransport, Transport};
use crate::value::MixerValue;

pub use receiver::UpdateCallback;
use receiver::Receiver;
use subscription::Subscription;
use sync::SyncState;

/// Pause after every send, bounding the outbound rate
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(20);
/// How long `validate_connection` waits for the `/xinfo` reply
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
/// How long `query` waits for a reply once the send delay has passed
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(100);
/// Subscription renew period; consoles expire `/xremote` after 10 s
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(9);
/// Wait after a scene recall before the state is reloaded
pub const DEFAULT_SCENE_SETTLE: Duration = Duration::from_secs(1);

/// Connection and timing settings for one console
#[derive(Debug, Clone)]
pub struct MixerSettings {
    pub ip: String,
    pub port: u16,
    pub delay: Duration,
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
    pub keepalive: Duration,
    pub scene_settle: Duration,
}

impl MixerSettings {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
            delay: DEFAULT_SEND_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            keepalive: DEFAULT_KEEPALIVE,
            scene_settle: DEFAULT_SCENE_SETTLE,
        }
    }
}

/// Identity reported by the console in its `/xinfo` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixerInfo {
    pub ip: String,
    pub name: String,
    pub model: String,
    pub firmware: String,
}

impl MixerInfo {
    fn from_values(values: &[MixerValue]) -> Self {
        let field = |i: usize| {
            values
                .get(i)
                .map(|v| v.as_text().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_default()
        };
        Self {
            ip: field(0),
            name: field(1),
            model: field(2),
            firmware: field(3),
        }
    }
}

pub(crate) struct MixerInner {
    settings: MixerSettings,
    transport: Arc<dyn Transport>,
    sync: Mutex<SyncState>,
    receiver: Mutex<Receiver>,
    subscription: Mutex<Option<Subscription>>,
    info: RwLock<Option<MixerInfo>>,
}

impl MixerInner {
    /// Send one message, then pause for the configured delay
    pub(crate) async fn send(&self, address: &str, value: Option<MixerValue>) -> Result<()> {
        match &value {
            Some(v) => debug!("sending: {} {}", address, v),
            None => debug!("sending: {}", address),
        }
        self.transport.send(address, value).await?;
        tokio::time::sleep(self.settings.delay).await;
        Ok(())
    }

    /// Receipt path for every inbound message
    fn handle_message(&self, address: &str, values: &[MixerValue]) {
        debug!("received: {} {:?}", address, values);

        let updates = self.sync.lock().apply_update(address, values);
        let callback = self.receiver.lock().route(address, values);

        if let Some(callback) = callback {
            for update in &updates {
                callback(update);
            }
        }
    }
}

/// Stateful client for one console
#[derive(Clone)]
pub struct Mixer {
    inner: Arc<MixerInner>,
}

impl Mixer {
    /// Create a client over an existing transport
    ///
    /// Fails when no device ip is configured.
    pub fn new(settings: MixerSettings, profile: DeviceProfile, transport: Arc<dyn Transport>) -> Result<Self> {
        if settings.ip.trim().is_empty() {
            return Err(MixerError::Config("No valid ip detected".to_string()));
        }

        Ok(Self {
            inner: Arc::new(MixerInner {
                settings,
                transport,
                sync: Mutex::new(SyncState::new(profile)),
                receiver: Mutex::new(Receiver::default()),
                subscription: Mutex::new(None),
                info: RwLock::new(None),
            }),
        })
    }

    /// Create a client talking OSC over UDP to `settings.ip:settings.port`
    pub fn connect(settings: MixerSettings, profile: DeviceProfile) -> Result<Self> {
        let transport = Arc::new(OscUdpTransport::new(settings.ip.clone(), settings.port));
        Self::new(settings, profile, transport)
    }

    pub fn settings(&self) -> &MixerSettings {
        &self.inner.settings
    }

    /// Start the transport and validate the connection
    pub async fn startup(&self) -> Result<bool> {
        let weak = Arc::downgrade(&self.inner);
        let handler: MessageHandler = Arc::new(move |address: &str, values: &[MixerValue]| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_message(address, values);
            }
        });

        self.inner.transport.start(handler).await?;
        info!(
            "Mixer client started for {}:{}",
            self.inner.settings.ip, self.inner.settings.port
        );
        self.validate_connection().await
    }

    /// Ask the console to identify itself
    ///
    /// Returns `Ok(false)` when no reply arrives within the connect timeout.
    /// Like [`Mixer::query`], it fails with [`MixerError::SubscriptionActive`]
    /// while subscribed: the `/xinfo` reply would go to the subscription
    /// callback. Call [`Mixer::unsubscribe`] first.
    pub async fn validate_connection(&self) -> Result<bool> {
        let rx = self.inner.receiver.lock().arm("/xinfo")?;
        self.send("/xinfo", None).await?;

        match tokio::time::timeout(self.inner.settings.connect_timeout, rx).await {
            Ok(Ok(values)) => {
                let info = MixerInfo::from_values(&values);
                info!("✅ Connected to {} at {}", info.model, info.ip);
                *self.inner.info.write() = Some(info);
                Ok(true)
            }
            _ => {
                self.inner.receiver.lock().disarm("/xinfo");
                debug!("Failed to setup OSC connection to mixer. Please check for correct ip address.");
                Ok(false)
            }
        }
    }

    /// Stop the subscription (if any) and the transport
    pub async fn shutdown(&self) -> Result<bool> {
        if self.is_subscribed() {
            self.unsubscribe().await?;
        }
        self.inner.transport.shutdown().await?;
        info!("Mixer client shut down");
        Ok(true)
    }

    /// Send a raw message to the console
    pub async fn send(&self, address: &str, value: Option<MixerValue>) -> Result<()> {
        self.inner.send(address, value).await
    }

    /// Send a query and return the console's reply, if one arrives
    ///
    /// Fails with [`MixerError::SubscriptionActive`] while subscribed, since
    /// replies are then routed to the subscription callback.
    pub async fn query(&self, address: &str) -> Result<Option<Vec<MixerValue>>> {
        let rx = self.inner.receiver.lock().arm(address)?;
        if let Err(e) = self.send(address, None).await {
            self.inner.receiver.lock().disarm(address);
            return Err(e);
        }

        match tokio::time::timeout(self.inner.settings.query_timeout, rx).await {
            Ok(Ok(values)) => Ok(Some(values)),
            _ => {
                self.inner.receiver.lock().disarm(address);
                Ok(None)
            }
        }
    }

    /// Current value of one canonical key
    pub fn state(&self, key: &str) -> Option<MixerValue> {
        self.inner.sync.lock().mirror().get(key).cloned()
    }

    /// Copy of the whole mirror, sorted by key
    pub fn state_snapshot(&self) -> BTreeMap<String, MixerValue> {
        self.inner.sync.lock().mirror().snapshot()
    }

    /// Identity from the last successful `validate_connection`
    pub fn info(&self) -> Option<MixerInfo> {
        self.inner.info.read().clone()
    }

    pub fn profile(&self) -> DeviceProfile {
        self.inner.sync.lock().profile().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.receiver.lock().is_subscribed()
    }
}
