//! Datagram transport seam
//!
//! The sync engine only needs fire-and-forget sends and a receipt callback.
//! [`OscUdpTransport`] implements this over UDP with `rosc` doing the OSC
//! encoding; tests plug in an in-memory console instead.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::value::MixerValue;

pub mod osc;

#[cfg(test)]
pub mod mock;

pub use osc::OscUdpTransport;

/// Receipt callback: `(address, values)` for every inbound message
///
/// Called synchronously from the transport's receive task.
pub type MessageHandler = Arc<dyn Fn(&str, &[MixerValue]) + Send + Sync>;

/// Transport trait - the console link implements this
///
/// All methods take &self so the transport can be shared as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link and start delivering inbound messages to `handler`
    async fn start(&self, handler: MessageHandler) -> Result<()>;

    /// Send one message; `None` sends an argument-less message (a query)
    async fn send(&self, address: &str, value: Option<MixerValue>) -> Result<()>;

    /// Stop receiving and release the socket
    async fn shutdown(&self) -> Result<()>;
}
