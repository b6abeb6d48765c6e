//! OSC over UDP transport
//!
//! Binds an ephemeral local port, connects it to the console and decodes
//! every inbound datagram (messages and bundles) into handler calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use rosc::{OscArray, OscMessage, OscPacket, OscType};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{MessageHandler, Transport};
use crate::error::{MixerError, Result};
use crate::value::MixerValue;

/// Receive buffer size; scene recalls can burst many messages
const RECV_BUFFER_SIZE: usize = 8192;

pub struct OscUdpTransport {
    host: String,
    port: u16,
    socket: Mutex<Option<Arc<UdpSocket>>>,
    receive_task: Mutex<Option<JoinHandle<()>>>,
}

impl OscUdpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            socket: Mutex::new(None),
            receive_task: Mutex::new(None),
        }
    }

    fn socket(&self) -> Result<Arc<UdpSocket>> {
        self.socket.lock().clone().ok_or(MixerError::NotStarted)
    }
}

#[async_trait]
impl Transport for OscUdpTransport {
    async fn start(&self, handler: MessageHandler) -> Result<()> {
        if self.socket.lock().is_some() {
            return Ok(());
        }

        let remote = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                MixerError::Config(format!("Cannot resolve mixer address {}:{}", self.host, self.port))
            })?;

        let local = if remote.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        info!("🎛️  OSC link {} → {}", socket.local_addr()?, remote);

        let socket = Arc::new(socket);
        *self.socket.lock() = Some(Arc::clone(&socket));

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; RECV_BUFFER_SIZE];
            loop {
                match socket.recv(&mut buf).await {
                    Ok(len) => match rosc::decoder::decode_udp(&buf[..len]) {
                        Ok((_, packet)) => dispatch(packet, &handler),
                        Err(e) => warn!("Dropping undecodable OSC datagram ({} bytes): {:?}", len, e),
                    },
                    // ICMP port unreachable surfaces here while the console is offline
                    Err(e) if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused) => {
                        trace!("OSC receive: {}", e);
                    }
                    Err(e) => {
                        warn!("OSC receive loop stopped: {}", e);
                        break;
                    }
                }
            }
        });
        *self.receive_task.lock() = Some(task);

        Ok(())
    }

    async fn send(&self, address: &str, value: Option<MixerValue>) -> Result<()> {
        let socket = self.socket()?;
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_string(),
            args: value.map(to_osc).into_iter().collect(),
        });
        let bytes = rosc::encoder::encode(&packet)?;
        let sent = socket.send(&bytes).await?;
        if sent != bytes.len() {
            return Err(MixerError::Transport(format!(
                "short send for {}: {} of {} bytes",
                address,
                sent,
                bytes.len()
            )));
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(task) = self.receive_task.lock().take() {
            task.abort();
        }
        self.socket.lock().take();
        debug!("OSC transport shut down");
        Ok(())
    }
}

fn dispatch(packet: OscPacket, handler: &MessageHandler) {
    match packet {
        OscPacket::Message(msg) => {
            let values: Vec<MixerValue> = msg.args.into_iter().filter_map(from_osc).collect();
            handler(&msg.addr, &values);
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                dispatch(inner, handler);
            }
        }
    }
}

/// Convert an OSC argument; types with no mixer meaning are skipped
fn from_osc(arg: OscType) -> Option<MixerValue> {
    match arg {
        OscType::Int(i) => Some(MixerValue::Int(i)),
        OscType::Long(l) => Some(match i32::try_from(l) {
            Ok(i) => MixerValue::Int(i),
            Err(_) => MixerValue::Float(l as f32),
        }),
        OscType::Float(f) => Some(MixerValue::Float(f)),
        OscType::Double(d) => Some(MixerValue::Float(d as f32)),
        OscType::String(s) => Some(MixerValue::Text(s)),
        OscType::Char(c) => Some(MixerValue::Text(c.to_string())),
        OscType::Bool(b) => Some(MixerValue::Bool(b)),
        OscType::Array(array) => Some(MixerValue::List(
            array.content.into_iter().filter_map(from_osc).collect(),
        )),
        _ => None,
    }
}

fn to_osc(value: MixerValue) -> OscType {
    match value {
        MixerValue::Bool(b) => OscType::Bool(b),
        MixerValue::Int(i) => OscType::Int(i),
        MixerValue::Float(f) => OscType::Float(f),
        MixerValue::Text(s) => OscType::String(s),
        MixerValue::List(items) => OscType::Array(OscArray {
            content: items.into_iter().map(to_osc).collect(),
        }),
    }
}
