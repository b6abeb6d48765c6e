//! mixer-sync - stateful OSC client for X32/XAir-family digital consoles
//!
//! Keeps a local mirror of the console's parameters, translating between the
//! device's wire addresses and canonical state keys:
//!
//! - [`address`] expands address templates, normalizes index padding and
//!   derives state keys.
//! - [`mixer`] holds the client: bootstrap, confirmed sets, scene recall and
//!   the push subscription with its keepalive.
//! - [`transport`] is the datagram seam; [`OscUdpTransport`] speaks OSC over UDP.

pub mod address;
pub mod config;
pub mod error;
pub mod mixer;
pub mod profile;
pub mod state;
pub mod transport;
pub mod units;
pub mod value;

pub use error::{MixerError, Result};
pub use mixer::{Mixer, MixerInfo, MixerSettings, UpdateCallback};
pub use profile::{DeviceProfile, MixerType};
pub use state::StateUpdate;
pub use transport::{OscUdpTransport, Transport};
pub use value::MixerValue;
