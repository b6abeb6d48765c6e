//! Error types for the mixer client

use thiserror::Error;

/// Errors returned by the mixer client and its transport
#[derive(Debug, Error)]
pub enum MixerError {
    /// Invalid or incomplete client configuration (e.g. no device ip)
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport failed to deliver or receive a datagram
    #[error("transport error: {0}")]
    Transport(String),

    /// Socket level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// OSC packet could not be encoded or decoded
    #[error("OSC codec error: {0}")]
    Osc(String),

    /// A one-shot query was attempted while a push subscription owns the receiver
    #[error("cannot query {0} while a subscription is active")]
    SubscriptionActive(String),

    /// A value could not be converted for the requested address
    #[error("invalid value for {address}: {reason}")]
    InvalidValue { address: String, reason: String },

    /// The transport has not been started yet
    #[error("transport not started")]
    NotStarted,
}

impl From<rosc::OscError> for MixerError {
    fn from(err: rosc::OscError) -> Self {
        MixerError::Osc(format!("{:?}", err))
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, MixerError>;
