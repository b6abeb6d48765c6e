//! Address mapping between canonical state keys and device wire addresses
//!
//! - [`template`]: expansion of templated address table rows
//! - [`padding`]: re-padding of unpadded indices for outbound addresses
//! - [`key`]: canonical state key derivation for inbound addresses
//! - [`rewrite`]: bidirectional alternate-address map

use std::collections::BTreeMap;

pub mod key;
pub mod padding;
pub mod rewrite;
pub mod template;

pub use key::{state_key, strip_padding};
pub use padding::redo_padding;
pub use rewrite::RewriteMap;
pub use template::{expand_entry, AddressEntry, AddressTemplate};

/// Named element counts of a device (`num_channel`, `num_bus`, ...)
pub type Counts = BTreeMap<String, usize>;
