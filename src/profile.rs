//! Device profiles: address tables, element counts and scene commands
//!
//! A profile is pure configuration data. Built-in profiles cover the X32
//! family and the XAir family; custom profiles can be read from YAML.

use serde::{Deserialize, Serialize};

use crate::address::{AddressEntry, Counts};

/// Supported console families
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MixerType {
    X32,
    Xr12,
    Xr16,
    Xr18,
}

impl std::fmt::Display for MixerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixerType::X32 => write!(f, "x32"),
            MixerType::Xr12 => write!(f, "xr12"),
            MixerType::Xr16 => write!(f, "xr16"),
            MixerType::Xr18 => write!(f, "xr18"),
        }
    }
}

/// Everything device-specific the sync engine needs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceProfile {
    pub name: String,
    /// UDP port the console listens on
    pub port: u16,
    /// Counts referenced by address placeholders
    pub counts: Counts,
    /// Ordered table of addresses to load
    pub addresses: Vec<AddressEntry>,
    /// Address that recalls a scene/snapshot by number
    pub scene_load_command: String,
}

impl DeviceProfile {
    pub fn count(&self, name: &str) -> Option<usize> {
        self.counts.get(name).copied()
    }
}

/// Built-in profile for a console family
pub fn for_type(mixer_type: MixerType) -> DeviceProfile {
    match mixer_type {
        MixerType::X32 => x32(),
        MixerType::Xr12 => xair("XR12", 12, 2),
        MixerType::Xr16 => xair("XR16", 16, 4),
        MixerType::Xr18 => xair("XR18", 16, 6),
    }
}

fn counts(pairs: &[(&str, usize)]) -> Counts {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Standard fader / on / name triple for an indexed or named strip
fn strip(base: &str, fader: &str, on: &str) -> Vec<AddressEntry> {
    vec![
        AddressEntry::new(format!("{}/{}", base, fader)),
        AddressEntry::new(format!("{}/{}", base, on)),
        AddressEntry::new(format!("{}/config/name", base)),
    ]
}

fn x32() -> DeviceProfile {
    let mut addresses = Vec::new();
    for base in [
        "/ch/{num_channel}",
        "/auxin/{num_auxin}",
        "/bus/{num_bus}",
        "/mtx/{num_matrix}",
        "/main/st",
        "/main/m",
    ] {
        addresses.extend(strip(base, "mix/fader", "mix/on"));
    }
    addresses.extend(strip("/dca/{num_dca}", "fader", "on"));
    addresses.push(AddressEntry::rewritten("/-show/prepos/current", "/scene/current"));
    addresses.push(AddressEntry::rewritten("/-show/showfile/show/name", "/show/name"));

    DeviceProfile {
        name: "X32".to_string(),
        port: 10023,
        counts: counts(&[
            ("num_channel", 32),
            ("num_auxin", 8),
            ("num_bus", 16),
            ("num_matrix", 6),
            ("num_dca", 8),
        ]),
        addresses,
        scene_load_command: "/-action/goscene".to_string(),
    }
}

fn xair(name: &str, channels: usize, buses: usize) -> DeviceProfile {
    let mut addresses = Vec::new();
    addresses.extend(strip("/ch/{num_channel}", "mix/fader", "mix/on"));
    addresses.extend(strip("/bus/{num_bus}", "mix/fader", "mix/on"));
    addresses.extend(strip("/dca/{num_dca}", "fader", "on"));

    // XAir exposes the aux return and main LR outside the X32 naming scheme
    for (wire, exposed) in [
        ("/rtn/aux/mix/fader", "/auxin/1/mix/fader"),
        ("/rtn/aux/mix/on", "/auxin/1/mix/on"),
        ("/rtn/aux/config/name", "/auxin/1/config/name"),
        ("/lr/mix/fader", "/main/st/mix/fader"),
        ("/lr/mix/on", "/main/st/mix/on"),
        ("/lr/config/name", "/main/st/config/name"),
        ("/-snap/index", "/scene/current"),
    ] {
        addresses.push(AddressEntry::rewritten(wire, exposed));
    }

    DeviceProfile {
        name: name.to_string(),
        port: 10024,
        counts: counts(&[("num_channel", channels), ("num_bus", buses), ("num_dca", 4)]),
        addresses,
        scene_load_command: "/-snap/load".to_string(),
    }
}
