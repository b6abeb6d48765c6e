//! Padding normalization for application-supplied addresses
//!
//! Canonical state keys carry unpadded indices (`/ch/3/...`) while the
//! device expects the width used by the address table (`/ch/03/...`).

use super::template::{AddressEntry, AddressTemplate};
use super::Counts;

/// Re-pad the index segment of `address` to the width its template uses
///
/// Every indexed entry whose literal prefix starts the address and is
/// followed by a numeric segment is applied, in table order. An entry's
/// rewrite template is tried after its address template, so exposed
/// addresses under another prefix are padded too. Addresses matching no
/// entry are returned unchanged.
pub fn redo_padding(address: &str, entries: &[AddressEntry], counts: &Counts) -> String {
    let mut address = address.to_string();

    for entry in entries {
        let templates = std::iter::once(entry.address.as_str()).chain(entry.rewrite.as_deref());
        for template in templates.map(AddressTemplate::parse) {
            if let Some(padded) = repad(&address, &template, counts) {
                address = padded;
            }
        }
    }

    address
}

fn repad(address: &str, template: &AddressTemplate, counts: &Counts) -> Option<String> {
    let AddressTemplate::Indexed { prefix, name, .. } = template else {
        return None;
    };
    let count = *counts.get(name)?;
    let rest = address.strip_prefix(prefix.as_str())?;

    let end = rest.find('/').unwrap_or(rest.len());
    let index = &rest[..end];
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = match index.trim_start_matches('0') {
        "" => "0",
        d => d,
    };
    let width = template.resolve_width(count);
    Some(format!("{}{:0>width$}{}", prefix, digits, &rest[end..], width = width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::key::state_key;
    use proptest::prelude::*;

    fn table() -> (Vec<AddressEntry>, Counts) {
        let entries = vec![
            AddressEntry::new("/ch/{num_channel}/mix/fader"),
            AddressEntry::new("/ch/{num_channel}/mix/on"),
            AddressEntry::new("/dca/{num_dca}/fader"),
            AddressEntry::new("/config/mute/{num_mute:2}"),
            AddressEntry::new("/main/st/mix/fader"),
        ];
        let counts = [("num_channel", 32), ("num_dca", 8), ("num_mute", 6)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        (entries, counts)
    }

    #[test]
    fn test_pads_channel_index() {
        let (entries, counts) = table();
        assert_eq!(redo_padding("/ch/3/mix/fader", &entries, &counts), "/ch/03/mix/fader");
        assert_eq!(redo_padding("/ch/03/mix/fader", &entries, &counts), "/ch/03/mix/fader");
    }

    #[test]
    fn test_natural_width_and_trailing_index() {
        let (entries, counts) = table();
        assert_eq!(redo_padding("/dca/4/fader", &entries, &counts), "/dca/4/fader");
        assert_eq!(redo_padding("/config/mute/3", &entries, &counts), "/config/mute/03");
    }

    #[test]
    fn test_unmatched_passes_through() {
        let (entries, counts) = table();
        assert_eq!(redo_padding("/main/st/mix/fader", &entries, &counts), "/main/st/mix/fader");
        assert_eq!(redo_padding("/bus/2/mix/fader", &entries, &counts), "/bus/2/mix/fader");
        assert_eq!(redo_padding("/ch/xx/mix/fader", &entries, &counts), "/ch/xx/mix/fader");
    }

    #[test]
    fn test_pads_rewrite_prefix() {
        let (mut entries, mut counts) = table();
        entries.push(AddressEntry::rewritten("/rtn/{num_rtn}/mix/fader", "/auxin/{num_rtn}/mix/fader"));
        counts.insert("num_rtn".to_string(), 10);

        assert_eq!(redo_padding("/auxin/1/mix/fader", &entries, &counts), "/auxin/01/mix/fader");
        assert_eq!(redo_padding("/rtn/7/mix/fader", &entries, &counts), "/rtn/07/mix/fader");
    }

    proptest! {
        #[test]
        fn prop_padding_is_left_inverse_of_stripping(index in 1usize..=32, leaf in "(mix_fader|mix_on)") {
            let (entries, counts) = table();
            let key = format!("/ch/{}/{}", index, leaf);
            let wire = redo_padding(&key.replace('_', "/"), &entries, &counts);

            prop_assert_eq!(wire.split('/').nth(2).map(str::len), Some(2));
            prop_assert_eq!(state_key(&wire), key);
        }
    }
}
