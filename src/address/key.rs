//! Canonical state keys
//!
//! Wire addresses such as `/ch/01/mix/fader` become keys like
//! `/ch/1/mix_fader`: the category prefix keeps its path form, the rest of
//! the path is joined with underscores and index padding is dropped.

#[derive(Clone, Copy)]
enum IndexKind {
    Digits,
    Lowercase,
}

/// Category prefixes, matched in order and anchored at the start
const CATEGORIES: &[(&str, IndexKind)] = &[
    ("/ch/", IndexKind::Digits),
    ("/auxin/", IndexKind::Digits),
    ("/bus/", IndexKind::Digits),
    ("/dca/", IndexKind::Digits),
    ("/mtx/", IndexKind::Digits),
    ("/main/", IndexKind::Lowercase),
];

/// Length of the matched category prefix (including its trailing `/`)
fn category_prefix_len(address: &str) -> Option<usize> {
    CATEGORIES.iter().find_map(|(head, kind)| {
        let rest = address.strip_prefix(head)?;
        let end = rest.find('/')?;
        let segment = &rest[..end];
        let valid = !segment.is_empty()
            && match kind {
                IndexKind::Digits => segment.bytes().all(|b| b.is_ascii_digit()),
                IndexKind::Lowercase => segment.bytes().all(|b| b.is_ascii_lowercase()),
            };
        valid.then_some(head.len() + end + 1)
    })
}

/// Derive the canonical state key for a wire address
///
/// Addresses outside the known categories are returned unchanged.
pub fn state_key(address: &str) -> String {
    match category_prefix_len(address) {
        Some(len) => {
            let (prefix, rest) = address.split_at(len);
            strip_padding(&format!("{}{}", prefix, rest.replace('/', "_")))
        }
        None => address.to_string(),
    }
}

/// Drop leading zeros from every numeric path segment followed by `/`
pub fn strip_padding(key: &str) -> String {
    let segments: Vec<&str> = key.split('/').collect();
    let last = segments.len().saturating_sub(1);

    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let interior = i > 0 && i < last;
            if interior && segment.len() > 1 && segment.bytes().all(|b| b.is_ascii_digit()) {
                match segment.trim_start_matches('0') {
                    "" => "0",
                    trimmed => trimmed,
                }
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_category_keys() {
        assert_eq!(state_key("/ch/01/mix/fader"), "/ch/1/mix_fader");
        assert_eq!(state_key("/ch/01/fader/level"), "/ch/1/fader_level");
        assert_eq!(state_key("/auxin/08/config/name"), "/auxin/8/config_name");
        assert_eq!(state_key("/bus/16/mix/on"), "/bus/16/mix_on");
        assert_eq!(state_key("/dca/3/on"), "/dca/3/on");
        assert_eq!(state_key("/mtx/02/mix/fader"), "/mtx/2/mix_fader");
        assert_eq!(state_key("/main/st/mix/fader"), "/main/st/mix_fader");
        assert_eq!(state_key("/main/m/config/name"), "/main/m/config_name");
    }

    #[test]
    fn test_unknown_category_unchanged() {
        assert_eq!(state_key("/scene/current"), "/scene/current");
        assert_eq!(state_key("/-show/prepos/current"), "/-show/prepos/current");
        assert_eq!(state_key("/ch/xx/mix/fader"), "/ch/xx/mix/fader");
        assert_eq!(state_key("/main/ST/mix/fader"), "/main/ST/mix/fader");
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding("/ch/01/mix_fader"), "/ch/1/mix_fader");
        assert_eq!(strip_padding("/ch/00/mix_fader"), "/ch/0/mix_fader");
        assert_eq!(strip_padding("/config/mute/01"), "/config/mute/01");
        assert_eq!(strip_padding("/a/01/02/b"), "/a/1/2/b");
    }

    proptest! {
        #[test]
        fn prop_canonical_key_is_fixed_point(
            category in "(ch|auxin|bus|dca|mtx)",
            index in 0usize..100,
            width in 1usize..4,
            leaf in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
        ) {
            let wire = format!("/{}/{:0width$}/{}", category, index, leaf, width = width);
            let key = state_key(&wire);
            prop_assert_eq!(state_key(&key), key.clone());
            prop_assert_eq!(strip_padding(&key), key);
        }
    }
}
