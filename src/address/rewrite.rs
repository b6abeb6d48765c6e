//! Bidirectional address rewrites
//!
//! The forward map takes a device wire address to the alternate address the
//! value is exposed under; the reverse map is its inverse and is rebuilt on
//! demand whenever the forward map has changed.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct RewriteMap {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    dirty: bool,
}

impl RewriteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `wire → rewritten`; invalidates the reverse map
    pub fn insert(&mut self, wire: impl Into<String>, rewritten: impl Into<String>) {
        self.forward.insert(wire.into(), rewritten.into());
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Rewritten address for an inbound wire address
    pub fn forward(&self, wire: &str) -> Option<&str> {
        self.forward.get(wire).map(String::as_str)
    }

    /// Wire address for an outbound rewritten address
    pub fn reverse(&mut self, rewritten: &str) -> Option<&str> {
        if self.dirty {
            self.rebuild();
        }
        self.reverse.get(rewritten).map(String::as_str)
    }

    /// Recompute the reverse map from the forward map
    pub fn rebuild(&mut self) {
        self.reverse = self
            .forward
            .iter()
            .map(|(wire, rewritten)| (rewritten.clone(), wire.clone()))
            .collect();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_reverse() {
        let mut map = RewriteMap::new();
        map.insert("/lr/mix/fader", "/main/st/mix/fader");

        assert_eq!(map.forward("/lr/mix/fader"), Some("/main/st/mix/fader"));
        assert_eq!(map.reverse("/main/st/mix/fader"), Some("/lr/mix/fader"));
        assert_eq!(map.reverse("/lr/mix/fader"), None);
    }

    #[test]
    fn test_reverse_follows_later_inserts() {
        let mut map = RewriteMap::new();
        map.insert("/-snap/index", "/scene/current");
        assert_eq!(map.reverse("/scene/current"), Some("/-snap/index"));

        // A forward change after the first reverse lookup must be visible
        map.insert("/rtn/aux/mix/fader", "/auxin/1/mix/fader");
        assert_eq!(map.reverse("/auxin/1/mix/fader"), Some("/rtn/aux/mix/fader"));

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.reverse("/scene/current"), None);
    }
}
