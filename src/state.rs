//! StateMirror - local copy of the console state
//!
//! Keys are canonical state keys (see [`crate::address::key`]). Every fader
//! key `<key>` ending in `_fader` has a derived companion `<key>_db` holding
//! the same position in decibels; the companion is only ever written
//! together with its fader.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use crate::address::strip_padding;
use crate::units::fader_to_db;
use crate::value::MixerValue;

/// Suffix of derived decibel keys
pub const DB_SUFFIX: &str = "_db";

/// One property written to the mirror
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateUpdate {
    pub property: String,
    pub value: MixerValue,
}

#[derive(Debug, Default, Clone)]
pub struct StateMirror {
    values: HashMap<String, MixerValue>,
}

impl StateMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a canonical key and return what was written
    ///
    /// On/off keys are coerced to booleans and fader keys also write their
    /// decibel companion.
    pub fn store(&mut self, key: &str, value: MixerValue) -> Vec<StateUpdate> {
        let value = if key.ends_with("_on") || key.ends_with("/on") {
            MixerValue::Bool(value.is_truthy())
        } else {
            value
        };
        let key = strip_padding(key);

        let mut updates = Vec::with_capacity(2);
        if key.ends_with("_fader") {
            match value.as_f64() {
                Some(position) => {
                    let db_key = format!("{}{}", key, DB_SUFFIX);
                    let db = MixerValue::Float(fader_to_db(position) as f32);
                    self.values.insert(db_key.clone(), db.clone());
                    updates.push(StateUpdate {
                        property: db_key,
                        value: db,
                    });
                }
                None => warn!(key = %key, value = %value, "Non-numeric fader value, no dB companion"),
            }
        }

        self.values.insert(key.clone(), value.clone());
        updates.insert(
            0,
            StateUpdate {
                property: key,
                value,
            },
        );
        updates
    }

    pub fn get(&self, key: &str) -> Option<&MixerValue> {
        self.values.get(key)
    }

    /// Sorted copy of the whole mirror
    pub fn snapshot(&self) -> BTreeMap<String, MixerValue> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fader_writes_db_companion() {
        let mut mirror = StateMirror::new();
        let updates = mirror.store("/ch/1/mix_fader", MixerValue::Float(0.75));

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].property, "/ch/1/mix_fader");
        assert_eq!(updates[1].property, "/ch/1/mix_fader_db");
        assert_eq!(updates[1].value, MixerValue::Float(0.0));
        assert_eq!(mirror.get("/ch/1/mix_fader_db"), Some(&MixerValue::Float(0.0)));
    }

    #[test]
    fn test_on_keys_coerced_to_bool() {
        let mut mirror = StateMirror::new();
        mirror.store("/ch/2/mix_on", MixerValue::Int(1));
        mirror.store("/dca/3/on", MixerValue::Int(0));

        assert_eq!(mirror.get("/ch/2/mix_on"), Some(&MixerValue::Bool(true)));
        assert_eq!(mirror.get("/dca/3/on"), Some(&MixerValue::Bool(false)));
    }

    #[test]
    fn test_residual_padding_stripped() {
        let mut mirror = StateMirror::new();
        let updates = mirror.store("/ch/07/config_name", MixerValue::Text("Kick".into()));
        assert_eq!(updates[0].property, "/ch/7/config_name");
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn test_non_numeric_fader_has_no_companion() {
        let mut mirror = StateMirror::new();
        let updates = mirror.store("/bus/1/mix_fader", MixerValue::Text("?".into()));
        assert_eq!(updates.len(), 1);
        assert!(mirror.get("/bus/1/mix_fader_db").is_none());
    }
}
