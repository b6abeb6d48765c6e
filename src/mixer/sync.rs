//! State synchronization: bootstrap, scene recall and confirmed sets

use std::collections::HashSet;
use tracing::{debug, info, trace};

use super::Mixer;
use crate::address::{expand_entry, redo_padding, state_key, RewriteMap};
use crate::error::{MixerError, Result};
use crate::profile::DeviceProfile;
use crate::state::{StateMirror, StateUpdate, DB_SUFFIX};
use crate::units::db_to_fader;
use crate::value::MixerValue;

/// Address tables and mirror owned by one client
pub(crate) struct SyncState {
    profile: DeviceProfile,
    rewrites: RewriteMap,
    valid: HashSet<String>,
    mirror: StateMirror,
}

impl SyncState {
    pub fn new(profile: DeviceProfile) -> Self {
        let mut state = Self {
            profile,
            rewrites: RewriteMap::new(),
            valid: HashSet::new(),
            mirror: StateMirror::new(),
        };
        state.expand();
        state
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn mirror(&self) -> &StateMirror {
        &self.mirror
    }

    pub fn set_profile(&mut self, profile: DeviceProfile) {
        self.profile = profile;
        self.expand();
    }

    /// Rebuild rewrites and tracked addresses from the profile
    ///
    /// Returns every concrete address in table order.
    pub fn expand(&mut self) -> Vec<String> {
        self.rewrites.clear();
        self.valid.clear();

        let mut addresses = Vec::new();
        for entry in &self.profile.addresses {
            for (address, rewrite) in expand_entry(entry, &self.profile.counts) {
                if let Some(rewrite) = rewrite {
                    self.rewrites.insert(address.clone(), rewrite);
                }
                self.valid.insert(address.clone());
                addresses.push(address);
            }
        }
        addresses
    }

    /// Reflect one inbound message in the mirror
    pub fn apply_update(&mut self, address: &str, values: &[MixerValue]) -> Vec<StateUpdate> {
        if !self.valid.contains(address) {
            trace!("Ignoring untracked address {}", address);
            return Vec::new();
        }
        let value = match values {
            [] => return Vec::new(),
            [single] => single.clone(),
            many => MixerValue::List(many.to_vec()),
        };

        let key = state_key(self.rewrites.forward(address).unwrap_or(address));
        self.mirror.store(&key, value)
    }

    /// Device wire address for a canonical key
    pub fn wire_address(&mut self, key: &str) -> String {
        let path = key.replace('_', "/");
        let padded = redo_padding(&path, &self.profile.addresses, &self.profile.counts);
        match self.rewrites.reverse(&padded) {
            Some(wire) => wire.to_string(),
            None => padded,
        }
    }

    pub fn clear_mirror(&mut self) {
        self.mirror.clear();
    }
}

impl Mixer {
    /// Clear the mirror and query every address of the profile
    ///
    /// Replies arrive asynchronously through the receipt path.
    pub async fn reload(&self) -> Result<()> {
        let addresses = {
            let mut sync = self.inner.sync.lock();
            sync.clear_mirror();
            sync.expand()
        };

        info!("Loading {} addresses from mixer", addresses.len());
        for address in &addresses {
            self.send(address, None).await?;
        }
        Ok(())
    }

    /// Recall a scene, wait for it to settle and reload the whole state
    ///
    /// The reload is unconditional: the burst of change messages a recall
    /// triggers can overrun the receive buffer and be lost.
    pub async fn load_scene(&self, scene: i32) -> Result<()> {
        let command = self.inner.sync.lock().profile().scene_load_command.clone();
        info!("🎬 Loading scene {}", scene);

        self.send(&command, Some(MixerValue::Int(scene))).await?;
        tokio::time::sleep(self.inner.settings.scene_settle).await;
        self.reload().await
    }

    /// Set a parameter by canonical key and read it back from the console
    ///
    /// `<fader key>_db` keys take a decibel value. The mirror is only
    /// updated by the console's reply, never from the value sent.
    pub async fn set_value(&self, key: &str, value: impl Into<MixerValue>) -> Result<()> {
        let value = value.into();
        let (key, value) = match key.strip_suffix(DB_SUFFIX) {
            Some(fader_key) => {
                let db = value.as_f64().ok_or_else(|| MixerError::InvalidValue {
                    address: key.to_string(),
                    reason: format!("expected a decibel number, got {}", value),
                })?;
                (fader_key, MixerValue::Float(db_to_fader(db) as f32))
            }
            None => (key, value),
        };
        let value = match value {
            MixerValue::Bool(on) => MixerValue::Int(i32::from(on)),
            other => other,
        };

        let address = self.inner.sync.lock().wire_address(key);
        debug!("set {} → {} = {}", key, address, value);

        self.send(&address, Some(value)).await?;
        match self.query(&address).await {
            Ok(_) => Ok(()),
            // Subscribed: the readback reaches the mirror through the subscription
            Err(MixerError::SubscriptionActive(_)) => self.send(&address, None).await,
            Err(e) => Err(e),
        }
    }

    /// Swap the device profile at runtime and reload against it
    pub async fn apply_profile(&self, profile: DeviceProfile) -> Result<()> {
        info!("Applying device profile {}", profile.name);
        self.inner.sync.lock().set_profile(profile);
        self.reload().await
    }
}
