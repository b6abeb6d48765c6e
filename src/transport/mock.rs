//! In-memory console for tests
//!
//! Answers argument-less queries from its parameter table, stores sets, and
//! applies scene presets without emitting anything, the way a real console
//! behaves when its scene-change burst is lost.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{MessageHandler, Transport};
use crate::error::Result;
use crate::value::MixerValue;

#[derive(Default)]
struct ConsoleState {
    handler: Option<MessageHandler>,
    params: HashMap<String, MixerValue>,
    sent: Vec<(String, Option<MixerValue>)>,
    scenes: HashMap<i32, Vec<(String, MixerValue)>>,
    scene_command: String,
    scene_index: String,
    silent: bool,
}

#[derive(Default)]
pub struct MockConsole {
    state: Mutex<ConsoleState>,
}

impl MockConsole {
    pub fn new(scene_command: &str, scene_index: &str) -> Self {
        let console = Self::default();
        {
            let mut state = console.state.lock();
            state.scene_command = scene_command.to_string();
            state.scene_index = scene_index.to_string();
        }
        console
    }

    /// A console that never answers
    pub fn silent() -> Self {
        let console = Self::default();
        console.state.lock().silent = true;
        console
    }

    pub fn set_param(&self, address: &str, value: impl Into<MixerValue>) {
        self.state.lock().params.insert(address.to_string(), value.into());
    }

    pub fn param(&self, address: &str) -> Option<MixerValue> {
        self.state.lock().params.get(address).cloned()
    }

    pub fn add_scene(&self, scene: i32, values: Vec<(&str, MixerValue)>) {
        self.state.lock().scenes.insert(
            scene,
            values.into_iter().map(|(a, v)| (a.to_string(), v)).collect(),
        );
    }

    pub fn sent(&self) -> Vec<(String, Option<MixerValue>)> {
        self.state.lock().sent.clone()
    }

    pub fn sent_count(&self, address: &str) -> usize {
        self.state.lock().sent.iter().filter(|(a, _)| a == address).count()
    }

    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    /// Push a console-originated message to the client
    pub fn emit(&self, address: &str, values: Vec<MixerValue>) {
        let handler = self.state.lock().handler.clone();
        if let Some(handler) = handler {
            handler(address, &values);
        }
    }
}

#[async_trait]
impl Transport for MockConsole {
    async fn start(&self, handler: MessageHandler) -> Result<()> {
        self.state.lock().handler = Some(handler);
        Ok(())
    }

    async fn send(&self, address: &str, value: Option<MixerValue>) -> Result<()> {
        let reply = {
            let mut state = self.state.lock();
            state.sent.push((address.to_string(), value.clone()));
            if state.silent {
                return Ok(());
            }

            match value {
                _ if address == "/xinfo" => Some(vec![
                    MixerValue::from("192.168.1.50"),
                    MixerValue::from("test-console"),
                    MixerValue::from("X32"),
                    MixerValue::from("4.06"),
                ]),
                Some(MixerValue::Int(scene)) if address == state.scene_command => {
                    let preset = state.scenes.get(&scene).cloned().unwrap_or_default();
                    for (param, v) in preset {
                        state.params.insert(param, v);
                    }
                    let index = state.scene_index.clone();
                    state.params.insert(index, MixerValue::Int(scene));
                    None
                }
                Some(v) => {
                    state.params.insert(address.to_string(), v);
                    None
                }
                None => state.params.get(address).cloned().map(|v| vec![v]),
            }
        };

        if let Some(values) = reply {
            self.emit(address, values);
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.state.lock().handler = None;
        Ok(())
    }
}
