use std::{collections::HashMap, fmt};

pub trait Checkpoint {
    fn get(&self, key: &str) -> Option<f32>;
    fn set(&mut self, key: &str, value: f32);
}

pub trait StatusSink {
    type Error: fmt::Display;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpoint {
    values: HashMap<String, f32>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpoint for MemoryCheckpoint {
    fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }
}

pub fn heat_setpoint_key(device_id: &str) -> String {
    format!("{device_id}.heatSetpoint")
}

pub fn cool_setpoint_key(device_id: &str) -> String {
    format!("{device_id}.coolSetpoint")
}
