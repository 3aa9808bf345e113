use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    topics::{SUFFIX_MODE_SET, SUFFIX_TEMPERATURE_SET},
    types::{ClimateAction, ClimateMode},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetMode(ClimateMode),
    RequestAction(ClimateAction),
    SetSetpoint(f32),
    ClearSetpoint,
    SetHeatSetpoint(f32),
    SetCoolSetpoint(f32),
    SetOverride(bool),
    UpdateTemperature(f32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputEvent(pub Map<String, Value>);

impl InputEvent {
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        let fields = &self.0;

        if let Some(temp) = fields.get("temperature").and_then(parse_number) {
            commands.push(Command::UpdateTemperature(temp));
        }
        if let Some(value) = fields.get("override") {
            commands.push(Command::SetOverride(matches!(value, Value::Bool(true))));
        }
        if let Some(heat) = fields.get("heatSetpoint").and_then(parse_number) {
            commands.push(Command::SetHeatSetpoint(heat));
        }
        if let Some(cool) = fields.get("coolSetpoint").and_then(parse_number) {
            commands.push(Command::SetCoolSetpoint(cool));
        }
        if let Some(mode) = fields.get("mode").or_else(|| fields.get("payload")) {
            commands.push(Command::SetMode(parse_mode(mode)));
        }
        if let Some(action) = fields
            .get("action")
            .and_then(Value::as_str)
            .and_then(ClimateAction::parse)
        {
            commands.push(Command::RequestAction(action));
        }
        match fields.get("setpoint") {
            Some(Value::Null) => commands.push(Command::ClearSetpoint),
            Some(value) => {
                if let Some(setpoint) = parse_number(value) {
                    commands.push(Command::SetSetpoint(setpoint));
                }
            }
            None => {}
        }

        commands
    }
}

pub fn command_from_topic(topic: &str, payload: &str) -> Option<Command> {
    if topic.ends_with(SUFFIX_MODE_SET) {
        return Some(Command::SetMode(ClimateMode::parse_lenient(payload)));
    }
    if topic.ends_with(SUFFIX_TEMPERATURE_SET) {
        return payload.trim().parse::<f32>().ok().map(Command::SetSetpoint);
    }
    None
}

fn parse_mode(value: &Value) -> ClimateMode {
    value
        .as_str()
        .map(ClimateMode::parse_lenient)
        .unwrap_or(ClimateMode::Auto)
}

fn parse_number(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|value| value as f32),
        Value::String(raw) => raw.trim().parse::<f32>().ok(),
        _ => None,
    }
}
