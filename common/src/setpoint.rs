use crate::config::ClimateConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Setpoint {
    current: Option<f32>,
    set_at_ms: Option<u64>,
}

impl Setpoint {
    pub fn set(&mut self, config: &ClimateConfig, value: f32, now_ms: u64) -> bool {
        if !config.has_setpoint || !config.in_range(value) {
            return false;
        }
        self.current = Some(value);
        self.set_at_ms = Some(now_ms);
        true
    }

    pub fn load(&mut self, value: f32, now_ms: u64) {
        self.current = Some(value);
        self.set_at_ms = Some(now_ms);
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.set_at_ms = None;
    }

    pub fn valid(&self, config: &ClimateConfig, now_ms: u64) -> Option<f32> {
        match (self.current, self.set_at_ms) {
            (Some(value), Some(set_at)) if now_ms.saturating_sub(set_at) <= config.temp_valid_ms => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get_or(&self, config: &ClimateConfig, now_ms: u64, default: f32) -> f32 {
        self.valid(config, now_ms).unwrap_or(default)
    }

    pub fn is_set(&self, config: &ClimateConfig, now_ms: u64) -> bool {
        self.valid(config, now_ms).is_some()
    }
}
