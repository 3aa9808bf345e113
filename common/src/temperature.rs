use crate::config::ClimateConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureTracker {
    value: Option<f32>,
    observed_at_ms: Option<u64>,
}

impl TemperatureTracker {
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn observed_at_ms(&self) -> Option<u64> {
        self.observed_at_ms
    }

    pub fn update(&mut self, config: &ClimateConfig, raw: f32, now_ms: u64) -> bool {
        if !config.in_range(raw) {
            return false;
        }

        let accepted = match (self.value, self.observed_at_ms) {
            (Some(prior), Some(observed_at)) => {
                (raw - prior).abs() <= config.tolerance
                    || now_ms.saturating_sub(observed_at) > config.swap_delay_ms
            }
            _ => true,
        };

        if accepted {
            self.value = Some(raw);
            self.observed_at_ms = Some(now_ms);
        }
        accepted
    }
}
