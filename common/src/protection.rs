use crate::{config::ClimateConfig, types::ClimateAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTimers {
    last_heat_ms: Option<u64>,
    last_cool_ms: Option<u64>,
    // Most recent tick on which heating or cooling actually ran.
    last_active: Option<(ClimateAction, u64)>,
}

impl RunTimers {
    pub fn last_heat_ms(&self) -> Option<u64> {
        self.last_heat_ms
    }

    pub fn last_cool_ms(&self) -> Option<u64> {
        self.last_cool_ms
    }

    pub fn reset(&mut self) {
        self.last_heat_ms = None;
        self.last_cool_ms = None;
    }

    pub fn run_ms(&self, action: ClimateAction, now_ms: u64) -> u64 {
        let start = match action {
            ClimateAction::Heating => self.last_heat_ms,
            ClimateAction::Cooling => self.last_cool_ms,
            ClimateAction::None => None,
        };
        start.map(|start| now_ms.saturating_sub(start)).unwrap_or(0)
    }

    pub fn swap_allowed(&self, config: &ClimateConfig, demanded: ClimateAction, now_ms: u64) -> bool {
        match self.last_active {
            Some((previous, at_ms)) if demanded.is_active() && previous == demanded.opposite() => {
                now_ms.saturating_sub(at_ms) >= config.swap_delay_ms
            }
            _ => true,
        }
    }

    pub fn regulate(&mut self, config: &ClimateConfig, demanded: ClimateAction, now_ms: u64) -> ClimateAction {
        if !demanded.is_active() || !self.swap_allowed(config, demanded, now_ms) {
            self.reset();
            return ClimateAction::None;
        }

        match demanded {
            ClimateAction::Heating => {
                self.last_heat_ms.get_or_insert(now_ms);
                self.last_cool_ms = None;
            }
            ClimateAction::Cooling => {
                self.last_cool_ms.get_or_insert(now_ms);
                self.last_heat_ms = None;
            }
            ClimateAction::None => {}
        }

        // The ceiling idles one cycle; the next demanded cycle starts a new run.
        if self.run_ms(demanded, now_ms) >= config.boost_duration_ms {
            self.reset();
            return ClimateAction::None;
        }

        self.last_active = Some((demanded, now_ms));
        demanded
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Liveness {
    last_sent_ms: Option<u64>,
}

impl Liveness {
    pub fn mark_sent(&mut self, now_ms: u64) {
        self.last_sent_ms = Some(now_ms);
    }

    pub fn last_sent_ms(&self) -> Option<u64> {
        self.last_sent_ms
    }

    pub fn is_connected(&self, config: &ClimateConfig, now_ms: u64) -> bool {
        self.last_sent_ms
            .map(|last| now_ms.saturating_sub(last) < config.keep_alive_ms)
            .unwrap_or(false)
    }
}
