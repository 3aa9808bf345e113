use crate::{
    action::calculate_action,
    checkpoint::{cool_setpoint_key, heat_setpoint_key, Checkpoint, StatusSink},
    command::Command,
    config::{ClimateConfig, ConfigError, DeviceConfig, RuntimeConfig},
    protection::{Liveness, RunTimers},
    setpoint::Setpoint,
    temperature::TemperatureTracker,
    topics::status_topic,
    types::{ClimateAction, ClimateMode, ClimateUpdate, DisplayStatus},
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Update(ClimateUpdate),
    Status(DisplayStatus),
    PublishFailed(String),
}

#[derive(Debug)]
pub struct ClimateEngine<C, S> {
    pub config: ClimateConfig,
    device: DeviceConfig,
    status_topic: Option<String>,
    checkpoint: C,
    sink: Option<S>,
    started_ms: u64,

    mode: ClimateMode,
    setpoint: Setpoint,
    override_active: bool,
    temperature: TemperatureTracker,
    action: ClimateAction,

    // Rails set through this engine; they win over the checkpointed values.
    heat_setpoint: Option<f32>,
    cool_setpoint: Option<f32>,

    timers: RunTimers,
    liveness: Liveness,
    display: DisplayStatus,
}

impl<C: Checkpoint, S: StatusSink> ClimateEngine<C, S> {
    pub fn new(
        runtime: &RuntimeConfig,
        checkpoint: C,
        sink: Option<S>,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        runtime.climate.validate()?;
        let config = runtime.climate.clone();
        Ok(Self {
            mode: config.default_mode(),
            config,
            device: runtime.device.clone(),
            status_topic: runtime.transport.advertised_topic().map(status_topic),
            checkpoint,
            sink,
            started_ms: now_ms,
            setpoint: Setpoint::default(),
            override_active: false,
            temperature: TemperatureTracker::default(),
            action: ClimateAction::None,
            heat_setpoint: None,
            cool_setpoint: None,
            timers: RunTimers::default(),
            liveness: Liveness::default(),
            display: DisplayStatus::starting(),
        })
    }

    pub fn mode(&self) -> ClimateMode {
        self.mode
    }

    pub fn action(&self) -> ClimateAction {
        self.action
    }

    pub fn is_override_active(&self) -> bool {
        self.override_active
    }

    pub fn current_temp(&self) -> Option<f32> {
        self.temperature.value()
    }

    pub fn display_status(&self) -> &DisplayStatus {
        &self.display
    }

    pub fn run_timers(&self) -> &RunTimers {
        &self.timers
    }

    pub fn last_sent_ms(&self) -> Option<u64> {
        self.liveness.last_sent_ms()
    }

    pub fn status_topic(&self) -> Option<&str> {
        self.status_topic.as_deref()
    }

    pub fn checkpoint(&self) -> &C {
        &self.checkpoint
    }

    pub fn setpoint(&self, now_ms: u64) -> Option<f32> {
        self.setpoint.valid(&self.config, now_ms)
    }

    pub fn heat_setpoint(&self) -> f32 {
        self.heat_setpoint
            .or_else(|| self.stored_rail(&heat_setpoint_key(&self.device.id)))
            .unwrap_or(self.config.default_heat_setpoint)
    }

    pub fn cool_setpoint(&self) -> f32 {
        self.cool_setpoint
            .or_else(|| self.stored_rail(&cool_setpoint_key(&self.device.id)))
            .unwrap_or(self.config.default_cool_setpoint)
    }

    pub fn target_temp(&self, now_ms: u64) -> f32 {
        let default = match self.mode {
            ClimateMode::Cool => self.cool_setpoint(),
            _ => self.heat_setpoint(),
        };
        self.setpoint.get_or(&self.config, now_ms, default)
    }

    fn advertising(&self) -> bool {
        self.status_topic.is_some() && self.sink.is_some()
    }

    pub fn is_connected(&self, now_ms: u64) -> bool {
        !self.advertising() || self.liveness.is_connected(&self.config, now_ms)
    }

    pub fn in_startup_grace(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) < self.config.startup_grace_ms
    }

    pub fn apply(&mut self, command: Command, now_ms: u64) -> Vec<EngineOutput> {
        match command {
            Command::SetMode(mode) => return self.set_mode(mode, now_ms),
            Command::RequestAction(action) => return self.request_action(action, now_ms),
            Command::SetSetpoint(value) => {
                self.set_setpoint(value, now_ms);
            }
            Command::ClearSetpoint => self.clear_setpoint(),
            Command::SetHeatSetpoint(value) => {
                self.set_heat_setpoint(value);
            }
            Command::SetCoolSetpoint(value) => {
                self.set_cool_setpoint(value);
            }
            Command::SetOverride(active) => self.set_override(active),
            Command::UpdateTemperature(raw) => {
                self.update_temperature(raw, now_ms);
            }
        }
        Vec::new()
    }

    pub fn set_mode(&mut self, mode: ClimateMode, now_ms: u64) -> Vec<EngineOutput> {
        let mode = match mode {
            ClimateMode::Off => return self.turn_off(now_ms),
            ClimateMode::Heat if !self.config.has_heating => return Vec::new(),
            ClimateMode::Cool if !self.config.has_cooling => return Vec::new(),
            ClimateMode::Auto if !self.config.auto_setpoint() => self.config.default_mode(),
            other => other,
        };

        if self.config.auto_setpoint() {
            let rail = match mode {
                ClimateMode::Heat => Some(self.heat_setpoint()),
                ClimateMode::Cool => Some(self.cool_setpoint()),
                _ => None,
            };
            if let Some(rail) = rail {
                self.setpoint.load(rail, now_ms);
            }
        }

        self.mode = mode;
        self.timers.reset();
        // Run stamps are left to the next evaluation cycle.
        let demanded = self.demanded_action(now_ms);
        self.action = if self.timers.swap_allowed(&self.config, demanded, now_ms) {
            demanded
        } else {
            ClimateAction::None
        };

        let mut outputs = vec![EngineOutput::Update(self.update(now_ms))];
        self.publish_status(now_ms, &mut outputs);
        self.refresh_display(now_ms);
        outputs.push(EngineOutput::Status(self.display.clone()));
        outputs
    }

    pub fn request_action(&mut self, action: ClimateAction, now_ms: u64) -> Vec<EngineOutput> {
        match action {
            ClimateAction::Heating if self.config.has_heating => {
                self.set_mode(ClimateMode::Heat, now_ms)
            }
            ClimateAction::Cooling if self.config.has_cooling => {
                self.set_mode(ClimateMode::Cool, now_ms)
            }
            ClimateAction::None => self.set_mode(ClimateMode::Auto, now_ms),
            _ => Vec::new(),
        }
    }

    pub fn set_setpoint(&mut self, value: f32, now_ms: u64) -> bool {
        self.setpoint.set(&self.config, value, now_ms)
    }

    pub fn clear_setpoint(&mut self) {
        self.setpoint.clear();
    }

    pub fn set_heat_setpoint(&mut self, value: f32) -> bool {
        if !self.config.in_range(value) {
            return false;
        }
        self.heat_setpoint = Some(value);
        let key = heat_setpoint_key(&self.device.id);
        self.checkpoint.set(&key, value);
        true
    }

    pub fn set_cool_setpoint(&mut self, value: f32) -> bool {
        if !self.config.in_range(value) {
            return false;
        }
        self.cool_setpoint = Some(value);
        let key = cool_setpoint_key(&self.device.id);
        self.checkpoint.set(&key, value);
        true
    }

    pub fn set_override(&mut self, active: bool) {
        self.override_active = active;
    }

    pub fn update_temperature(&mut self, raw: f32, now_ms: u64) -> bool {
        self.temperature.update(&self.config, raw, now_ms)
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<EngineOutput> {
        let mut outputs = Vec::new();

        if self.in_startup_grace(now_ms) || !self.is_connected(now_ms) {
            // Equipment is not driven while gated; a later cycle starts a new run.
            self.action = ClimateAction::None;
            self.timers.reset();
            self.refresh_display(now_ms);
            outputs.push(EngineOutput::Status(self.display.clone()));
            // Heartbeat so a disconnected engine can become live again.
            self.publish_status(now_ms, &mut outputs);
            return outputs;
        }

        let demanded = self.demanded_action(now_ms);
        self.action = self.timers.regulate(&self.config, demanded, now_ms);
        outputs.push(EngineOutput::Update(self.update(now_ms)));
        self.publish_status(now_ms, &mut outputs);

        self.refresh_display(now_ms);
        outputs.push(EngineOutput::Status(self.display.clone()));
        outputs
    }

    pub fn update(&self, now_ms: u64) -> ClimateUpdate {
        ClimateUpdate {
            device_id: self.device.id.clone(),
            name: self.device.name.clone(),
            mode: self.mode,
            temperature: self.temperature.value(),
            action: self.action,
            heat_setpoint: self.heat_setpoint(),
            cool_setpoint: self.cool_setpoint(),
            connected: self.is_connected(now_ms),
        }
    }

    fn turn_off(&mut self, now_ms: u64) -> Vec<EngineOutput> {
        self.mode = ClimateMode::Off;
        self.setpoint.clear();
        self.override_active = false;
        self.action = ClimateAction::None;
        self.timers.reset();
        self.refresh_display(now_ms);

        vec![
            EngineOutput::Update(self.update(now_ms)),
            EngineOutput::Status(self.display.clone()),
        ]
    }

    fn demanded_action(&self, now_ms: u64) -> ClimateAction {
        let Some(current) = self.temperature.value() else {
            return ClimateAction::None;
        };

        let action = calculate_action(
            current,
            self.target_temp(now_ms),
            self.heat_setpoint(),
            self.cool_setpoint(),
            self.config.tolerance,
        );

        match (self.mode, action) {
            (ClimateMode::Off, _)
            | (ClimateMode::Heat, ClimateAction::Cooling)
            | (ClimateMode::Cool, ClimateAction::Heating) => ClimateAction::None,
            (_, action) => action,
        }
    }

    fn publish_status(&mut self, now_ms: u64, outputs: &mut Vec<EngineOutput>) {
        if !self.advertising() {
            return;
        }

        let payload = match serde_json::to_vec(&self.update(now_ms)) {
            Ok(payload) => payload,
            Err(err) => {
                outputs.push(EngineOutput::PublishFailed(err.to_string()));
                return;
            }
        };

        let (Some(topic), Some(sink)) = (self.status_topic.as_deref(), self.sink.as_mut()) else {
            return;
        };
        match sink.publish(topic, &payload) {
            Ok(()) => self.liveness.mark_sent(now_ms),
            Err(err) => outputs.push(EngineOutput::PublishFailed(err.to_string())),
        }
    }

    fn refresh_display(&mut self, now_ms: u64) {
        self.display = if self.in_startup_grace(now_ms) {
            DisplayStatus::starting()
        } else if !self.is_connected(now_ms) {
            DisplayStatus::disconnected()
        } else {
            DisplayStatus::for_state(self.mode, self.action, self.temperature.value())
        };
    }

    fn stored_rail(&self, key: &str) -> Option<f32> {
        self.checkpoint
            .get(key)
            .filter(|value| self.config.in_range(*value))
    }
}
