pub mod action;
pub mod checkpoint;
pub mod climate;
pub mod command;
pub mod config;
pub mod protection;
pub mod setpoint;
pub mod temperature;
pub mod topics;
pub mod types;

pub use action::calculate_action;
pub use checkpoint::{Checkpoint, MemoryCheckpoint, StatusSink};
pub use climate::{ClimateEngine, EngineOutput};
pub use command::{command_from_topic, Command, InputEvent};
pub use config::{ClimateConfig, ConfigError, DeviceConfig, RuntimeConfig, TransportConfig};
pub use topics::*;
pub use types::{ClimateAction, ClimateMode, ClimateUpdate, DisplayStatus, StatusFill, StatusShape};
