use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl ClimateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Auto => "auto",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" => Self::Off,
            "heat" => Self::Heat,
            "cool" => Self::Cool,
            _ => Self::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateAction {
    Heating,
    Cooling,
    None,
}

impl ClimateAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heating => "heating",
            Self::Cooling => "cooling",
            Self::None => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "heating" => Some(Self::Heating),
            "cooling" => Some(Self::Cooling),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Heating => Self::Cooling,
            Self::Cooling => Self::Heating,
            Self::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateUpdate {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub name: String,
    pub mode: ClimateMode,
    pub temperature: Option<f32>,
    pub action: ClimateAction,
    #[serde(rename = "heatSetpoint")]
    pub heat_setpoint: f32,
    #[serde(rename = "coolSetpoint")]
    pub cool_setpoint: f32,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFill {
    Red,
    Green,
    Yellow,
    Blue,
    Grey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Dot,
    Ring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    pub fill: StatusFill,
    pub shape: StatusShape,
    pub text: String,
}

impl DisplayStatus {
    pub fn starting() -> Self {
        Self {
            fill: StatusFill::Yellow,
            shape: StatusShape::Ring,
            text: "starting".to_string(),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            fill: StatusFill::Red,
            shape: StatusShape::Ring,
            text: "disconnected".to_string(),
        }
    }

    pub fn for_state(mode: ClimateMode, action: ClimateAction, temperature: Option<f32>) -> Self {
        let (fill, label) = match (mode, action) {
            (ClimateMode::Off, _) => (StatusFill::Grey, "off"),
            (_, ClimateAction::Heating) => (StatusFill::Red, "heating"),
            (_, ClimateAction::Cooling) => (StatusFill::Blue, "cooling"),
            (_, ClimateAction::None) => (StatusFill::Green, "idle"),
        };
        let text = match (mode, temperature) {
            (ClimateMode::Off, _) => label.to_string(),
            (_, Some(temp)) => format!("{} {label} {temp:.1}°", mode.as_str()),
            (_, None) => format!("{} {label}", mode.as_str()),
        };
        Self {
            fill,
            shape: StatusShape::Dot,
            text,
        }
    }
}
