pub const SUFFIX_MODE_SET: &str = "/mode/set";
pub const SUFFIX_TEMPERATURE_SET: &str = "/temperature/set";
pub const SUFFIX_STATUS: &str = "/status";

pub fn status_topic(base: &str) -> String {
    format!("{base}{SUFFIX_STATUS}")
}

pub fn mode_set_topic(base: &str) -> String {
    format!("{base}{SUFFIX_MODE_SET}")
}

pub fn temperature_set_topic(base: &str) -> String {
    format!("{base}{SUFFIX_TEMPERATURE_SET}")
}
