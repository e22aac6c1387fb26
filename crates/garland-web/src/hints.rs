//! Translation of raw navigator/window readings into `DeviceHints`.

use garland_core::DeviceHints;

const MOBILE_UA_MARKERS: [&str; 5] = ["android", "iphone", "ipad", "ipod", "mobile"];

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS.iter().any(|m| ua.contains(m))
}

/// Raw browser values. Browsers that hide a value report it as zero/absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigatorReadings {
    pub device_pixel_ratio: f64,
    pub hardware_concurrency: f64,
    pub device_memory: Option<f64>,
    pub user_agent: String,
    pub touch_capable: bool,
}

impl NavigatorReadings {
    pub fn to_hints(&self) -> DeviceHints {
        let defaults = DeviceHints::default();
        let cores = if self.hardware_concurrency.is_finite() && self.hardware_concurrency >= 1.0 {
            self.hardware_concurrency as u32
        } else {
            defaults.logical_cores
        };
        let memory = match self.device_memory {
            Some(gb) if gb.is_finite() && gb > 0.0 => gb as f32,
            _ => defaults.memory_gb,
        };
        let ratio = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio as f32
        } else {
            defaults.pixel_ratio
        };
        DeviceHints {
            pixel_ratio: ratio,
            logical_cores: cores,
            memory_gb: memory,
            is_mobile: is_mobile_user_agent(&self.user_agent) || self.touch_capable,
        }
    }
}
