use serde::{Deserialize, Serialize};

use crate::env_parse;

/// The target layout only exists at this width or below
fn default_max_width_px() -> u32 {
    767
}

fn default_toast_duration_ms() -> u64 {
    3000
}

fn default_repair_delay_ms() -> u64 {
    300
}

fn default_max_repair_attempts() -> u32 {
    3
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    /// 0 disables the viewport check
    #[serde(default = "default_max_width_px")]
    pub max_width_px: u32,
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    /// Time given to the host page to finish its own re-render
    #[serde(default = "default_repair_delay_ms")]
    pub repair_delay_ms: u64,
    #[serde(default = "default_max_repair_attempts")]
    pub max_repair_attempts: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_width_px: default_max_width_px(),
            toast_duration_ms: default_toast_duration_ms(),
            repair_delay_ms: default_repair_delay_ms(),
            max_repair_attempts: default_max_repair_attempts(),
        }
    }
}

impl UiConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            max_width_px: env_parse("MAX_WIDTH_PX").unwrap_or(defaults.max_width_px),
            ..defaults
        }
    }

    pub fn viewport_supported(&self, width: u32) -> bool {
        self.max_width_px == 0 || width <= self.max_width_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_gate() {
        let ui = UiConfig::default();
        assert!(ui.viewport_supported(767));
        assert!(!ui.viewport_supported(800));
    }

    #[test]
    fn test_viewport_gate_disabled() {
        let ui = UiConfig {
            max_width_px: 0,
            ..UiConfig::default()
        };
        assert!(ui.viewport_supported(4000));
    }
}
