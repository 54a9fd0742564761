use serde::{Deserialize, Serialize};

use crate::env_parse;

fn default_url_prefix() -> String {
    "dictionary.reverso.net/english-definition/".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_viewport_width() -> u32 {
    767
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PageConfig {
    /// Only pages whose URL contains this are handled
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// How often watch mode reloads the page
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            poll_interval_ms: default_poll_interval_ms(),
            viewport_width: default_viewport_width(),
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            url_prefix: defaults.url_prefix,
            poll_interval_ms: env_parse("PAGE_POLL_MS").unwrap_or(defaults.poll_interval_ms),
            viewport_width: env_parse("VIEWPORT_WIDTH").unwrap_or(defaults.viewport_width),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        url.contains(&self.url_prefix)
    }
}
