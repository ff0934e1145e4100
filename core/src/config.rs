//! Configuration
//!
//! Responsible for setting default config, reading configs and setting.
//!
//! The following config items can be set:
//!  - IgnoreStaleBuilds: Set to 1 to drop build results tagged with an id older than the most
//!    recent build request, 0 to apply every result as it arrives. Defaults to 1.
//!  - LogLevel: The most verbose log level shown, from 1 (CRITICAL) to 5 (DEBUG). Defaults to
//!    4 (INFO).

use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Config<'a> {
    config: HashMap<&'a str, i64>,
}

impl<'a> Config<'a> {
    pub fn new() -> Self {
        let mut config = HashMap::new();
        config.insert("IgnoreStaleBuilds", 1);
        config.insert("LogLevel", 4);
        Config { config }
    }

    /// Get a config items value
    pub fn get_config(&self, key: &str) -> Option<i64> {
        self.config.get(key).copied()
    }

    /// Set a config items value, returns false if there's no such item
    pub fn set_config(&mut self, key: &str, value: i64) -> bool {
        match self.config.get_mut(key) {
            Some(s) => {
                *s = value;
                true
            }
            None => false,
        }
    }
}

impl<'a> Default for Config<'a> {
    fn default() -> Self {
        Config::new()
    }
}
