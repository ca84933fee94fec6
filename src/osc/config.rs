//! OSC configuration — where the synth server listens.

use serde::{Deserialize, Serialize};

/// Address of the synth server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// UDP port of the synth server.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    57110
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
