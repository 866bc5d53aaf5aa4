// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file support for the pre-bind CLI.
//!
//! Defaults are read from `~/.config/bosh-prebind/config.toml`; any value
//! given on the command line overrides the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional defaults loaded from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Default JID to pre-bind
    pub jid: Option<String>,
    /// Default BOSH connection-manager endpoint
    pub service_url: Option<String>,
    /// BOSH wait hint
    pub wait: Option<u32>,
    /// BOSH hold hint
    pub hold: Option<u32>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Path of the config file, if a config directory exists on this system.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bosh-prebind").join("config.toml"))
    }

    /// Load the config file; a missing file yields all-default values.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
