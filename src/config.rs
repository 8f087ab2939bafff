// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file looked up by [`SceneConfig::load`]
pub const CONFIG_FILE: &str = "meshcollide.toml";

const MARGIN_ENV: &str = "MESHCOLLIDE_SECURITY_MARGIN";
const MAX_CONTACTS_ENV: &str = "MESHCOLLIDE_MAX_CONTACTS";

/// Query settings shared by every collision query of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Padding distance below which near misses count as contacts
    pub security_margin: f64,
    /// Upper bound on contacts reported by one query
    pub max_contacts: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            security_margin: 0.005,
            max_contacts: 100_000,
        }
    }
}

impl SceneConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SceneConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `meshcollide.toml` from the working directory, with environment
    /// variable overrides
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load `path` when it exists, else defaults, then apply overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MESHCOLLIDE_SECURITY_MARGIN` and `MESHCOLLIDE_MAX_CONTACTS`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(margin) = std::env::var(MARGIN_ENV) {
            self.security_margin = margin
                .parse()
                .with_context(|| format!("Invalid {}: {}", MARGIN_ENV, margin))?;
        }

        if let Ok(max) = std::env::var(MAX_CONTACTS_ENV) {
            self.max_contacts = max
                .parse()
                .with_context(|| format!("Invalid {}: {}", MAX_CONTACTS_ENV, max))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.security_margin.is_finite() || self.security_margin < 0.0 {
            bail!(
                "security_margin must be a finite, non-negative distance (got {})",
                self.security_margin
            );
        }
        if self.max_contacts == 0 {
            bail!("max_contacts must be at least 1");
        }
        Ok(())
    }
}
