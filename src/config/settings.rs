use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::gateway::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::store::fixtures::DEFAULT_NGO_ID;

/// Server-wide configuration loaded from config.toml and environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub simulation: SimulationConfig,
    pub seed: SeedConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// "stdio" or "socket"
    pub transport: String,
    pub socket_path: Option<String>,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Synthetic incident feed that runs while a session is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub base_lat: f64,
    pub base_lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// NGO profile acted on by the NGO portal
    pub ngo_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            socket_path: Some("/tmp/drcs.sock".to_string()),
            log_level: "info".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 45,
            base_lat: 34.0,
            base_lng: -118.0,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ngo_id: DEFAULT_NGO_ID.to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            analysis: AnalysisConfig::default(),
            simulation: SimulationConfig::default(),
            seed: SeedConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ServerSettings {
    /// Defaults, then the config file (if any), then environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Some(default_path)
                } else {
                    debug!("No config file at {}, using defaults", default_path.display());
                    None
                }
            }
        };

        let mut settings = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        settings.apply_env_overrides()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Values that do not parse
    /// are errors rather than silently keeping the previous setting.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DRCS_LOG_LEVEL") {
            self.server.log_level = val;
        }

        if let Some(val) = lookup("DRCS_TRANSPORT") {
            self.server.transport = val;
        }

        if let Some(val) = lookup("DRCS_SOCKET_PATH") {
            self.server.socket_path = Some(val);
        }

        if let Some(val) = lookup("DRCS_ANALYSIS_URL") {
            self.analysis.base_url = val;
        }

        if let Some(val) = lookup("DRCS_ANALYSIS_MODEL") {
            self.analysis.model = val;
        }

        if let Some(val) = lookup("DRCS_API_KEY").or_else(|| lookup("API_KEY")) {
            self.analysis.api_key = Some(val);
        }

        if let Some(val) = lookup("DRCS_SIMULATION_INTERVAL") {
            self.simulation.interval_secs = val
                .trim()
                .parse()
                .with_context(|| format!("Invalid DRCS_SIMULATION_INTERVAL {:?}", val))?;
        }

        if let Some(val) = lookup("DRCS_SIMULATION_ENABLED") {
            self.simulation.enabled = match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => anyhow::bail!("Invalid DRCS_SIMULATION_ENABLED {:?}", val),
            };
        }

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Ok(custom_path) = std::env::var("DRCS_CONFIG_PATH") {
            PathBuf::from(custom_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("drcs")
                .join("config.toml")
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.server.transport.as_str() {
            "stdio" => {}
            "socket" => {
                let path = self.server.socket_path.as_deref().unwrap_or_default();
                if path.is_empty() {
                    anyhow::bail!("Socket path is required when using socket transport");
                }
            }
            other => anyhow::bail!("Unsupported transport type: {}", other),
        }

        if self.analysis.timeout_secs == 0 {
            anyhow::bail!("Analysis timeout must be greater than 0");
        }

        if self.simulation.interval_secs == 0 {
            anyhow::bail!("Simulation interval must be greater than 0");
        }

        // Synthetic reports land up to one degree north and west of the base
        let (lat, lng) = (self.simulation.base_lat, self.simulation.base_lng);
        if !(-90.0..=89.0).contains(&lat) {
            anyhow::bail!("Simulation base latitude {} must be within [-90, 89]", lat);
        }
        if !(-179.0..=180.0).contains(&lng) {
            anyhow::bail!("Simulation base longitude {} must be within [-179, 180]", lng);
        }

        if self.session.ngo_id.trim().is_empty() {
            anyhow::bail!("Session NGO id cannot be empty");
        }

        Ok(())
    }

    /// TOML rendering with the API key left out
    pub fn to_toml_redacted(&self) -> Result<String> {
        let mut copy = self.clone();
        copy.analysis.api_key = None;
        Ok(toml::to_string_pretty(&copy)?)
    }
}
