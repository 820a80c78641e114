//! CLI command implementations.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::ServerSettings;
use crate::server::start_server;

use super::utils::{load_settings, transport_override};

/// Start the DRCS JSON-RPC server
pub async fn serve(config_path: Option<PathBuf>, transport: Option<String>, socket_path: Option<String>) -> Result<()> {
    info!("Loading configuration...");
    let settings = load_settings(config_path.as_deref())?;

    let transport_config = transport_override(&settings, transport.as_deref(), socket_path.as_deref())?;
    if let Some(ref transport_config) = transport_config {
        info!("Transport overridden from command line: {}", transport_config.description());
    }

    start_server(settings, transport_config).await?;

    info!("DRCS server stopped");
    Ok(())
}

/// Initialize default configuration
pub async fn init(force: bool) -> Result<()> {
    let config_path = ServerSettings::config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_content = ServerSettings::default().to_toml_redacted()?;
    std::fs::write(&config_path, toml_content)?;

    println!("✓ Configuration initialized at {:?}", config_path);
    Ok(())
}

/// Manage configuration (show, validate)
pub async fn config(config_path: Option<PathBuf>, show: bool, validate: bool) -> Result<()> {
    if show {
        let settings = ServerSettings::load(config_path.as_deref())?;
        println!("{}", settings.to_toml_redacted()?);
    }

    if validate {
        let settings = ServerSettings::load(config_path.as_deref()).map_err(|e| {
            error!("Failed to load configuration: {:#}", e);
            e.context("Failed to load configuration")
        })?;
        settings.validate().map_err(|e| {
            error!("Configuration validation failed: {}", e);
            e.context("Configuration validation failed")
        })?;
        println!("✓ Configuration is valid");
    }

    Ok(())
}

/// Show version information
pub async fn version() -> Result<()> {
    println!("DRCS {}", env!("CARGO_PKG_VERSION"));
    println!("Built with Rust {}", rustc_version::version()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_config_validate_fails_on_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\ntransport = \"carrier-pigeon\"").unwrap();

        let err = config(Some(file.path().to_path_buf()), false, true).await.unwrap_err();
        assert!(format!("{:#}", err).contains("carrier-pigeon"));
    }

    #[tokio::test]
    async fn test_config_validate_accepts_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\ninterval_secs = 5").unwrap();

        assert!(config(Some(file.path().to_path_buf()), false, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_config_validate_fails_on_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(config(Some(dir.path().join("absent.toml")), false, true).await.is_err());
    }
}
