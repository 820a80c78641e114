//! CLI utility functions.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::ServerSettings;
use crate::jsonrpc::TransportConfig;

/// Load and validate settings (defaults < file < environment)
pub fn load_settings(config_path: Option<&Path>) -> Result<ServerSettings> {
    if let Some(path) = config_path {
        info!("Using custom config file: {}", path.display());
    }
    let settings = ServerSettings::load(config_path)?;
    settings.validate()?;
    Ok(settings)
}

/// Transport from command-line flags, if any were given. A socket path on
/// its own implies the socket transport.
pub fn transport_override(
    settings: &ServerSettings,
    transport: Option<&str>,
    socket_path: Option<&str>,
) -> Result<Option<TransportConfig>> {
    let transport = match (transport, socket_path) {
        (None, None) => return Ok(None),
        (Some(transport), _) => transport,
        (None, Some(_)) => "socket",
    };
    let socket_path = socket_path.or(settings.server.socket_path.as_deref());
    Ok(Some(TransportConfig::from_parts(transport, socket_path)?))
}

/// Command-line level first, then whatever the configuration says
pub fn effective_log_level(cli_level: Option<&str>, config_path: Option<&Path>) -> Option<String> {
    cli_level
        .map(str::to_string)
        .or_else(|| ServerSettings::load(config_path).ok().map(|s| s.server.log_level))
}
