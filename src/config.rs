use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::DeviceId;
use crate::util::http::{InvalidUriError, Uri};

/// Check the server for updates every 3 minutes by default
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(180);

/// Server address used when none is configured
pub const DEFAULT_SERVER_ADDRESS: &str = "https://127.0.0.1";

/// File the device provisioning tools write the server address to
pub const DEFAULT_SERVER_ADDRESS_FILE: &str = "/data/serveraddress";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("invalid server address: {0}")]
    InvalidServerAddress(#[from] InvalidUriError),

    #[error("server address '{0}' cannot have a query string")]
    ServerAddressWithQuery(Uri),

    #[error("device id cannot be empty")]
    EmptyDeviceId,

    #[error("device id '{0}' cannot be used as a URI path segment")]
    InvalidDeviceId(DeviceId),
}

/// Daemon configuration.
///
/// Values are validated on creation and cannot change afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    poll_interval: Duration,
    server_address: Uri,
    device_id: DeviceId,
}

impl Config {
    pub fn new(
        poll_interval: Duration,
        server_address: Uri,
        device_id: DeviceId,
    ) -> Result<Self, ConfigError> {
        if poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        // The request path replaces the path and query of the address
        if server_address.query().is_some() {
            return Err(ConfigError::ServerAddressWithQuery(server_address));
        }

        if device_id.is_empty() {
            return Err(ConfigError::EmptyDeviceId);
        }

        // The id goes verbatim into the request path
        if device_id.contains(['/', '?', '#'])
            || Uri::from_parts(server_address.clone(), &format!("/{device_id}"), None).is_err()
        {
            return Err(ConfigError::InvalidDeviceId(device_id));
        }

        Ok(Self {
            poll_interval,
            server_address,
            device_id,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn server_address(&self) -> &Uri {
        &self.server_address
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

/// Read the server address from `path`.
///
/// Only the first line of the file is used. Returns `None` if the file does
/// not exist, cannot be read, or is empty.
pub async fn read_server_address(path: &Path) -> Result<Option<Uri>, ConfigError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if matches!(e.kind(), std::io::ErrorKind::NotFound) => {
            debug!("no server address file at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            warn!("failed to read server address from {}: {e}", path.display());
            return Ok(None);
        }
    };

    let address = contents.lines().next().unwrap_or_default().trim();
    if address.is_empty() {
        warn!("server address file {} is empty", path.display());
        return Ok(None);
    }

    Ok(Some(address.parse()?))
}
