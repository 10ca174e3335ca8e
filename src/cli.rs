use clap::Parser;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use update_poller::config::DEFAULT_SERVER_ADDRESS_FILE;
use update_poller::types::DeviceId;
use update_poller::util::http::Uri;

fn parse_duration(s: &str) -> Result<Duration, ParseIntError> {
    let millis: u64 = s.parse()?;
    Ok(Duration::from_millis(millis))
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)] // read from Cargo.toml
pub struct Cli {
    /// Update server address, eg. "https://updates.example.com"
    #[arg(
        env = "UPDATE_POLLER_SERVER_ADDRESS",
        long = "server-address",
        value_name = "uri"
    )]
    pub server_address: Option<Uri>,

    /// File to read the server address from if none is given
    #[arg(
        env = "UPDATE_POLLER_SERVER_ADDRESS_FILE",
        long = "server-address-file",
        value_name = "path",
        default_value = DEFAULT_SERVER_ADDRESS_FILE
    )]
    pub server_address_file: PathBuf,

    /// Identifier of this device on the update server
    #[arg(
        env = "UPDATE_POLLER_DEVICE_ID",
        long = "device-id",
        value_name = "id",
        default_value = DeviceId::DEFAULT
    )]
    pub device_id: DeviceId,

    /// Update check interval in milliseconds
    #[arg(
        env = "UPDATE_POLLER_POLL_INTERVAL_MS",
        long = "poll-interval-ms",
        value_name = "ms",
        value_parser = parse_duration,
        default_value = "180000"
    )]
    pub poll_interval: Duration,

    /// Update server request timeout in milliseconds
    #[arg(
        env = "UPDATE_POLLER_REQUEST_TIMEOUT_MS",
        long = "request-timeout-ms",
        value_name = "ms",
        value_parser = parse_duration,
        default_value = "59000"
    )]
    pub request_timeout: Duration,

    /// Command to install an update with, it receives the image URI as its
    /// only argument. Updates are only logged if not set
    #[arg(
        env = "UPDATE_POLLER_INSTALL_COMMAND",
        long = "install-command",
        value_name = "path"
    )]
    pub install_command: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Parser::parse()
}
