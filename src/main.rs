use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use update_poller::config::{DEFAULT_SERVER_ADDRESS, read_server_address};
use update_poller::remote::{HttpTransport, Transport};
use update_poller::update::{CommandInstaller, DryRunInstaller, Installer};
use update_poller::util::http::Uri;
use update_poller::{Config, Daemon, Shutdown};

mod cli;

fn initialize_tracing() -> Result<()> {
    // Initialize tracing subscriber for human-readable logs
    tracing_subscriber::registry()
        .with(
            // Use some log defaults. These can be overriden using
            // RUST_LOG
            EnvFilter::try_from_default_env().or_else(|_| -> Result<EnvFilter> {
                Ok(EnvFilter::default()
                    .add_directive("debug".parse()?)
                    .add_directive("hyper=error".parse()?)
                    .add_directive("reqwest=info".parse()?))
            })?,
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .event_format(fmt::format().compact().with_target(false).without_time()),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    initialize_tracing()?;

    let cli = cli::parse();
    debug!("{:#?}", cli);

    // Prefer the address given on the command line, then the one on the
    // provisioning file
    let server_address = match cli.server_address.clone() {
        Some(address) => address,
        None => read_server_address(&cli.server_address_file)
            .await?
            .unwrap_or_else(|| Uri::from_static(DEFAULT_SERVER_ADDRESS)),
    };

    let config = Config::new(cli.poll_interval, server_address, cli.device_id.clone())
        .context("invalid configuration")?;
    info!(
        "using server {} for device {}",
        config.server_address(),
        config.device_id()
    );

    let transport = HttpTransport::new(cli.request_timeout)?;

    if let Some(command) = cli.install_command {
        start_daemon(&config, &transport, &CommandInstaller::new(command)).await;
    } else {
        warn!("no install command configured, updates will only be logged");
        start_daemon(&config, &transport, &DryRunInstaller).await;
    }

    Ok(())
}

#[instrument(name = "update-poller", skip_all)]
async fn start_daemon<T, I>(config: &Config, transport: &T, installer: &I)
where
    T: Transport,
    I: Installer,
{
    let (mut daemon, shutdown) = Daemon::new(config, transport, installer);
    tokio::spawn(stop_on_signal(shutdown));

    daemon.run().await;
    info!("daemon stopped");
}

/// Trigger the shutdown on SIGINT or SIGTERM
async fn stop_on_signal(shutdown: Shutdown) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("failed to listen for ctrl-c: {e}");
                return;
            }
        }
        _ = terminate => {}
    }

    info!("received stop signal");
    shutdown.trigger();
}
