use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{Span, debug, error, field, info, instrument};

use crate::config::Config;
use crate::remote::{Classifier, PollMetrics, Transport, build_request, classify, poll_once};
use crate::update::Installer;
use crate::util::shutdown::Shutdown;

/// Periodic update check.
///
/// The daemon borrows its configuration and capabilities from the caller and
/// owns the timer and stop signal for the polling loop.
pub struct Daemon<'a, T, I> {
    config: &'a Config,
    transport: &'a T,
    installer: &'a I,
    classify: Classifier,
    shutdown: Shutdown,
    metrics: PollMetrics,
}

impl<'a, T, I> Daemon<'a, T, I>
where
    T: Transport,
    I: Installer,
{
    /// Create a new daemon along with the handle to stop it
    pub fn new(config: &'a Config, transport: &'a T, installer: &'a I) -> (Self, Shutdown) {
        let shutdown = Shutdown::new();
        let daemon = Self {
            config,
            transport,
            installer,
            classify,
            shutdown: shutdown.clone(),
            metrics: PollMetrics::default(),
        };
        (daemon, shutdown)
    }

    /// Use a different function to interpret server responses
    pub fn with_classifier(self, classify: Classifier) -> Self {
        Self { classify, ..self }
    }

    pub fn metrics(&self) -> PollMetrics {
        self.metrics
    }

    /// Poll the server every configured interval until the shutdown handle
    /// is triggered.
    ///
    /// Polls run one at a time and a failed poll does not stop the loop.
    /// The stop signal is only checked between polls, a poll that already
    /// started runs to completion.
    #[instrument(name = "daemon", skip_all, fields(device = %self.config.device_id()))]
    pub async fn run(&mut self) {
        let Self {
            config,
            transport,
            installer,
            classify,
            shutdown,
            metrics,
        } = self;

        let period = config.poll_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        // A poll that outlasts the period leaves at most one tick pending
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("checking for updates every {period:?}");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("timer expired, checking for updates");
                    poll(*config, *transport, *classify, *installer, metrics).await;
                }

                _ = shutdown.wait() => {
                    debug!("stopping daemon");
                    break;
                }
            }
        }
    }
}

/// Run a single update check, logging any failure
#[instrument(skip_all, fields(success_rate = field::Empty))]
async fn poll<T, I>(
    config: &Config,
    transport: &T,
    classify: Classifier,
    installer: &I,
    metrics: &mut PollMetrics,
) where
    T: Transport,
    I: Installer,
{
    let request = build_request(config);
    let result = poll_once(&request, transport, classify, installer).await;
    metrics.record(&result);
    if let Err(e) = result {
        error!("update check failed: {e}");
    }
    Span::current().record("success_rate", metrics.success_rate());
}
