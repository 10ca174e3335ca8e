use thiserror::Error;
use tracing::{debug, instrument};

use crate::update::{InstallError, Installer};

use super::request::{Request, Transport, TransportError};
use super::response::{Classifier, Outcome, ParseError};

/// Errors that can occur during a single update check
#[derive(Debug, Error)]
pub enum PollError {
    #[error("failed to reach update server: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to parse server response: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to install update: {0}")]
    Actuation(#[from] InstallError),
}

/// Success and failure counts for update checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub success_count: u64,
    pub error_count: u64,
}

impl PollMetrics {
    /// Returns the total number of polls (successful + failed).
    pub fn total_polls(&self) -> u64 {
        self.success_count + self.error_count
    }

    /// Returns the success rate as a percentage (0.0 to 100.0).
    ///
    /// Returns 0.0 if there have been no polls yet.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_polls();
        if total == 0 {
            0.0
        } else {
            (self.success_count as f64 / total as f64) * 100.0
        }
    }

    pub(crate) fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.success_count += 1,
            Err(_) => self.error_count += 1,
        }
    }
}

/// Check the server for updates once and act on the response.
///
/// The outcome is only acted upon if the response could be classified, so
/// nothing is installed on a transport or parse failure.
#[instrument(skip_all, fields(request = %request))]
pub async fn poll_once<T, I>(
    request: &Request,
    transport: &T,
    classify: Classifier,
    installer: &I,
) -> Result<Outcome, PollError>
where
    T: Transport,
    I: Installer,
{
    let response = transport.send(request).await?;
    let outcome = classify(response.status, &response.body)?;
    debug!("acting on {outcome:?}");
    outcome.act(installer).await?;

    Ok(outcome)
}
