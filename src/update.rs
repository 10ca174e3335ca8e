//! Installing updates received from the server

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::remote::Outcome;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to run install command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("install command failed with {0}")]
    Exit(ExitStatus),

    #[error("{0}")]
    Other(String),
}

/// Capability to install an update image on the device.
///
/// Installing may take a long time, the daemon waits for it to finish before
/// checking for updates again.
pub trait Installer: Send + Sync {
    fn install(&self, image_uri: &str) -> impl Future<Output = Result<(), InstallError>> + Send;
}

/// Installs updates by running an external command with the image URI as
/// its only argument
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: PathBuf,
}

impl CommandInstaller {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Installer for CommandInstaller {
    #[instrument(name = "install", skip(self))]
    async fn install(&self, image_uri: &str) -> Result<(), InstallError> {
        info!("running {}", self.program.display());
        let status = tokio::process::Command::new(&self.program)
            .arg(image_uri)
            .kill_on_drop(true)
            .status()
            .await?;

        if !status.success() {
            return Err(InstallError::Exit(status));
        }

        info!("update installed");
        Ok(())
    }
}

/// Only logs the updates it is given
#[derive(Debug, Clone, Default)]
pub struct DryRunInstaller;

impl Installer for DryRunInstaller {
    async fn install(&self, image_uri: &str) -> Result<(), InstallError> {
        info!("dry run: skipping install of {image_uri}");
        Ok(())
    }
}

impl Outcome {
    /// Perform the action associated with the outcome
    pub async fn act<I: Installer>(&self, installer: &I) -> Result<(), InstallError> {
        match self {
            Outcome::HaveUpdate(update) => installer.install(&update.image_uri).await,
            Outcome::NoUpdate => Ok(()),
            Outcome::ServerError => {
                warn!("server reported an error for the update request");
                Ok(())
            }
        }
    }
}
