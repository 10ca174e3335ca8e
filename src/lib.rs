//! Periodic update check for devices managed by a remote server.
//!
//! A [`Daemon`] polls the server on a fixed interval, classifies each
//! response into an [`Outcome`](remote::Outcome) and installs updates
//! through an [`Installer`](update::Installer).

pub mod config;
pub mod daemon;
pub mod remote;
pub mod types;
pub mod update;
pub mod util;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use daemon::Daemon;
pub use util::shutdown::Shutdown;
