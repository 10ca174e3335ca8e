//! Test doubles for the transport and installer capabilities

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::remote::{RawResponse, Request, Transport, TransportError};
use crate::update::{InstallError, Installer};

/// Replies with a fixed list of responses, then with transport errors.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<Request>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<RawResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Delay every reply by `latency`
    pub fn with_latency(self, latency: Duration) -> Self {
        Self { latency, ..self }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The largest number of requests that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let res = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no more responses".into())));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        res
    }
}

pub fn response(status: u16, body: &str) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status,
        body: body.as_bytes().to_vec(),
    })
}

/// Keeps the image URIs it is asked to install
#[derive(Default)]
pub struct RecordingInstaller {
    installed: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingInstaller {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().unwrap().clone()
    }
}

impl Installer for RecordingInstaller {
    async fn install(&self, image_uri: &str) -> Result<(), InstallError> {
        self.installed.lock().unwrap().push(image_uri.to_owned());
        if self.fail {
            return Err(InstallError::Other("flash failed".to_owned()));
        }
        Ok(())
    }
}

/// Log output written by the crate while a capture is active
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Capture the logs of the current thread until the guard is dropped
    pub fn start() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("update_poller=trace")
            .with_writer(capture.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Lines logged at the given level, e.g. "ERROR"
    pub fn at_level(&self, level: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.trim_start().starts_with(level))
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
