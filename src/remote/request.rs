use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{Span, field, instrument};

use crate::config::Config;
use crate::util::http::{Method, Uri};

/// A request to the update server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}

/// Build the update check request for the configured device.
///
/// The request path is `{server_address}/{device_id}/update`, keeping any
/// path prefix that is part of the server address.
pub fn build_request(config: &Config) -> Request {
    let prefix = config.server_address().path().trim_end_matches('/');
    let path = format!("{prefix}/{}/update", config.device_id());
    let uri = Uri::from_parts(config.server_address().clone(), &path, None)
        .expect("device id must be validated on config creation");

    Request {
        method: Method::GET,
        uri,
    }
}

/// Status code and body as received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Capability to send a request to the server.
///
/// Timeouts are up to the implementation.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// HTTP transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "trace", skip_all, fields(response = field::Empty))]
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .request(request.method.clone(), request.uri.to_string())
            .header("Accept-Encoding", "br, gzip, deflate")
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        Span::current().record("response", field::display(status));

        let body = response.bytes().await.map_err(TransportError::Request)?;

        Ok(RawResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
