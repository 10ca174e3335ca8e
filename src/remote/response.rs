use serde::Deserialize;
use serde_json::error::Category;
use thiserror::Error;
use tracing::{debug, info};

pub const STATUS_HAVE_UPDATE: u16 = 200;
pub const STATUS_NO_UPDATE: u16 = 204;
pub const STATUS_SERVER_ERROR: u16 = 404;

/// An update the server wants the device to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub id: String,
    pub image_uri: String,
    pub checksum: String,
    pub image_id: String,
}

/// The result of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    HaveUpdate(Update),
    NoUpdate,
    ServerError,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid update response syntax")]
    Syntax,

    #[error("failed to decode update response: {0}")]
    Generic(String),

    #[error("malformed update response")]
    Malformed,

    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax | Category::Eof => ParseError::Syntax,
            Category::Data | Category::Io => ParseError::Generic(err.to_string()),
        }
    }
}

/// Turns a raw response into an [`Outcome`]
pub type Classifier = fn(u16, &[u8]) -> Result<Outcome, ParseError>;

// Any of the fields may be missing or null on the wire, the result
// is validated before use
#[derive(Deserialize, Debug)]
struct UpdateResponse {
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "Image", default)]
    image: Option<ImageResponse>,
}

#[derive(Deserialize, Debug)]
struct ImageResponse {
    #[serde(rename = "URI", default)]
    uri: Option<String>,
    #[serde(rename = "Checksum", default)]
    checksum: Option<String>,
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

impl TryFrom<UpdateResponse> for Update {
    type Error = ParseError;

    fn try_from(resp: UpdateResponse) -> Result<Self, Self::Error> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());

        let image = resp.image.ok_or(ParseError::Malformed)?;
        match (
            non_empty(resp.id),
            non_empty(image.uri),
            non_empty(image.checksum),
            non_empty(image.id),
        ) {
            (Some(id), Some(image_uri), Some(checksum), Some(image_id)) => Ok(Update {
                id,
                image_uri,
                checksum,
                image_id,
            }),
            _ => Err(ParseError::Malformed),
        }
    }
}

/// Classify a server response by its status code.
///
/// The body is only looked at for [`STATUS_HAVE_UPDATE`], and the update is
/// only accepted if every field of it is present and non-empty.
pub fn classify(status: u16, body: &[u8]) -> Result<Outcome, ParseError> {
    debug!("received response: {status}");

    match status {
        STATUS_HAVE_UPDATE => {
            debug!("update available");
            // Going through a value keeps the last of any duplicated keys
            let value: serde_json::Value = serde_json::from_slice(body)?;
            let response = Option::<UpdateResponse>::deserialize(value)?;
            let update = Update::try_from(response.ok_or(ParseError::Malformed)?)?;
            info!("received update {} with image {}", update.id, update.image_uri);
            Ok(Outcome::HaveUpdate(update))
        }
        STATUS_NO_UPDATE => {
            debug!("no update available");
            Ok(Outcome::NoUpdate)
        }
        STATUS_SERVER_ERROR => Ok(Outcome::ServerError),
        status => Err(ParseError::UnexpectedStatus(status)),
    }
}
