/*
This module is home to everything related to talking with the update server.

It builds the update check request for the device, sends it through a
transport, turns the response into a typed outcome and acts on it.
*/

mod poll;
mod request;
mod response;

pub use poll::{PollError, PollMetrics, poll_once};
pub use request::{HttpTransport, RawResponse, Request, Transport, TransportError, build_request};
pub use response::{
    Classifier, Outcome, ParseError, STATUS_HAVE_UPDATE, STATUS_NO_UPDATE, STATUS_SERVER_ERROR,
    Update, classify,
};
