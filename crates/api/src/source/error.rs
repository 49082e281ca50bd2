use core::fmt::{self, Display};
use hyper::{http::uri::InvalidUri, StatusCode};
use hyper_util::client::legacy;
use tokio::time::error::Elapsed;

#[derive(Debug)]
pub enum FetchError {
    /// The endpoint could not be turned into a request URI.
    Uri(InvalidUri),
    /// Connection-level failure while sending the request.
    Client(legacy::Error),
    /// Failure while streaming the response body.
    Body(hyper::Error),
    /// The server replied, but not with a success status.
    Status(StatusCode),
    /// The attempt did not complete within the configured timeout.
    Timeout,
    /// The payload is not a valid batch of questions.
    Json(serde_json::Error),
}

impl FetchError {
    /// Whether the failure happened on the way to (or from) the server rather than while
    /// making sense of what it sent back. A body that is not even JSON counts as the former.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Json(err) => !err.is_data(),
            _ => true,
        }
    }
}

impl From<InvalidUri> for FetchError {
    fn from(err: InvalidUri) -> Self {
        Self::Uri(err)
    }
}

impl From<legacy::Error> for FetchError {
    fn from(err: legacy::Error) -> Self {
        Self::Client(err)
    }
}

impl From<hyper::Error> for FetchError {
    fn from(err: hyper::Error) -> Self {
        Self::Body(err)
    }
}

impl From<Elapsed> for FetchError {
    fn from(_: Elapsed) -> Self {
        Self::Timeout
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(err) => write!(f, "invalid endpoint: {err}"),
            Self::Client(err) => write!(f, "request failed: {err}"),
            Self::Body(err) => write!(f, "could not read response: {err}"),
            Self::Status(status) => write!(f, "server responded with {status}"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Json(err) => write!(f, "malformed payload: {err}"),
        }
    }
}

impl std::error::Error for FetchError {}
