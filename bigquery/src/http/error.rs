use std::fmt;

use crate::http::job::ErrorProto;
use crate::row;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error returned from the BigQuery service.
    #[error(transparent)]
    Response(ErrorResponse),

    /// The service rejected a conditional request because the `If-Match` token was stale.
    #[error("precondition failed: {0}")]
    PreconditionFailed(ErrorResponse),

    /// An error from the HTTP client.
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    /// An error from the HTTP middleware stack.
    #[error(transparent)]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// An error from a token source.
    #[error("token source failed: {0}")]
    TokenSource(Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be mapped onto the expected resource.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("no {resource} field {field}")]
    UnknownField { resource: &'static str, field: String },

    #[error("invalid value: {0}")]
    Validation(String),

    #[error("resource lacks required identity information: {0}")]
    MissingIdentity(&'static str),

    #[error("cannot parse job resource: no load, copy, extract or query configuration")]
    UnknownJobType,

    /// A query result page was requested before the job finished.
    #[error("query job has not completed")]
    JobIncomplete,

    /// The job finished with an error result.
    #[error("job failed: {} ({})", .0.message, .0.reason)]
    JobFailed(ErrorProto),

    /// The job did not finish within the given time.
    #[error("job {0} did not complete in time")]
    Timeout(String),

    #[error(transparent)]
    Row(#[from] row::Error),
}

impl Error {
    /// Maps a non-2xx response onto the error taxonomy.
    pub(crate) fn from_status(status: u16, response: ErrorResponse) -> Self {
        if status == 412 {
            Error::PreconditionFailed(response)
        } else {
            Error::Response(response)
        }
    }

    /// Returns the HTTP status code when the error came from the service.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Response(e) | Error::PreconditionFailed(e) => Some(e.code),
            Error::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// An error response returned from BigQuery.
///
/// See the [`troubleshooting errors`][1] documentation for more details.
///
/// [1]: https://cloud.google.com/bigquery/docs/error-messages
#[derive(Clone, PartialEq, Eq, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// An HTTP status value, without the textual description.
    ///
    /// Example values include: `400` (Bad Request), `401` (Unauthorized), and `404` (Not Found).
    pub code: u16,

    /// Description of the error. Same as `errors.message`.
    pub message: String,

    /// A container for the error details.
    #[serde(default)]
    pub errors: Vec<ErrorResponseItem>,

    /// Example values include `NOT_FOUND` and `FAILED_PRECONDITION`.
    pub status: Option<String>,
}

impl ErrorResponse {
    /// Returns `true` if the error is retriable.
    ///
    /// Nothing in this crate retries; the flag is for callers that do.
    pub fn is_retriable(&self) -> bool {
        matches!(self.code, 408 | 429 | 500..=599)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for ErrorResponse {}

#[derive(Clone, PartialEq, Eq, Debug, serde::Deserialize, serde::Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseItem {
    /// Example values include `invalid`, `notFound` and `conditionNotMet`.
    #[serde(default)]
    pub reason: String,

    /// The part of the request that caused the error, if known.
    pub location: Option<String>,

    /// Description of the error.
    #[serde(default)]
    pub message: String,

    pub domain: Option<String>,
}

impl fmt::Display for ErrorResponseItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// The error response JSON format contains an extra object level that is inconvenient to include in our
/// error.
#[derive(serde::Deserialize)]
pub(crate) struct ErrorWrapper {
    pub(crate) error: ErrorResponse,
}
