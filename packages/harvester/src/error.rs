//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `FetchError` describes why a single request
//! failed, and `HarvesterError` classifies why a whole harvest stopped.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The bounded wait elapsed before a response was obtained.
    #[error("Request to {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    /// A connection or network fault prevented completing the exchange.
    #[error("Transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response was obtained but its status is not 200.
    #[error("Non-200 status code {status} returned for {url}")]
    NonSuccessStatus { url: String, status: u16 },
}

impl FetchError {
    /// HTTP status code of the response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NonSuccessStatus { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Transport { .. } => None,
        }
    }
}

/// Failure to decode a payload as an OAI-PMH envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document element is not `OAI-PMH`.
    #[error("expected root element <OAI-PMH>, found <{0}>")]
    UnexpectedRoot(String),
}

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// The source identifier is not an absolute URL.
    #[error("Invalid source URL '{source_url}': {reason}")]
    InvalidSource { source_url: String, reason: String },

    /// Invalid OAI-PMH datestamp.
    #[error("Invalid datestamp: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDatestamp(String),

    /// Building the HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Fetching a page failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload could not be decoded as an OAI-PMH envelope.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },

    /// The server reported an error in a well-formed response.
    #[error("OAI-PMH error '{code}' for {url}: {description}")]
    Protocol {
        url: String,
        code: String,
        description: String,
    },

    /// The server handed out a resumption token it had already issued.
    #[error("Resumption token '{token}' returned by {url} did not advance")]
    NonProgressingToken { url: String, token: String },

    /// The consumer of the link stream went away.
    #[error("Link output closed after {emitted} links")]
    OutputClosed { emitted: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvesterError {
    /// Whether this is the `noRecordsMatch` protocol error.
    ///
    /// OAI-PMH servers report an empty result set this way rather than with
    /// an empty `ListRecords` element.
    #[must_use]
    pub fn is_no_records_match(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if code == "noRecordsMatch")
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
