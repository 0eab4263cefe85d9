//! Configuration constants and validation functions for the harvester.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::error::{HarvesterError, Result};

/// Default maximum wait for a single fetch, in seconds.
///
/// Set to 10 minutes to accommodate large metadata exports on slow servers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// OAI-PMH verb used for harvesting.
pub const LIST_RECORDS_VERB: &str = "ListRecords";

/// Metadata prefix for unqualified Dublin Core.
pub const DEFAULT_METADATA_PREFIX: &str = "oai_dc";

/// User agent string identifying this harvester.
pub const USER_AGENT: &str = concat!("oaipmh-harvester/", env!("CARGO_PKG_VERSION"));

/// Day-granularity datestamp: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Seconds-granularity datestamp: YYYY-MM-DDThh:mm:ssZ.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECONDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex"));

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Maximum wait for one request. `None` means [`DEFAULT_TIMEOUT_SECS`].
    pub timeout: Option<Duration>,
}

impl FetcherConfig {
    /// Configuration with an explicit timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// The timeout to apply, falling back to the default.
    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        self.timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Validate an OAI-PMH datestamp used for `from` and `until`.
///
/// # Examples
/// ```
/// use oaipmh_harvester::config::validate_datestamp;
///
/// assert!(validate_datestamp("2024-01-31").is_ok());
/// assert!(validate_datestamp("2024-01-31T12:00:00Z").is_ok());
/// assert!(validate_datestamp("2024-02-30").is_err()); // Invalid day
/// assert!(validate_datestamp("31-01-2024").is_err());
/// ```
pub fn validate_datestamp(datestamp: &str) -> Result<()> {
    let valid = if DAY_PATTERN.is_match(datestamp) {
        chrono::NaiveDate::parse_from_str(datestamp, "%Y-%m-%d").is_ok()
    } else if SECONDS_PATTERN.is_match(datestamp) {
        chrono::NaiveDateTime::parse_from_str(datestamp, "%Y-%m-%dT%H:%M:%SZ").is_ok()
    } else {
        false
    };

    if valid {
        Ok(())
    } else {
        Err(HarvesterError::InvalidDatestamp(datestamp.to_string()))
    }
}

/// Parse a source identifier as an absolute URL.
pub fn parse_source(source: &str) -> Result<Url> {
    let url = Url::parse(source).map_err(|e| HarvesterError::InvalidSource {
        source_url: source.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(HarvesterError::InvalidSource {
            source_url: source.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }

    Ok(url)
}

/// Selective-harvesting arguments for a `ListRecords` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecordsQuery {
    pub metadata_prefix: String,
    pub set: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
}

impl Default for ListRecordsQuery {
    fn default() -> Self {
        Self {
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            set: None,
            from: None,
            until: None,
        }
    }
}

/// Build the initial `ListRecords` URL for an endpoint.
///
/// Any query already present on `endpoint` is replaced. `from` and `until`
/// are validated first.
///
/// # Examples
/// ```
/// use oaipmh_harvester::config::{list_records_url, ListRecordsQuery};
///
/// let url = list_records_url("https://example.org/oai", &ListRecordsQuery::default()).unwrap();
/// assert_eq!(url, "https://example.org/oai?verb=ListRecords&metadataPrefix=oai_dc");
/// ```
pub fn list_records_url(endpoint: &str, query: &ListRecordsQuery) -> Result<String> {
    if let Some(from) = &query.from {
        validate_datestamp(from)?;
    }
    if let Some(until) = &query.until {
        validate_datestamp(until)?;
    }

    let mut url = parse_source(endpoint)?;
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("verb", LIST_RECORDS_VERB)
            .append_pair("metadataPrefix", &query.metadata_prefix);
        if let Some(set) = &query.set {
            pairs.append_pair("set", set);
        }
        if let Some(from) = &query.from {
            pairs.append_pair("from", from);
        }
        if let Some(until) = &query.until {
            pairs.append_pair("until", until);
        }
    }

    Ok(url.into())
}

/// Build the follow-up request URL for a resumption token.
///
/// OAI-PMH requires `resumptionToken` to be the only argument besides
/// `verb`, so every other query parameter of `base` is dropped. The verb is
/// taken from `base`, defaulting to `ListRecords`.
///
/// # Examples
/// ```
/// use oaipmh_harvester::config::{parse_source, resume_url};
///
/// let base = parse_source("https://example.org/oai?verb=ListRecords&metadataPrefix=oai_dc").unwrap();
/// assert_eq!(
///     resume_url(&base, "abc/123"),
///     "https://example.org/oai?verb=ListRecords&resumptionToken=abc%2F123"
/// );
/// ```
pub fn resume_url(base: &Url, token: &str) -> String {
    let verb = base
        .query_pairs()
        .find(|(key, _)| key == "verb")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| LIST_RECORDS_VERB.to_string());

    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("verb", &verb)
        .append_pair("resumptionToken", token);
    url.into()
}
