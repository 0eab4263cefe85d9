//! Main harvester service: the resumption-token pagination loop.

use std::collections::HashSet;

use crate::config::{parse_source, resume_url, FetcherConfig};
use crate::error::{HarvesterError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::oai::{decode_envelope, Envelope};
use crate::sink::LinkSink;

/// Totals for a completed harvest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub pages: usize,
    pub records: usize,
    pub links: usize,
}

/// What to do after a page has been emitted.
#[derive(Debug, PartialEq, Eq)]
enum NextStep {
    Request(String),
    Done,
}

/// Harvests content links from an OAI-PMH `ListRecords` endpoint.
///
/// The harvester keeps no state between calls, so one instance can serve
/// several independent harvests.
#[derive(Debug, Clone)]
pub struct Harvester<F> {
    fetcher: F,
}

impl<F: Fetcher> Harvester<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Harvest every page reachable from `source` and send each Dublin Core
    /// identifier to `links`.
    ///
    /// Pages are requested one after another, following resumption tokens,
    /// until a page comes back without one. Each page is fully decoded and
    /// checked before any of its links are sent, so a failing page never
    /// contributes links. Links sent for earlier pages stay sent.
    ///
    /// The sink is not closed on return; dropping it is up to the caller.
    ///
    /// # Errors
    /// * [`HarvesterError::InvalidSource`] if `source` is not an absolute URL
    /// * [`HarvesterError::Fetch`] if a request fails
    /// * [`HarvesterError::Decode`] if a page is not an OAI-PMH document
    /// * [`HarvesterError::Protocol`] if the server reports an error
    /// * [`HarvesterError::NonProgressingToken`] if a resumption token repeats
    /// * [`HarvesterError::OutputClosed`] if the consumer hung up
    pub fn process<S: LinkSink + ?Sized>(
        &self,
        source: &str,
        links: &mut S,
    ) -> Result<HarvestSummary> {
        let base = parse_source(source)?;
        // A source that already resumes a list counts its token as sent.
        let mut seen_tokens: HashSet<String> = base
            .query_pairs()
            .filter(|(key, _)| key == "resumptionToken")
            .map(|(_, value)| value.into_owned())
            .collect();
        let mut summary = HarvestSummary::default();
        let mut url = source.to_string();

        loop {
            let response = self.fetcher.fetch(&url)?;
            let envelope = decode_envelope(&response.body).map_err(|e| HarvesterError::Decode {
                url: url.clone(),
                source: e,
            })?;

            if let Some(error) = &envelope.error {
                tracing::warn!(url = %url, code = %error.code, "Server reported an OAI-PMH error");
                return Err(HarvesterError::Protocol {
                    url,
                    code: error.code.clone(),
                    description: error.description.clone(),
                });
            }

            summary.pages += 1;
            summary.records += envelope.records.len();
            let page_links = emit_links(&envelope, links, summary.links)?;
            summary.links += page_links;

            for identifier in envelope.deleted_records() {
                tracing::debug!(identifier, "Skipping deleted record");
            }

            let token = envelope.resumption_token.as_ref();
            tracing::info!(
                url = %url,
                page = summary.pages,
                records = envelope.records.len(),
                links = page_links,
                complete_list_size = token.and_then(|t| t.complete_list_size),
                cursor = token.and_then(|t| t.cursor),
                "Harvested page"
            );

            match next_step(&envelope, &url, &mut seen_tokens)? {
                NextStep::Request(token) => {
                    url = resume_url(&base, &token);
                    tracing::debug!(token = %token, "Following resumption token");
                }
                NextStep::Done => {
                    tracing::info!(
                        pages = summary.pages,
                        records = summary.records,
                        links = summary.links,
                        "Harvest complete"
                    );
                    return Ok(summary);
                }
            }
        }
    }
}

/// Harvest `source` with an [`HttpFetcher`] built from `config`.
///
/// # Example
/// ```no_run
/// use std::sync::mpsc;
/// use oaipmh_harvester::{harvest, FetcherConfig};
///
/// let (tx, rx) = mpsc::channel::<String>();
/// std::thread::spawn(move || {
///     let mut tx = tx;
///     harvest(
///         "https://repo.example/oai?verb=ListRecords&metadataPrefix=oai_dc",
///         &mut tx,
///         &FetcherConfig::default(),
///     )
/// });
/// for link in rx {
///     println!("{link}");
/// }
/// ```
pub fn harvest<S: LinkSink + ?Sized>(
    source: &str,
    links: &mut S,
    config: &FetcherConfig,
) -> Result<HarvestSummary> {
    let fetcher = HttpFetcher::new(config)?;
    Harvester::new(fetcher).process(source, links)
}

/// Send every link of a page, in record order. Returns how many were sent.
fn emit_links<S: LinkSink + ?Sized>(
    envelope: &Envelope,
    links: &mut S,
    already_sent: usize,
) -> Result<usize> {
    let mut sent = 0;
    for link in envelope.content_urls() {
        links
            .send(link.to_string())
            .map_err(|_| HarvesterError::OutputClosed {
                emitted: already_sent + sent,
            })?;
        sent += 1;
    }
    Ok(sent)
}

/// Decide whether to request another page.
///
/// A token that was already sent in this harvest would make the loop
/// revisit a page, so it ends the harvest with an error instead.
fn next_step(envelope: &Envelope, url: &str, seen: &mut HashSet<String>) -> Result<NextStep> {
    let Some(token) = envelope.next_token() else {
        return Ok(NextStep::Done);
    };

    if !seen.insert(token.to_string()) {
        tracing::warn!(url, token, "Resumption token did not advance");
        return Err(HarvesterError::NonProgressingToken {
            url: url.to_string(),
            token: token.to_string(),
        });
    }

    Ok(NextStep::Request(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oai::ResumptionToken;

    fn envelope_with_token(token: Option<&str>) -> Envelope {
        Envelope {
            resumption_token: token.map(|value| ResumptionToken {
                value: value.to_string(),
                complete_list_size: None,
                cursor: None,
            }),
            ..Envelope::default()
        }
    }

    #[test]
    fn test_next_step_done_without_token() {
        let mut seen = HashSet::new();
        let step = next_step(&envelope_with_token(None), "u", &mut seen).unwrap();
        assert_eq!(step, NextStep::Done);
    }

    #[test]
    fn test_next_step_done_on_empty_token() {
        let mut seen = HashSet::new();
        let step = next_step(&envelope_with_token(Some("")), "u", &mut seen).unwrap();
        assert_eq!(step, NextStep::Done);
    }

    #[test]
    fn test_next_step_requests_new_token() {
        let mut seen = HashSet::new();
        let step = next_step(&envelope_with_token(Some("T1")), "u", &mut seen).unwrap();
        assert_eq!(step, NextStep::Request("T1".to_string()));
        assert!(seen.contains("T1"));
    }

    #[test]
    fn test_next_step_rejects_seen_token() {
        let mut seen = HashSet::from(["T1".to_string()]);
        let err = next_step(&envelope_with_token(Some("T1")), "u", &mut seen).unwrap_err();
        assert!(matches!(
            err,
            HarvesterError::NonProgressingToken { ref token, .. } if token == "T1"
        ));
    }

    #[test]
    fn test_emit_links_reports_closed_output() {
        use std::sync::mpsc;

        let envelope = crate::oai::decode_envelope(
            br#"<OAI-PMH><ListRecords><record><metadata><dc>
                <identifier>https://a/1</identifier>
            </dc></metadata></record></ListRecords></OAI-PMH>"#,
        )
        .unwrap();
        let (mut tx, rx) = mpsc::channel::<String>();
        drop(rx);

        let err = emit_links(&envelope, &mut tx, 5).unwrap_err();
        assert!(matches!(err, HarvesterError::OutputClosed { emitted: 5 }));
    }
}
