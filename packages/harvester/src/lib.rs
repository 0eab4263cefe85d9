//! OAI-PMH Harvester - Stream Dublin Core identifier URLs from OAI-PMH endpoints.
//!
//! This crate walks an OAI-PMH `ListRecords` result set page by page,
//! following resumption tokens, and hands every Dublin Core `identifier`
//! it finds to a [`LinkSink`] as soon as its page has been decoded.
//!
//! # Example
//!
//! ```
//! use oaipmh_harvester::{FetchError, FetchResponse, Fetcher, Harvester};
//!
//! // A fetcher that serves a single page.
//! struct OnePage;
//!
//! impl Fetcher for OnePage {
//!     fn fetch(&self, _source: &str) -> Result<FetchResponse, FetchError> {
//!         Ok(FetchResponse {
//!             status: 200,
//!             body: br#"<OAI-PMH><ListRecords><record><metadata><dc>
//!                 <identifier>https://repo.example/items/1</identifier>
//!             </dc></metadata></record></ListRecords></OAI-PMH>"#
//!                 .to_vec(),
//!         })
//!     }
//! }
//!
//! let mut links: Vec<String> = Vec::new();
//! let summary = Harvester::new(OnePage)
//!     .process("https://repo.example/oai?verb=ListRecords&metadataPrefix=oai_dc", &mut links)
//!     .unwrap();
//!
//! assert_eq!(links, vec!["https://repo.example/items/1"]);
//! assert_eq!(summary.pages, 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, datestamp validation, request URLs
//! - [`error`]: Error types and Result alias
//! - [`fetch`]: Fetcher trait and blocking HTTP implementation
//! - [`xml`]: XML utilities
//! - [`oai`]: OAI-PMH envelope decoding
//! - [`sink`]: Output stream abstraction
//! - [`harvester`]: Pagination loop
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod harvester;
pub mod oai;
pub mod sink;
pub mod xml;

// Re-export main functions
pub use harvester::{harvest, HarvestSummary, Harvester};

// Re-export commonly used items
pub use config::{FetcherConfig, ListRecordsQuery};
pub use error::{DecodeError, FetchError, HarvesterError, Result};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use oai::{decode_envelope, Envelope, ProtocolError, Record, ResumptionToken};
pub use sink::{LinkSink, SinkClosed};
