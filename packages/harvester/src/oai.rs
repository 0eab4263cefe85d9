//! OAI-PMH `ListRecords` response decoding.
//!
//! A response page looks like:
//!
//! ```xml
//! <OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
//!   <ListRecords>
//!     <record>
//!       <header><identifier>oai:repo:1</identifier></header>
//!       <metadata>
//!         <oai_dc:dc>
//!           <dc:identifier>https://repo.example/items/1</dc:identifier>
//!         </oai_dc:dc>
//!       </metadata>
//!     </record>
//!     <resumptionToken completeListSize="120" cursor="0">T1</resumptionToken>
//!   </ListRecords>
//! </OAI-PMH>
//! ```
//!
//! Errors the server detects in the request itself come back as
//! `<error code="...">description</error>` under the root, with HTTP 200.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::DecodeError;
use crate::xml::{
    find_all_by_path, find_by_path, find_child, find_children, get_tag_name, get_text,
};

/// Root element name of every OAI-PMH response.
const ROOT_ELEMENT: &str = "OAI-PMH";

/// One decoded response page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Records in server order.
    pub records: Vec<Record>,
    pub error: Option<ProtocolError>,
    pub resumption_token: Option<ResumptionToken>,
}

impl Envelope {
    /// All content URLs of the page, record by record.
    pub fn content_urls(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.content_urls.iter().map(String::as_str))
    }

    /// Header identifiers of records the server marked deleted.
    pub fn deleted_records(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| r.deleted)
            .filter_map(|r| r.header_identifier.as_deref())
    }

    /// The token for the next page, if there is one.
    ///
    /// An empty token marks the last page, the same as an absent one.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.resumption_token
            .as_ref()
            .map(|t| t.value.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// One metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// OAI identifier from the record header.
    pub header_identifier: Option<String>,
    /// Header marked `status="deleted"`.
    pub deleted: bool,
    /// Dublin Core `identifier` values, unvalidated.
    pub content_urls: Vec<String>,
}

/// Error reported by the server inside a well-formed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: String,
    pub description: String,
}

/// Resumption token with its optional progress attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub value: String,
    pub complete_list_size: Option<u64>,
    pub cursor: Option<u64>,
}

/// Decode a raw payload into an [`Envelope`].
///
/// A payload carrying an `<error>` element decodes successfully; inspect
/// [`Envelope::error`] for it.
///
/// # Examples
/// ```
/// use oaipmh_harvester::oai::decode_envelope;
///
/// let xml = br#"<OAI-PMH><ListRecords>
///   <record><metadata><dc><identifier>https://a/1</identifier></dc></metadata></record>
///   <resumptionToken>T1</resumptionToken>
/// </ListRecords></OAI-PMH>"#;
///
/// let envelope = decode_envelope(xml).unwrap();
/// assert_eq!(envelope.content_urls().collect::<Vec<_>>(), vec!["https://a/1"]);
/// assert_eq!(envelope.next_token(), Some("T1"));
/// ```
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    // Some repositories prefix pages with a DOCTYPE declaration.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    let root_name = get_tag_name(root);
    if root_name != ROOT_ELEMENT {
        return Err(DecodeError::UnexpectedRoot(root_name.to_string()));
    }

    let records = find_child(root, "ListRecords")
        .map(|list| find_children(list, "record").map(parse_record).collect())
        .unwrap_or_default();

    Ok(Envelope {
        records,
        error: find_child(root, "error").map(parse_error),
        resumption_token: find_by_path(root, "ListRecords/resumptionToken").map(parse_token),
    })
}

fn parse_record(record: Node<'_, '_>) -> Record {
    let header = find_child(record, "header");

    Record {
        header_identifier: header
            .and_then(|h| find_child(h, "identifier"))
            .map(get_text),
        deleted: header.and_then(|h| h.attribute("status")) == Some("deleted"),
        content_urls: find_all_by_path(record, "metadata/dc/identifier")
            .into_iter()
            .map(get_text)
            .collect(),
    }
}

fn parse_error(error: Node<'_, '_>) -> ProtocolError {
    ProtocolError {
        code: error.attribute("code").unwrap_or_default().to_string(),
        description: get_text(error),
    }
}

fn parse_token(token: Node<'_, '_>) -> ResumptionToken {
    ResumptionToken {
        value: get_text(token),
        complete_list_size: token
            .attribute("completeListSize")
            .and_then(|v| v.trim().parse().ok()),
        cursor: token.attribute("cursor").and_then(|v| v.trim().parse().ok()),
    }
}
