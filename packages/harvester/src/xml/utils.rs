//! XML utility functions for navigating and extracting data from DOM trees.
//!
//! OAI-PMH responses mix several namespaces (`oai`, `oai_dc`, `dc`), so every
//! lookup here compares local names only.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oaipmh_harvester::xml::get_tag_name;
///
/// let xml = r#"<dc:identifier xmlns:dc="http://purl.org/dc/elements/1.1/">x</dc:identifier>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "identifier");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific local name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name, in document order.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Find the first descendant element matching a path of tag names.
///
/// # Arguments
/// * `node` - Starting node
/// * `path` - Slash-separated path of tag names (e.g., "ListRecords/resumptionToken")
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oaipmh_harvester::xml::find_by_path;
///
/// let xml = r#"<OAI-PMH><ListRecords><resumptionToken>T1</resumptionToken></ListRecords></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let token = find_by_path(doc.root_element(), "ListRecords/resumptionToken");
/// assert_eq!(token.and_then(|n| n.text()), Some("T1"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    path.split('/')
        .try_fold(node, |current, part| find_child(current, part))
}

/// Find every descendant element matching a path of tag names.
///
/// Unlike [`find_by_path`], each step fans out over all matching children,
/// so repeated elements at any level are collected. Results are in
/// document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oaipmh_harvester::xml::find_all_by_path;
///
/// let xml = r#"<metadata><dc><identifier>a</identifier><title/><identifier>b</identifier></dc></metadata>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let ids: Vec<_> = find_all_by_path(doc.root_element(), "dc/identifier")
///     .into_iter()
///     .filter_map(|n| n.text())
///     .collect();
/// assert_eq!(ids, vec!["a", "b"]);
/// ```
pub fn find_all_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for part in path.split('/') {
        current = current
            .into_iter()
            .flat_map(|n| n.children().filter(move |child| has_tag(*child, part)))
            .collect();
    }
    current
}

/// Get the text content of a node, trimmed.
///
/// Concatenates all descendant text so CDATA sections and entity-split
/// text are both covered.
pub fn get_text(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}
