//! Typed accessors over an in-memory XML tree.
//!
//! The spec treats the XML parser itself as an external collaborator (§1);
//! this module is the thin, typed layer the RCM descriptor/LUT/noise parsers
//! are built on, playing the same role the teacher's `xml::GdalXmlNode`
//! played over `CPLXMLNode` — except here the underlying tree comes from
//! `roxmltree`, a pure-Rust parser, rather than libgdal's CPL XML functions,
//! since a descriptor document is not something we hand to libgdal at all.

use roxmltree::Node;

use crate::errors::{RcmError, Result};

/// Find the first direct child element named `name`.
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

/// Walk a `.`-separated path of element names from `root`, returning the final
/// node, or `None` if any segment is missing.
pub(crate) fn path<'a, 'input>(root: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = root;
    for segment in path.split('.') {
        current = child(current, segment)?;
    }
    Some(current)
}

/// Find the first descendant of `node`, at any depth, tagged `name`. Used
/// only for best-effort metadata fields (§4.4) whose exact nesting varies
/// across RCM product-type schema revisions.
pub(crate) fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| n.is_element() && n.has_tag_name(name))
}

/// Iterate all direct element children of `node` named `name`.
pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(name))
}

/// Concatenated text content of `node`'s text children, trimmed.
pub(crate) fn text(node: Node) -> String {
    node.text().unwrap_or("").trim().to_string()
}

/// Required text content of the child element named `name`.
pub(crate) fn required_text(node: Node, name: &str) -> Result<String> {
    child(node, name)
        .map(text)
        .ok_or_else(|| missing(node, name))
}

/// Required text content at a `.`-separated path from `node`.
pub(crate) fn required_path_text(node: Node, dotted_path: &str) -> Result<String> {
    path(node, dotted_path)
        .map(text)
        .ok_or_else(|| missing(node, dotted_path))
}

/// Optional text content of the child element named `name`.
pub(crate) fn optional_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(text)
}

/// Optional text content of the first descendant element named `name`.
pub(crate) fn optional_descendant_text(node: Node, name: &str) -> Option<String> {
    descendant(node, name).map(text)
}

/// Required scalar attribute.
pub(crate) fn required_attr(node: Node, name: &str) -> Result<String> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| missing(node, name))
}

/// Parse the required text content of child `name` as `T`.
pub(crate) fn required_parsed<T: std::str::FromStr>(node: Node, name: &str) -> Result<T> {
    let raw = required_text(node, name)?;
    raw.trim()
        .parse()
        .map_err(|_| RcmError::BadGeometry(format!("'{name}' is not a valid number: '{raw}'")))
}

fn missing(node: Node, what: &str) -> RcmError {
    RcmError::MissingNode {
        path: std::path::PathBuf::from(node.tag_name().name()),
        node: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_walks_nested_elements() {
        let doc = roxmltree::Document::parse(
            "<product><sceneAttributes><imageAttributes><samplesPerLine>100</samplesPerLine></imageAttributes></sceneAttributes></product>",
        )
        .unwrap();
        let root = doc.root_element();
        let v: u32 = required_parsed(
            path(root, "sceneAttributes.imageAttributes").unwrap(),
            "samplesPerLine",
        )
        .unwrap();
        assert_eq!(v, 100);
    }

    #[test]
    fn missing_path_segment_is_none() {
        let doc = roxmltree::Document::parse("<product><a/></product>").unwrap();
        let root = doc.root_element();
        assert!(path(root, "a.b.c").is_none());
    }

    #[test]
    fn children_filters_by_tag() {
        let doc = roxmltree::Document::parse(
            "<lists><ipdf>one</ipdf><ipdf>two</ipdf><other/></lists>",
        )
        .unwrap();
        let root = doc.root_element();
        let names: Vec<_> = children(root, "ipdf").map(text).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
