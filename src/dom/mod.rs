//! HTML document model: parsing, selector matching and serialization.

mod matching;
mod serialize;
mod sink;
mod tree;

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{QualName, local_name, ns, parse_document};

pub use matching::ElementRef;
pub use serialize::{SerializableNode, serialize_children, serialize_document};
pub use sink::{DomSink, OwnedName};
pub use tree::{Attribute, Children, Descendants, Dom, ElementData, Node, NodeData, NodeId};

/// Result of parsing an HTML string.
pub struct ParsedHtml {
    pub dom: Dom,
    /// Parent of the parsed content: the document node for a document, the
    /// container element for a fragment.
    pub root: NodeId,
    /// Recoverable errors the tree builder reported and repaired.
    pub parse_errors: usize,
}

impl ParsedHtml {
    fn from_sink(sink: DomSink, root: impl FnOnce(&Dom) -> Option<NodeId>) -> Self {
        let parse_errors = sink.parse_errors();
        let dom = sink.into_dom();
        let root = root(&dom).unwrap_or_else(|| dom.root());
        Self {
            dom,
            root,
            parse_errors,
        }
    }
}

/// Parse a whole HTML document the way a browser would.
///
/// Never fails. Missing `<html>`, `<head>` and `<body>` are synthesized.
pub fn parse_html(html: &str) -> ParsedHtml {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let sink = parse_document(DomSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes());
    ParsedHtml::from_sink(sink, |dom| Some(dom.root()))
}

/// Parse a snippet of markup without adding document wrappers.
///
/// The snippet is parsed as the contents of a `<template>`, which accepts
/// any element (including table rows and cells) and keeps leading comments.
/// The content ends up under a container element, returned as `root`.
pub fn parse_fragment(html: &str) -> ParsedHtml {
    let context = QualName::new(None, ns!(html), local_name!("template"));
    let sink = html5ever::parse_fragment(DomSink::new(), ParseOpts::default(), context, Vec::new(), false)
        .from_utf8()
        .one(html.as_bytes());
    ParsedHtml::from_sink(sink, |dom| dom.children(dom.root()).next())
}
