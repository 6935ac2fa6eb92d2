//! html5ever tree builder target.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{LocalName, Namespace, QualName};

use super::tree::{Attribute, Dom, NodeData, NodeId};

/// Element name handed back to the tree builder.
///
/// Owned, so no borrow of the tree outlives the call that produced it.
#[derive(Debug)]
pub struct OwnedName(QualName);

impl ElemName for OwnedName {
    fn ns(&self) -> &Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

/// Builds a [`Dom`] from tree builder callbacks.
///
/// `TreeSink` methods take `&self`, so the tree sits in a `RefCell`.
pub struct DomSink {
    dom: RefCell<Dom>,
    parse_errors: Cell<usize>,
}

impl Default for DomSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(Dom::new()),
            parse_errors: Cell::new(0),
        }
    }

    /// Recoverable errors reported by the tree builder.
    pub fn parse_errors(&self) -> usize {
        self.parse_errors.get()
    }

    pub fn into_dom(self) -> Dom {
        self.dom.into_inner()
    }

    fn insert(&self, data: NodeData) -> NodeId {
        self.dom.borrow_mut().create(data)
    }
}

fn convert_attrs(attrs: Vec<html5ever::Attribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: String::from(a.value),
    })
}

impl TreeSink for DomSink {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a>
        = OwnedName
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html parse error: {msg}");
        self.parse_errors.set(self.parse_errors.get() + 1);
    }

    fn get_document(&self) -> NodeId {
        self.dom.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> OwnedName {
        let dom = self.dom.borrow();
        let name = dom
            .element(*target)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| QualName::new(None, Namespace::default(), LocalName::default()));
        OwnedName(name)
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: ElementFlags,
    ) -> NodeId {
        self.dom
            .borrow_mut()
            .create_element(name, convert_attrs(attrs).collect())
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.insert(NodeData::Comment(String::from(text)))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> NodeId {
        self.insert(NodeData::ProcessingInstruction {
            target: String::from(target),
            data: String::from(data),
        })
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(*parent, node),
            NodeOrText::AppendText(text) => dom.append_text(*parent, &text),
        }
    }

    fn append_before_sibling(&self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.insert_before(*sibling, node),
            NodeOrText::AppendText(text) => dom.insert_text_before(*sibling, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let attached = self.dom.borrow()[*element].parent().is_some();
        if attached {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let doctype = self.insert(NodeData::Doctype {
            name: String::from(name),
        });
        let mut dom = self.dom.borrow_mut();
        let root = dom.root();
        dom.append(root, doctype);
    }

    // Template contents stay inline as ordinary children
    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    // Selectors always match in no-quirks mode
    fn set_quirks_mode(&self, mode: QuirksMode) {
        log::trace!("document quirks mode: {mode:?}");
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<html5ever::Attribute>) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*target) {
            element.add_missing(convert_attrs(attrs));
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        self.dom.borrow_mut().reparent_children(*node, *new_parent);
    }
}
