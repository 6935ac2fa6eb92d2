//! Arena-allocated HTML tree.
//!
//! Every node lives in one vector owned by [`Dom`] and refers to its
//! relatives by [`NodeId`]. Removing a node only unlinks it; the slot stays
//! allocated until the tree is dropped, so ids never dangle.

use std::ops::Index;

use html5ever::{LocalName, QualName, local_name, ns};

/// Index of a node inside its [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An attribute in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// An attribute with no namespace, as every HTML attribute is.
    pub fn new(local: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(local)),
            value: value.into(),
        }
    }

    fn is(&self, local: &str) -> bool {
        self.name.ns == ns!() && &*self.name.local == local
    }
}

/// Element name and attributes, with `id` and `class` pre-split for
/// selector matching.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: QualName,
    attrs: Vec<Attribute>,
    id: Option<String>,
    classes: Vec<String>,
}

impl ElementData {
    pub fn new(name: QualName, attrs: Vec<Attribute>) -> Self {
        let mut element = Self {
            name,
            attrs,
            id: None,
            classes: Vec::new(),
        };
        element.reindex();
        element
    }

    fn reindex(&mut self) {
        self.id = self.attr("id").map(str::to_owned);
        self.classes = self
            .attr("class")
            .map(|c| c.split_ascii_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
    }

    pub fn local_name(&self) -> &LocalName {
        &self.name.local
    }

    /// Tag name check, ignoring namespace.
    pub fn is(&self, tag: &str) -> bool {
        &*self.name.local == tag
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.is(local))
            .map(|a| a.value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Replace the `style` attribute in place, or append one.
    pub fn set_style(&mut self, style: String) {
        match self.attrs.iter_mut().find(|a| a.is("style")) {
            Some(attr) => attr.value = style,
            None => self.attrs.push(Attribute {
                name: QualName::new(None, ns!(), local_name!("style")),
                value: style,
            }),
        }
    }

    /// Add the attributes whose names are not present yet.
    pub fn add_missing(&mut self, attrs: impl IntoIterator<Item = Attribute>) {
        for attr in attrs {
            if !self.attrs.iter().any(|a| a.name == attr.name) {
                self.attrs.push(attr);
            }
        }
        self.reindex();
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype { name: String },
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

/// A node and its links.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// An HTML document tree.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Dom {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Dom {
    /// A tree holding only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Allocate an unattached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.create(NodeData::Element(ElementData::new(name, attrs)))
    }

    /// An HTML-namespace element without attributes.
    pub fn create_html(&mut self, local: LocalName) -> NodeId {
        self.create_element(QualName::new(None, ns!(html), local), Vec::new())
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self[id].as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.index()].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Make `child` the last child of `parent`, moving it if needed.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let prev = self[parent].last_child;
        self.link(child, parent, prev, None);
    }

    /// Put `child` right before `sibling`. Does nothing if `sibling` is
    /// unattached.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        self.detach(child);
        let Some(parent) = self[sibling].parent else {
            return;
        };
        let prev = self[sibling].prev_sibling;
        self.link(child, parent, prev, Some(sibling));
    }

    /// Make `child` the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        match self[parent].first_child {
            Some(first) if first != child => self.insert_before(first, child),
            Some(_) => {}
            None => self.append(parent, child),
        }
    }

    fn link(&mut self, child: NodeId, parent: NodeId, prev: Option<NodeId>, next: Option<NodeId>) {
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = Some(child),
            None => self.node_mut(parent).last_child = Some(child),
        }
    }

    /// Unlink `id` from its parent and siblings. Its own subtree stays
    /// attached to it.
    pub fn detach(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();
        let Some(parent) = node.parent.take() else {
            return;
        };

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
    }

    /// Append text to `parent`, merging into a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self[parent].last_child
            && let NodeData::Text(existing) = &mut self.node_mut(last).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create(NodeData::Text(text.to_owned()));
        self.append(parent, node);
    }

    /// Insert text before `sibling`, merging into a preceding text node.
    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        if let Some(prev) = self[sibling].prev_sibling
            && let NodeData::Text(existing) = &mut self.node_mut(prev).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create(NodeData::Text(text.to_owned()));
        self.insert_before(sibling, node);
    }

    /// Move every child of `from` to the end of `to`.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        while let Some(child) = self[from].first_child {
            self.append(to, child);
        }
    }

    /// Replace the children of `parent` with one text node.
    pub fn set_text(&mut self, parent: NodeId, text: &str) {
        while let Some(child) = self[parent].first_child {
            self.detach(child);
        }
        self.append_text(parent, text);
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self[parent].first_child,
        }
    }

    /// Every node below `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            root,
            next: self[root].first_child,
        }
    }

    /// The node after `id` in document order, staying inside `root`.
    /// With `enter == false` the children of `id` are passed over.
    fn following(&self, id: NodeId, root: NodeId, enter: bool) -> Option<NodeId> {
        if enter && let Some(first) = self[id].first_child {
            return Some(first);
        }
        let mut current = id;
        loop {
            let node = &self[current];
            if let Some(next) = node.next_sibling {
                return Some(next);
            }
            match node.parent {
                Some(parent) if parent != root => current = parent,
                _ => return None,
            }
        }
    }

    /// Elements below `root` in document order. An element for which
    /// `prune` returns true is left out together with its subtree.
    pub fn elements<F>(&self, root: NodeId, prune: F) -> Vec<NodeId>
    where
        F: Fn(&ElementData) -> bool,
    {
        let mut out = Vec::new();
        let mut cursor = self[root].first_child;
        while let Some(id) = cursor {
            let enter = match self.element(id) {
                Some(element) if prune(element) => false,
                Some(_) => {
                    out.push(id);
                    true
                }
                None => false,
            };
            cursor = self.following(id, root, enter);
        }
        out
    }

    /// First element named `tag` in document order.
    pub fn first_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&id| self.element(id).is_some_and(|e| e.is(tag)))
    }

    /// All elements named `tag` in document order.
    pub fn elements_named(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&id| self.element(id).is_some_and(|e| e.is(tag)))
            .collect()
    }

    /// Concatenated direct text children of `id`.
    pub fn text(&self, id: NodeId) -> String {
        self.children(id)
            .filter_map(|child| self[child].as_text())
            .collect()
    }
}

pub struct Children<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom[id].next_sibling;
        Some(id)
    }
}

pub struct Descendants<'a> {
    dom: &'a Dom,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.following(id, self.root, true);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// div > (a, b, i)
    fn three_children() -> (Dom, NodeId, [NodeId; 3]) {
        let mut dom = Dom::new();
        let div = dom.create_html(local_name!("div"));
        dom.append(dom.root(), div);
        let kids = [local_name!("a"), local_name!("b"), local_name!("i")].map(|name| {
            let id = dom.create_html(name);
            dom.append(div, id);
            id
        });
        (dom, div, kids)
    }

    #[test]
    fn test_element_indexes_id_and_classes() {
        let element = ElementData::new(
            QualName::new(None, ns!(html), local_name!("p")),
            vec![Attribute::new("id", "main"), Attribute::new("class", " a  b\tc ")],
        );

        assert!(element.is("p"));
        assert_eq!(element.id(), Some("main"));
        assert_eq!(element.classes(), ["a", "b", "c"]);
        assert_eq!(element.attr("class"), Some(" a  b\tc "));
        assert_eq!(element.attr("title"), None);
    }

    #[test]
    fn test_add_missing_keeps_existing_values() {
        let mut element = ElementData::new(
            QualName::new(None, ns!(html), local_name!("body")),
            vec![Attribute::new("class", "a")],
        );
        element.add_missing([Attribute::new("class", "b"), Attribute::new("id", "x")]);

        assert_eq!(element.classes(), ["a"]);
        assert_eq!(element.id(), Some("x"));
    }

    #[test]
    fn test_set_style_keeps_attribute_position() {
        let mut element = ElementData::new(
            QualName::new(None, ns!(html), local_name!("p")),
            vec![Attribute::new("style", "x"), Attribute::new("title", "t")],
        );
        element.set_style("color: red;".into());
        element.set_style("color: blue;".into());

        let names: Vec<_> = element.attrs().iter().map(|a| &*a.name.local).collect();
        assert_eq!(names, ["style", "title"]);
        assert_eq!(element.attr("style"), Some("color: blue;"));

        let mut bare = ElementData::new(
            QualName::new(None, ns!(html), local_name!("p")),
            vec![Attribute::new("title", "t")],
        );
        bare.set_style("margin: 0;".into());
        assert_eq!(bare.attrs().last().map(|a| &*a.name.local), Some("style"));
    }

    #[test]
    fn test_append_and_detach() {
        let (mut dom, div, [a, b, i]) = three_children();
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [a, b, i]);

        dom.detach(b);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [a, i]);
        assert_eq!(dom[b].parent(), None);
        assert_eq!(dom[a].next_sibling(), Some(i));
        assert_eq!(dom[i].prev_sibling(), Some(a));

        dom.detach(a);
        dom.detach(i);
        assert_eq!(dom[div].first_child(), None);
        assert_eq!(dom[div].last_child(), None);

        // Detaching twice is harmless
        dom.detach(a);
    }

    #[test]
    fn test_append_moves_an_attached_node() {
        let (mut dom, div, [a, b, i]) = three_children();

        dom.append(div, a);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [b, i, a]);

        dom.insert_before(b, i);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [i, b, a]);

        dom.prepend(div, a);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [a, i, b]);

        let empty = dom.create_html(local_name!("span"));
        dom.prepend(empty, b);
        assert_eq!(dom.children(empty).collect::<Vec<_>>(), [b]);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), [a, i]);
    }

    #[test]
    fn test_text_is_merged() {
        let (mut dom, div, [a, _, _]) = three_children();

        dom.insert_text_before(a, "x");
        dom.insert_text_before(a, "y");
        dom.append_text(div, "1");
        dom.append_text(div, "2");

        assert_eq!(dom.children(div).count(), 5);
        assert_eq!(dom.text(div), "xy12");

        dom.set_text(div, "only");
        assert_eq!(dom.children(div).count(), 1);
        assert_eq!(dom.text(div), "only");
    }

    #[test]
    fn test_reparent_children() {
        let (mut dom, div, kids) = three_children();
        let section = dom.create_html(local_name!("section"));
        dom.append(dom.root(), section);

        dom.reparent_children(div, section);

        assert_eq!(dom.children(div).count(), 0);
        assert_eq!(dom.children(section).collect::<Vec<_>>(), kids);
    }

    #[test]
    fn test_traversal_order_and_pruning() {
        let mut dom = Dom::new();
        let html = dom.create_html(local_name!("html"));
        let head = dom.create_html(local_name!("head"));
        let title = dom.create_html(local_name!("title"));
        let body = dom.create_html(local_name!("body"));
        let p = dom.create_html(local_name!("p"));
        dom.append(dom.root(), html);
        dom.append(html, head);
        dom.append(head, title);
        dom.append(html, body);
        dom.append(body, p);
        dom.append_text(p, "hi");

        assert_eq!(dom.descendants(dom.root()).count(), 6);
        assert_eq!(
            dom.elements(dom.root(), |_| false),
            [html, head, title, body, p]
        );
        assert_eq!(dom.elements(dom.root(), |e| e.is("head")), [html, body, p]);
        assert_eq!(dom.elements(body, |_| false), [p]);
        assert_eq!(dom.first_element("p"), Some(p));
        assert_eq!(dom.elements_named("title"), [title]);
    }
}
