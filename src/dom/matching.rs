//! Selector matching against a [`Dom`].
//!
//! The `selectors` crate drives matching (compound selectors, combinators,
//! structural pseudo-classes); [`ElementRef`] answers its questions about
//! one element by reading the tree.

use std::fmt;

use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::context::{
    MatchingContext, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags, QuirksMode,
    SelectorCaches,
};
use selectors::matching::{ElementSelectorFlags, matches_selector};
use selectors::parser::Selector;
use selectors::{Element, OpaqueElement};

use super::tree::{Dom, ElementData, Node, NodeData, NodeId};
use crate::css::{CssLocalName, CssNamespace, CssString, InlineSelectors, NonTSPseudoClass, PseudoElement};

/// An element node, borrowed from its tree.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Dom,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    /// `None` unless `id` is an element.
    pub fn new(dom: &'a Dom, id: NodeId) -> Option<Self> {
        dom.element(id).map(|data| Self { dom, id, data })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &'a ElementData {
        self.data
    }

    /// Whether `selector` matches. `caches` may be reused for every element
    /// of the same tree.
    pub fn matches(&self, selector: &Selector<InlineSelectors>, caches: &mut SelectorCaches) -> bool {
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        matches_selector(selector, 0, None, self, &mut context)
    }

    /// Walk siblings with `step` until an element turns up.
    fn sibling_element(&self, step: fn(&Node) -> Option<NodeId>) -> Option<Self> {
        let mut cursor = step(&self.dom[self.id]);
        while let Some(id) = cursor {
            if let Some(found) = Self::new(self.dom, id) {
                return Some(found);
            }
            cursor = step(&self.dom[id]);
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ({:?})", self.data.local_name(), self.id)
    }
}

impl<'a> Element for ElementRef<'a> {
    type Impl = InlineSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.data)
    }

    fn parent_element(&self) -> Option<Self> {
        self.dom[self.id]
            .parent()
            .and_then(|parent| Self::new(self.dom, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Node::prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Node::next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find_map(|child| Self::new(self.dom, child))
    }

    // Type selectors compare lowercased names
    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.data.name.local == name.0
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.data.name.ns == ns.0
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.data.name == other.data.name
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        self.data.attrs().iter().any(|attr| {
            attr.name.local == local_name.0
                && match ns {
                    NamespaceConstraint::Any => true,
                    NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
                }
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, InlineSelectors>,
    ) -> bool {
        *pc == NonTSPseudoClass::Link && self.is_link()
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, InlineSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        matches!(&*self.data.name.local, "a" | "area") && self.data.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.data
            .id()
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.data
            .classes()
            .iter()
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom.children(self.id).all(|child| match &self.dom[child].data {
            NodeData::Element(_) => false,
            NodeData::Text(text) => text.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.dom[self.id]
            .parent()
            .is_some_and(|parent| matches!(self.dom[parent].data, NodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }
}
