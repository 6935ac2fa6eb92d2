//! Writing a [`Dom`] back out as HTML.
//!
//! html5ever's serializer does the escaping and knows which elements are
//! void; this module only feeds it the tree.

use std::io;

use html5ever::QualName;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::tree::{Dom, NodeData, NodeId};
use crate::error::Result;

/// A node of a [`Dom`] in the shape html5ever's serializer expects.
pub struct SerializableNode<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a Dom, id: NodeId) -> Self {
        Self { dom, id }
    }
}

enum Step<'a> {
    Enter(NodeId),
    Leave(&'a QualName),
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let dom = self.dom;
        // Popped from the end, so children are pushed last-first
        let mut stack: Vec<Step<'_>> = match traversal_scope {
            TraversalScope::IncludeNode => vec![Step::Enter(self.id)],
            TraversalScope::ChildrenOnly(_) => {
                let mut children: Vec<_> = dom.children(self.id).map(Step::Enter).collect();
                children.reverse();
                children
            }
        };

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Leave(name) => {
                    serializer.end_elem(name.clone())?;
                    continue;
                }
            };
            match &dom[id].data {
                NodeData::Element(element) => {
                    serializer.start_elem(
                        element.name.clone(),
                        element
                            .attrs()
                            .iter()
                            .map(|attr| (&attr.name, attr.value.as_str())),
                    )?;
                    stack.push(Step::Leave(&element.name));
                    let mark = stack.len();
                    stack.extend(dom.children(id).map(Step::Enter));
                    stack[mark..].reverse();
                }
                NodeData::Text(text) => serializer.write_text(text)?,
                NodeData::Comment(text) => serializer.write_comment(text)?,
                NodeData::Doctype { name } => serializer.write_doctype(name)?,
                NodeData::ProcessingInstruction { target, data } => {
                    serializer.write_processing_instruction(target, data)?
                }
                NodeData::Document => {}
            }
        }
        Ok(())
    }
}

/// The children of `parent`, in order.
pub fn serialize_children(dom: &Dom, parent: NodeId) -> Result<String> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let mut bytes = Vec::new();
    serialize(&mut bytes, &SerializableNode::new(dom, parent), opts)?;
    Ok(String::from_utf8(bytes)?)
}

/// The whole document, doctype included.
pub fn serialize_document(dom: &Dom) -> Result<String> {
    serialize_children(dom, dom.root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_fragment, parse_html};

    fn fragment(html: &str) -> String {
        let parsed = parse_fragment(html);
        serialize_children(&parsed.dom, parsed.root).unwrap()
    }

    #[test]
    fn test_document_is_reproduced() {
        let html = "<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"a\">x</p></body></html>";

        assert_eq!(serialize_document(&parse_html(html).dom).unwrap(), html);
    }

    #[test]
    fn test_fragment_is_reproduced() {
        assert_eq!(fragment("<h1>Hola</h1><p>a &amp; b</p>"), "<h1>Hola</h1><p>a &amp; b</p>");
    }

    #[test]
    fn test_leading_and_trailing_comments() {
        let html = "<!--[if mso]><table><![endif]--><p>x</p><!-- end -->";

        assert_eq!(fragment(html), html);
    }

    #[test]
    fn test_table_parts_are_kept() {
        assert_eq!(fragment("<tr><td>cell</td></tr>"), "<tr><td>cell</td></tr>");
    }

    #[test]
    fn test_attributes_keep_order_and_escaping() {
        let html = r#"<a title="say &quot;hi&quot;" href="/x?a=1&amp;b=2">l</a>"#;

        assert_eq!(fragment(html), html);
    }

    #[test]
    fn test_void_elements_and_comments() {
        assert_eq!(fragment("<p>a<br>b<!-- note --></p>"), "<p>a<br>b<!-- note --></p>");
        assert_eq!(fragment(r#"<img src="x.png" alt="">"#), r#"<img src="x.png" alt="">"#);
    }

    #[test]
    fn test_nested_siblings_keep_order() {
        let html = "<ul><li><b>1</b>a</li><li>2</li></ul><p>end</p>";

        assert_eq!(fragment(html), html);
    }

    #[test]
    fn test_detached_nodes_are_skipped() {
        let mut parsed = parse_fragment("<p>keep</p><style>p{}</style><p>too</p>");
        let style = parsed.dom.first_element("style").unwrap();
        parsed.dom.detach(style);

        assert_eq!(
            serialize_children(&parsed.dom, parsed.root).unwrap(),
            "<p>keep</p><p>too</p>"
        );
    }
}
