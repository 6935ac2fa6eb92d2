//! CSS inlining.
//!
//! [`StyleInliner`] parses an HTML document and a stylesheet, matches every
//! rule against every element, resolves the cascade per element and writes
//! the winning declarations into each element's `style` attribute. The
//! result renders the same in mail clients that drop `<style>` blocks.
//!
//! # Example
//!
//! ```
//! use mailman::inline::convert;
//!
//! let html = convert("<h1>Hola</h1>", "h1 { color: blue }")?;
//! assert_eq!(html, r#"<h1 style="color: blue;">Hola</h1>"#);
//! # Ok::<(), mailman::Error>(())
//! ```

mod cascade;
mod options;

pub use cascade::{MatchedDeclaration, matched_declarations, resolve, to_style_attribute};
pub use options::InlinerOptions;

use html5ever::local_name;
use selectors::context::SelectorCaches;

use crate::css::{ParseDiagnostics, Specificity, Stylesheet, parse_declaration_list};
use crate::dom::{Dom, ElementRef, NodeId, ParsedHtml, parse_fragment, parse_html, serialize_children};
use crate::error::{Error, Result};
use crate::util::looks_like_document;

/// Elements whose subtree is never styled.
const UNSTYLED: &[&str] = &["head", "style", "script", "template"];

/// Everything that was tolerated during one conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub stylesheet: ParseDiagnostics,
    /// Malformed declarations found in existing `style` attributes.
    pub skipped_inline_declarations: usize,
    /// Parse errors the HTML tree builder recovered from.
    pub html_parse_errors: usize,
    /// Elements whose `style` attribute was written.
    pub styled_elements: usize,
}

/// Output of a conversion.
#[derive(Debug, Clone)]
pub struct Inlined {
    pub html: String,
    pub diagnostics: Diagnostics,
}

/// Inlines stylesheet rules into `style` attributes.
///
/// Holds only configuration, so one inliner can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct StyleInliner {
    options: InlinerOptions,
}

impl StyleInliner {
    /// Create a new inliner with default options.
    pub fn new() -> Self {
        Self {
            options: InlinerOptions::default(),
        }
    }

    /// Configure the inliner with custom settings.
    pub fn with_options(mut self, options: InlinerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &InlinerOptions {
        &self.options
    }

    /// Inline `css` into `html`.
    pub fn convert(&self, html: &str, css: &str) -> Result<String> {
        Ok(self.convert_with_diagnostics(html, css)?.html)
    }

    /// Inline `css` into `html`, reporting what had to be skipped.
    pub fn convert_with_diagnostics(&self, html: &str, css: &str) -> Result<Inlined> {
        let sheet = Stylesheet::parse(css);
        self.convert_stylesheet(html, &sheet)
    }

    /// Inline an already parsed stylesheet.
    pub fn convert_stylesheet(&self, html: &str, sheet: &Stylesheet) -> Result<Inlined> {
        self.check_input(html)?;

        let ParsedHtml {
            mut dom,
            root,
            parse_errors,
        } = if looks_like_document(html) {
            parse_html(html)
        } else {
            parse_fragment(html)
        };

        // Rules from <style> elements rank below the supplied stylesheet
        let mut cascade = embedded_stylesheet(&dom);
        cascade.extend_rules(sheet);
        let mut diagnostics = Diagnostics {
            stylesheet: cascade.diagnostics,
            html_parse_errors: parse_errors,
            ..Default::default()
        };

        apply_rules(&mut dom, root, &cascade, &mut diagnostics);
        self.rewrite_style_elements(&mut dom, root, sheet);

        let html = serialize_children(&dom, root)?;

        log::debug!(
            "inlined {} rules into {} elements",
            cascade.rules.len(),
            diagnostics.styled_elements
        );
        Ok(Inlined { html, diagnostics })
    }

    fn check_input(&self, html: &str) -> Result<()> {
        if html.trim().is_empty() {
            return Err(Error::Input("HTML document is empty".into()));
        }
        if let Some(limit) = self.options.max_input_bytes
            && html.len() > limit
        {
            return Err(Error::InputTooLarge {
                len: html.len(),
                limit,
            });
        }
        Ok(())
    }

    /// Strip or trim existing `<style>` elements and add a `<style>` for the
    /// `@media` blocks of `sheet`, according to the options. The new element
    /// goes at the end of `<head>`, or first under `root` when there is no
    /// head.
    fn rewrite_style_elements(&self, dom: &mut Dom, root: NodeId, sheet: &Stylesheet) {
        if self.options.strip_style_tags {
            for id in dom.elements_named("style") {
                let kept = if self.options.preserve_media_queries {
                    Stylesheet::parse(&dom.text(id)).media_rules
                } else {
                    Vec::new()
                };
                if kept.is_empty() {
                    dom.detach(id);
                } else {
                    dom.set_text(id, &kept.join("\n"));
                }
            }
        }

        if self.options.preserve_media_queries && !sheet.media_rules.is_empty() {
            let style = dom.create_html(local_name!("style"));
            dom.set_text(style, &sheet.media_rules.join("\n"));
            match dom.first_element("head") {
                Some(head) => dom.append(head, style),
                None => dom.prepend(root, style),
            }
        }
    }
}

/// Rules of every `<style>` element, in document order.
fn embedded_stylesheet(dom: &Dom) -> Stylesheet {
    let mut sheet = Stylesheet::default();
    // Parsed one element at a time so an unclosed block stays local
    for id in dom.elements_named("style") {
        sheet.extend_rules(&Stylesheet::parse(&dom.text(id)));
    }
    sheet
}

/// Write the resolved declarations of every styled element below `root`.
fn apply_rules(dom: &mut Dom, root: NodeId, sheet: &Stylesheet, diagnostics: &mut Diagnostics) {
    let targets = dom.elements(root, |e| UNSTYLED.iter().any(|tag| e.is(tag)));
    // Existing style attributes come after every stylesheet rule
    let inline_ordinal = sheet.rule_count();
    let mut caches = SelectorCaches::default();
    let mut updates = Vec::new();

    for id in targets {
        let Some(elem) = ElementRef::new(dom, id) else {
            continue;
        };
        let mut candidates = Vec::new();
        matched_declarations(elem, sheet, &mut caches, &mut candidates);

        let (inline, skipped) = elem
            .data()
            .attr("style")
            .map(parse_declaration_list)
            .unwrap_or_default();
        diagnostics.skipped_inline_declarations += skipped;
        candidates.extend(MatchedDeclaration::from_block(
            &inline,
            Specificity::INLINE,
            inline_ordinal,
        ));

        if candidates.is_empty() {
            continue;
        }
        updates.push((id, to_style_attribute(&resolve(&candidates))));
    }

    diagnostics.styled_elements = updates.len();
    for (id, style) in updates {
        if let Some(element) = dom.element_mut(id) {
            element.set_style(style);
        }
    }
}

/// Inline `css` into `html` with default options.
pub fn convert(html: &str, css: &str) -> Result<String> {
    StyleInliner::new().convert(html, css)
}
