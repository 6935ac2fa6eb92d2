//! CSS parsing: stylesheets, declaration lists and specificity.
//!
//! Built on `cssparser` for tokenizing and `selectors` for selector
//! compilation. Parsing is lenient everywhere: bad rules, selector groups
//! and declarations are dropped and counted, never reported as errors.

mod declaration;
mod selector;
mod specificity;
mod stylesheet;

pub use declaration::{Declaration, parse_declaration_list};
pub use selector::{CssLocalName, CssNamespace, CssString, InlineSelectors, NonTSPseudoClass, PseudoElement};
pub use specificity::Specificity;
pub use stylesheet::{ParseDiagnostics, StyleRule, Stylesheet, parse_selector};
