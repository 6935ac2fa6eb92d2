//! Selector vocabulary for the `selectors` crate.
//!
//! Stylesheet selectors compile against [`InlineSelectors`]. Tree-structural
//! pseudo-classes (`:first-child`, `:nth-of-type(..)`, `:not(..)`, ...) are
//! handled by `selectors` itself; the only non-structural ones accepted are
//! the link and user-action states listed in [`NonTSPseudoClass`].

use std::fmt;

use cssparser::{CowRcStr, ParseError, SourceLocation, ToCss};
use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::SelectorImpl;
use selectors::parser::SelectorParseErrorKind;

/// Newtype over an interned html5ever atom, usable as a selector component.
macro_rules! atom_component {
    ($(#[$meta:meta])* $name:ident($atom:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub $atom);

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(<$atom>::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(<$atom>::from(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ToCss for $name {
            fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
                dest.write_str(&self.0)
            }
        }

        impl PrecomputedHash for $name {
            fn precomputed_hash(&self) -> u32 {
                self.0.precomputed_hash()
            }
        }
    };
}

atom_component!(
    /// Element or attribute name in a selector.
    CssLocalName(LocalName)
);
atom_component!(
    /// Namespace URL in a selector.
    CssNamespace(Namespace)
);

/// Class names, ids, attribute values and namespace prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssString(pub String);

impl From<&str> for CssString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for CssString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssString {
    // FNV-1a
    fn precomputed_hash(&self) -> u32 {
        self.0.bytes().fold(0x811c_9dc5, |hash: u32, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
        })
    }
}

/// The selector implementation stylesheets are compiled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSelectors;

impl SelectorImpl for InlineSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = CssString;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

impl<'i> selectors::parser::Parser<'i> for InlineSelectors {
    type Impl = InlineSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<NonTSPseudoClass, ParseError<'i, Self::Error>> {
        NonTSPseudoClass::from_name(&name).ok_or_else(|| {
            location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(
                name,
            ))
        })
    }
}

/// Pseudo-classes that depend on state rather than tree position.
///
/// Only `:link` can hold for a static document; the others parse so that
/// rules using them are kept, but never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
    Hover,
    Active,
    Focus,
}

impl NonTSPseudoClass {
    fn from_name(name: &str) -> Option<Self> {
        cssparser::match_ignore_ascii_case! { name,
            "link" => Some(Self::Link),
            "visited" => Some(Self::Visited),
            "hover" => Some(Self::Hover),
            "active" => Some(Self::Active),
            "focus" => Some(Self::Focus),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Visited => "visited",
            Self::Hover => "hover",
            Self::Active => "active",
            Self::Focus => "focus",
        }
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_char(':')?;
        dest.write_str(self.name())
    }
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = InlineSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Active | Self::Hover)
    }

    fn is_user_action_state(&self) -> bool {
        !matches!(self, Self::Link | Self::Visited)
    }
}

/// Uninhabited: `::before`, `::first-line` and friends have no element to
/// carry an inline style, so selectors naming them fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = InlineSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_class_names_are_case_insensitive() {
        assert_eq!(NonTSPseudoClass::from_name("HOVER"), Some(NonTSPseudoClass::Hover));
        assert_eq!(NonTSPseudoClass::from_name("Link"), Some(NonTSPseudoClass::Link));
        assert_eq!(NonTSPseudoClass::from_name("checked"), None);
    }

    #[test]
    fn test_to_css() {
        let mut out = String::new();
        NonTSPseudoClass::Focus.to_css(&mut out).unwrap();
        CssLocalName::from("td").to_css(&mut out).unwrap();
        assert_eq!(out, ":focustd");
    }

    #[test]
    fn test_string_hash_is_stable() {
        assert_eq!(CssString::from("").precomputed_hash(), 0x811c_9dc5);
        assert_eq!(
            CssString::from("note").precomputed_hash(),
            CssString::from(String::from("note")).precomputed_hash()
        );
    }
}
