//! Selector specificity.

use std::cmp::Ordering;

use selectors::parser::Selector;

use super::selector::InlineSelectors;

/// CSS specificity for cascade ordering.
///
/// Compared lexicographically. `inline` is only set for declarations taken
/// from an element's own `style` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Specificity {
    pub inline: u16,
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    /// Specificity of a `style` attribute: beats any selector.
    pub const INLINE: Specificity = Specificity {
        inline: 1,
        ids: 0,
        classes: 0,
        elements: 0,
    };

    pub fn new(ids: u16, classes: u16, elements: u16) -> Self {
        Self {
            inline: 0,
            ids,
            classes,
            elements,
        }
    }

    pub fn from_selector(selector: &Selector<InlineSelectors>) -> Self {
        let spec = selector.specificity();
        // selectors crate packs specificity as (id << 20) | (class << 10) | elements
        Self::new(
            ((spec >> 20) & 0x3FF) as u16,
            ((spec >> 10) & 0x3FF) as u16,
            (spec & 0x3FF) as u16,
        )
    }

    /// Specificity of a single selector written as text.
    ///
    /// Returns `None` if the text is not one valid selector.
    pub fn of(selector: &str) -> Option<Self> {
        super::parse_selector(selector).map(|s| Self::from_selector(&s))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inline
            .cmp(&other.inline)
            .then(self.ids.cmp(&other.ids))
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_specificity() {
        assert_eq!(Specificity::of("h1"), Some(Specificity::new(0, 0, 1)));
        assert_eq!(Specificity::of(".a"), Some(Specificity::new(0, 1, 0)));
        assert_eq!(Specificity::of("#main"), Some(Specificity::new(1, 0, 0)));
        assert_eq!(
            Specificity::of("div#main p.note[title] > a:hover"),
            Some(Specificity::new(1, 3, 3))
        );
    }

    #[test]
    fn test_invalid_selector_has_no_specificity() {
        assert_eq!(Specificity::of("h1 {"), None);
        assert_eq!(Specificity::of("a, b"), None);
        assert_eq!(Specificity::of(""), None);
    }

    #[test]
    fn test_ordering() {
        let id = Specificity::new(1, 0, 0);
        let classes = Specificity::new(0, 12, 0);
        let elements = Specificity::new(0, 0, 40);

        assert!(id > classes);
        assert!(classes > elements);
        assert!(Specificity::INLINE > id);
        assert!(Specificity::INLINE > Specificity::new(9, 9, 9));
    }
}
