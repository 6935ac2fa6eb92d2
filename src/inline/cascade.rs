//! Declaration resolution.
//!
//! Decides, per property, which of the declarations that reached an
//! element wins: importance first, then specificity, then source order.

use std::collections::HashMap;

use selectors::context::SelectorCaches;

use crate::css::{Declaration, Specificity, Stylesheet};
use crate::dom::ElementRef;

/// A declaration that applies to one element, with its cascade rank.
#[derive(Debug, Clone, Copy)]
pub struct MatchedDeclaration<'a> {
    pub declaration: &'a Declaration,
    pub specificity: Specificity,
    /// Ordinal of the rule the declaration came from.
    pub ordinal: usize,
    /// Index of the declaration inside its block.
    pub position: usize,
}

impl<'a> MatchedDeclaration<'a> {
    fn rank(&self) -> (bool, Specificity, usize, usize) {
        (
            self.declaration.important,
            self.specificity,
            self.ordinal,
            self.position,
        )
    }

    /// Candidates for every declaration of a block sharing one rank.
    pub fn from_block(
        declarations: &'a [Declaration],
        specificity: Specificity,
        ordinal: usize,
    ) -> impl Iterator<Item = MatchedDeclaration<'a>> + 'a {
        declarations
            .iter()
            .enumerate()
            .map(move |(position, declaration)| MatchedDeclaration {
                declaration,
                specificity,
                ordinal,
                position,
            })
    }
}

/// Collect the declarations of every rule in `sheet` that matches `elem`,
/// in rule order then declaration order.
pub fn matched_declarations<'a>(
    elem: ElementRef<'_>,
    sheet: &'a Stylesheet,
    caches: &mut SelectorCaches,
    out: &mut Vec<MatchedDeclaration<'a>>,
) {
    for rule in &sheet.rules {
        if elem.matches(&rule.selector, caches) {
            out.extend(MatchedDeclaration::from_block(
                &rule.declarations,
                rule.specificity,
                rule.ordinal,
            ));
        }
    }
}

/// Pick the winning value for each property.
///
/// Later candidates win ties, so callers pass candidates in source order.
/// The result is ordered by the first appearance of each property.
pub fn resolve<'a>(candidates: &[MatchedDeclaration<'a>]) -> Vec<(&'a str, &'a str)> {
    let mut winners: Vec<MatchedDeclaration<'a>> = Vec::with_capacity(candidates.len());
    let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(candidates.len());

    for candidate in candidates {
        let property = candidate.declaration.property.as_str();
        match index.get(property) {
            Some(&slot) => {
                if candidate.rank() >= winners[slot].rank() {
                    winners[slot] = *candidate;
                }
            }
            None => {
                index.insert(property, winners.len());
                winners.push(*candidate);
            }
        }
    }

    winners
        .into_iter()
        .map(|m| (m.declaration.property.as_str(), m.declaration.value.as_str()))
        .collect()
}

/// Serialize resolved declarations for a `style` attribute.
pub fn to_style_attribute(resolved: &[(&str, &str)]) -> String {
    resolved
        .iter()
        .map(|(property, value)| format!("{property}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(decl: &Declaration, specificity: Specificity, ordinal: usize) -> MatchedDeclaration<'_> {
        MatchedDeclaration {
            declaration: decl,
            specificity,
            ordinal,
            position: 0,
        }
    }

    #[test]
    fn test_later_rule_wins() {
        let red = Declaration::new("color", "red", false);
        let blue = Declaration::new("color", "blue", false);
        let h1 = Specificity::new(0, 0, 1);

        let resolved = resolve(&[candidate(&red, h1, 0), candidate(&blue, h1, 1)]);
        assert_eq!(resolved, vec![("color", "blue")]);
    }

    #[test]
    fn test_specificity_beats_order() {
        let red = Declaration::new("color", "red", false);
        let blue = Declaration::new("color", "blue", false);

        let resolved = resolve(&[
            candidate(&red, Specificity::new(0, 1, 0), 0),
            candidate(&blue, Specificity::new(0, 0, 1), 1),
        ]);
        assert_eq!(resolved, vec![("color", "red")]);
    }

    #[test]
    fn test_important_beats_specificity() {
        let blue = Declaration::new("color", "blue", true);
        let red = Declaration::new("color", "red", false);

        let resolved = resolve(&[
            candidate(&blue, Specificity::new(0, 0, 1), 0),
            candidate(&red, Specificity::INLINE, 5),
        ]);
        assert_eq!(resolved, vec![("color", "blue")]);
    }

    #[test]
    fn test_position_breaks_ties_within_block() {
        let block = vec![
            Declaration::new("color", "red", false),
            Declaration::new("margin", "0", false),
            Declaration::new("color", "blue", false),
        ];
        let candidates: Vec<_> =
            MatchedDeclaration::from_block(&block, Specificity::new(0, 0, 1), 0).collect();

        assert_eq!(resolve(&candidates), vec![("color", "blue"), ("margin", "0")]);
    }

    #[test]
    fn test_output_follows_first_appearance() {
        let a = Declaration::new("padding", "1px", false);
        let b = Declaration::new("color", "red", false);
        let c = Declaration::new("padding", "2px", false);
        let low = Specificity::new(0, 0, 1);

        let resolved = resolve(&[candidate(&a, low, 0), candidate(&b, low, 1), candidate(&c, low, 2)]);
        assert_eq!(resolved, vec![("padding", "2px"), ("color", "red")]);
    }

    #[test]
    fn test_style_attribute_format() {
        assert_eq!(
            to_style_attribute(&[("color", "red"), ("margin", "0 auto")]),
            "color: red; margin: 0 auto;"
        );
        assert_eq!(to_style_attribute(&[]), "");
    }
}
