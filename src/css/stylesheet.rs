//! CSS stylesheet parsing and rule structures.

use std::ops::AddAssign;
use std::sync::Arc;

use cssparser::{
    AtRuleParser, CowRcStr, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    StyleSheetParser,
};
use selectors::parser::Selector;

use super::declaration::{Declaration, parse_declarations};
use super::specificity::Specificity;
use super::selector::InlineSelectors;

/// A parsed CSS stylesheet.
///
/// Parsing never fails; whatever could not be understood is dropped and
/// tallied in [`ParseDiagnostics`].
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
    /// `@media` blocks, re-serialized from their source text.
    pub media_rules: Vec<String>,
    pub diagnostics: ParseDiagnostics,
}

/// One selector of a (possibly comma-separated) rule.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector: Selector<InlineSelectors>,
    pub specificity: Specificity,
    /// Source position among accepted rules. Groups of one rule share it.
    pub ordinal: usize,
    /// Shared by every group of the rule.
    pub declarations: Arc<[Declaration]>,
}

/// What the parser had to skip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Rules with no usable selector, or unparsable top-level input.
    pub skipped_rules: usize,
    /// Individual comma-separated selector groups that failed to parse.
    pub skipped_selectors: usize,
    pub skipped_declarations: usize,
}

impl AddAssign for ParseDiagnostics {
    fn add_assign(&mut self, other: Self) {
        self.skipped_rules += other.skipped_rules;
        self.skipped_selectors += other.skipped_selectors;
        self.skipped_declarations += other.skipped_declarations;
    }
}

impl Stylesheet {
    /// Parse a CSS stylesheet from a string.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut sheet = Stylesheet::default();
        let mut next_ordinal = 0;

        let mut rule_parser = TopLevelRuleParser {
            sheet: &mut sheet,
            next_ordinal: &mut next_ordinal,
        };
        let mut skipped_rules = 0;
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            if let Err((_, source)) = result {
                log::debug!("skipping css rule: {}", source.trim());
                skipped_rules += 1;
            }
        }
        sheet.diagnostics.skipped_rules += skipped_rules;
        sheet
    }

    /// Check if the stylesheet has no rules to inline.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of ordinals handed out, i.e. one past the last rule's ordinal.
    pub fn rule_count(&self) -> usize {
        self.rules.last().map_or(0, |r| r.ordinal + 1)
    }

    /// Append the rules of `later` so that they follow every rule of this
    /// sheet in source order. `@media` blocks are not taken over.
    pub fn extend_rules(&mut self, later: &Stylesheet) {
        let offset = self.rule_count();
        self.rules.extend(later.rules.iter().map(|rule| StyleRule {
            ordinal: rule.ordinal + offset,
            ..rule.clone()
        }));
        self.diagnostics += later.diagnostics;
    }
}

/// Parse a single selector (no commas).
pub fn parse_selector(text: &str) -> Option<Selector<InlineSelectors>> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let list = parser
        .parse_entirely(|p| {
            selectors::parser::SelectorList::parse(
                &InlineSelectors,
                p,
                selectors::parser::ParseRelative::No,
            )
        })
        .ok()?;
    match list.slice() {
        [selector] => Some(selector.clone()),
        _ => None,
    }
}

/// Parse one comma-delimited group, consuming it whether or not it is valid.
fn parse_selector_group(input: &mut Parser<'_, '_>) -> Option<Selector<InlineSelectors>> {
    let start = input.position();
    let parsed = input.try_parse(|p| {
        let list = selectors::parser::SelectorList::parse(
            &InlineSelectors,
            p,
            selectors::parser::ParseRelative::No,
        )?;
        p.expect_exhausted()?;
        Ok::<_, ParseError<'_, _>>(list)
    });
    match parsed {
        Ok(list) => list.slice().first().cloned(),
        Err(_) => {
            while input.next().is_ok() {}
            log::debug!(
                "dropping unsupported selector: {}",
                input.slice_from(start).trim()
            );
            None
        }
    }
}

struct TopLevelRuleParser<'a> {
    sheet: &'a mut Stylesheet,
    next_ordinal: &'a mut usize,
}

enum AtRulePrelude {
    Media(String),
    Other,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = AtRulePrelude;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        if name.eq_ignore_ascii_case("media") {
            Ok(AtRulePrelude::Media(input.slice_from(start).trim().to_string()))
        } else {
            // @import, @font-face, @keyframes, ... have no per-element meaning
            log::debug!("ignoring @{name} rule");
            Ok(AtRulePrelude::Other)
        }
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        if let AtRulePrelude::Media(query) = prelude {
            let body = input.slice_from(start).trim();
            self.sheet
                .media_rules
                .push(format!("@media {query} {{{body}}}"));
        }
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<InlineSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let groups = input.parse_comma_separated(|group| {
            Ok::<_, ParseError<'i, ()>>(parse_selector_group(group))
        })?;
        let total = groups.len();
        let selectors: Vec<_> = groups.into_iter().flatten().collect();
        self.sheet.diagnostics.skipped_selectors += total - selectors.len();
        if selectors.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let (declarations, skipped) = parse_declarations(input);
        self.sheet.diagnostics.skipped_declarations += skipped;
        if declarations.is_empty() {
            return Ok(());
        }

        let ordinal = *self.next_ordinal;
        *self.next_ordinal += 1;
        let declarations: Arc<[Declaration]> = declarations.into();
        self.sheet
            .rules
            .extend(prelude.into_iter().map(|selector| StyleRule {
                specificity: Specificity::from_selector(&selector),
                selector,
                ordinal,
                declarations: Arc::clone(&declarations),
            }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules_in_order() {
        let sheet = Stylesheet::parse("h1 { color: red; } .a { margin: 0; padding: 1px }");

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].ordinal, 0);
        assert_eq!(sheet.rules[1].ordinal, 1);
        assert_eq!(sheet.rules[1].declarations.len(), 2);
        assert_eq!(sheet.rules[1].specificity, Specificity::new(0, 1, 0));
        assert_eq!(sheet.rule_count(), 2);
    }

    #[test]
    fn test_extend_rules_orders_later_sheet_after() {
        let mut sheet = Stylesheet::parse("p, h1 { color: red } .x { margin: 0 }");
        let later = Stylesheet::parse("p { color: blue } a:: { } @media print { p { color: black } }");
        sheet.extend_rules(&later);

        let ordinals: Vec<_> = sheet.rules.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, [0, 0, 1, 2]);
        assert_eq!(sheet.rule_count(), 3);
        assert_eq!(&*sheet.rules[3].declarations[0].value, "blue");
        assert!(sheet.media_rules.is_empty());
        assert_eq!(sheet.diagnostics.skipped_rules, 1);
    }

    #[test]
    fn test_comma_groups_share_ordinal_and_declarations() {
        let sheet = Stylesheet::parse("h1, h2.x { color: red }");

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].ordinal, sheet.rules[1].ordinal);
        assert!(Arc::ptr_eq(
            &sheet.rules[0].declarations,
            &sheet.rules[1].declarations
        ));
        assert_eq!(sheet.rules[1].specificity, Specificity::new(0, 1, 1));
    }

    #[test]
    fn test_invalid_group_keeps_siblings() {
        let sheet = Stylesheet::parse("h1, p::first-line, h2 { color: red }");

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.diagnostics.skipped_selectors, 1);
        assert_eq!(sheet.diagnostics.skipped_rules, 0);
    }

    #[test]
    fn test_rule_without_valid_selector_is_skipped() {
        let sheet = Stylesheet::parse("h1:frobnicate { color: red } p { color: blue }");

        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.diagnostics.skipped_rules, 1);
        assert_eq!(sheet.rules[0].ordinal, 0);
    }

    #[test]
    fn test_empty_block_is_dropped_silently() {
        let sheet = Stylesheet::parse("h1 {} p { color: blue }");

        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.diagnostics, ParseDiagnostics::default());
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        let sheet = Stylesheet::parse("h1 {{ color: red");
        assert!(sheet.is_empty());

        let sheet = Stylesheet::parse("}}} color: red; {");
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_media_rules_are_captured() {
        let sheet = Stylesheet::parse(
            "@media (max-width: 600px) { h1 { color: red; } }\nh1 { color: blue }",
        );

        assert_eq!(
            sheet.media_rules,
            vec!["@media (max-width: 600px) {h1 { color: red; }}".to_string()]
        );
        // Rules inside @media are not inlined
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].value, "blue");
    }

    #[test]
    fn test_media_capture_is_stable() {
        let once = Stylesheet::parse("@media screen{ p{margin:0} }").media_rules;
        let twice = Stylesheet::parse(&once.join("\n")).media_rules;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_other_at_rules_are_ignored() {
        let sheet = Stylesheet::parse(
            "@charset \"utf-8\"; @import url(x.css); @font-face { font-family: X } p { color: red }",
        );

        assert_eq!(sheet.rules.len(), 1);
        assert!(sheet.media_rules.is_empty());
        assert_eq!(sheet.diagnostics, ParseDiagnostics::default());
    }
}
