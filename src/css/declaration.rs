//! CSS declarations and declaration-list parsing.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased, except for custom properties (`--name`) which are
    /// case-sensitive.
    pub property: String,
    /// Source text of the value, trimmed, without `!important`.
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        Self {
            property: normalize_property(property),
            value: value.trim().to_string(),
            important,
        }
    }
}

fn normalize_property(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Split a trailing `!important` (any case, whitespace allowed after `!`)
/// off a raw value.
pub(crate) fn strip_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim_end();
    let keyword = "important";
    if trimmed.len() < keyword.len() {
        return (trimmed, false);
    }
    let split = trimmed.len() - keyword.len();
    if !trimmed.is_char_boundary(split) || !trimmed[split..].eq_ignore_ascii_case(keyword) {
        return (trimmed, false);
    }
    let before = trimmed[..split].trim_end();
    match before.strip_suffix('!') {
        Some(value) => (value.trim_end(), true),
        None => (trimmed, false),
    }
}

/// Parse the contents of a declaration block (or a `style` attribute).
///
/// Returns the valid declarations in source order and the number of
/// malformed ones that were skipped.
pub fn parse_declaration_list(css: &str) -> (Vec<Declaration>, usize) {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_declarations(&mut parser)
}

pub(crate) fn parse_declarations(input: &mut Parser<'_, '_>) -> (Vec<Declaration>, usize) {
    let mut declarations = Vec::new();
    let mut skipped = 0;
    for result in RuleBodyParser::new(input, &mut DeclarationListParser) {
        match result {
            Ok(decl) => declarations.push(decl),
            Err((_, source)) => {
                log::debug!("skipping malformed declaration: {}", source.trim());
                skipped += 1;
            }
        }
    }
    (declarations, skipped)
}

struct DeclarationListParser;

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let (value, important) = strip_important(input.slice_from(start));
        let value = value.trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration::new(&name, value, important))
    }
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
