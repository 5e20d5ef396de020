//! Terse single-string forms for a few leaf types.
//!
//! | Type | Grammar | Example |
//! |------|---------|---------|
//! | `CODE_PHRASE` | `terminology::code` or `terminology::version::code` | `ISO_639-1::en` |
//! | `DV_CODED_TEXT` | `terminology::code\|text\|` | `openehr::433\|event\|` |
//!
//! Inside a component `\\`, `\:` and `\|` stand for the literal characters,
//! and the encoder escapes every backslash, colon and pipe. A versioned
//! terminology maps to the terminology id value `terminology(version)`.
//!
//! Decoding distinguishes input that does not use a grammar at all
//! ([`TerseOutcome::NotTerseSyntax`]) from input that uses its delimiters but
//! breaks its rules ([`TerseOutcome::Invalid`]).

use std::fmt;

use helios_rm_support::SchemaView;

use crate::error::InvalidFormatError;
use crate::node::{GenericNode, ObjectNode};

pub const CODE_PHRASE: &str = "CODE_PHRASE";
pub const DV_CODED_TEXT: &str = "DV_CODED_TEXT";
pub const TERMINOLOGY_ID: &str = "TERMINOLOGY_ID";

#[derive(Debug, Clone, PartialEq)]
pub enum TerseOutcome {
    /// The decoded, fully tagged object.
    Parsed(ObjectNode),
    NotTerseSyntax,
    Invalid(InvalidFormatError),
}

/// A terse grammar bound to one type name.
pub trait TerseRule: Send + Sync + fmt::Debug {
    fn type_name(&self) -> &'static str;

    /// Human-readable shape of the grammar, used in error messages.
    fn grammar(&self) -> &'static str;

    /// The terse string for an object node of this type, or `None` when the
    /// node holds anything the grammar cannot carry.
    fn encode(&self, node: &ObjectNode) -> Option<String>;

    fn decode(&self, input: &str) -> TerseOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    Colon,
    Pipe,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        let token = match c {
            '\\' => match chars.next() {
                Some(escaped @ ('\\' | ':' | '|')) => Token::Literal(escaped),
                Some(other) => return Err(format!("unknown escape '\\{other}'")),
                None => return Err("dangling '\\' at end of input".to_string()),
            },
            ':' => Token::Colon,
            '|' => Token::Pipe,
            other => Token::Literal(other),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// Splits on unescaped `::`. A lone unescaped `:` is literal; three or more
/// in a row cannot be split unambiguously.
fn split_components(tokens: &[Token]) -> Result<Vec<String>, String> {
    let mut components = vec![String::new()];
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Colon => {
                let run = tokens[i..].iter().take_while(|t| **t == Token::Colon).count();
                match run {
                    1 => push_char(&mut components, ':'),
                    2 => components.push(String::new()),
                    _ => {
                        return Err(format!(
                            "{run} consecutive ':' are ambiguous; escape literal colons as '\\:'"
                        ));
                    }
                }
                i += run;
            }
            Token::Literal(c) => {
                push_char(&mut components, c);
                i += 1;
            }
            Token::Pipe => {
                push_char(&mut components, '|');
                i += 1;
            }
        }
    }
    Ok(components)
}

fn push_char(components: &mut [String], c: char) {
    if let Some(last) = components.last_mut() {
        last.push(c);
    }
}

fn literal_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Token::Literal(c) => *c,
            Token::Colon => ':',
            Token::Pipe => '|',
        })
        .collect()
}

pub fn escape_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ':' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Returns `(name, version)` for terminology values of the form `name(version)`.
fn split_terminology(value: &str) -> Option<(&str, &str)> {
    let inner = value.strip_suffix(')')?;
    let (name, version) = inner.split_once('(')?;
    if name.is_empty() || version.is_empty() || version.contains(['(', ')']) {
        return None;
    }
    Some((name, version))
}

/// Present, non-null fields of a node.
fn present(node: &ObjectNode) -> impl Iterator<Item = (&String, &GenericNode)> {
    node.fields.iter().filter(|(_, value)| !value.is_null())
}

fn non_empty_str<'a>(node: &'a ObjectNode, field: &str) -> Option<&'a str> {
    node.get_str(field).filter(|s| !s.is_empty())
}

fn code_phrase_node(terminology: String, code: String) -> ObjectNode {
    ObjectNode::tagged(CODE_PHRASE)
        .with(
            "terminology_id",
            ObjectNode::tagged(TERMINOLOGY_ID).with("value", terminology),
        )
        .with("code_string", code)
}

/// `terminology::code` and `terminology::version::code`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodePhraseRule;

impl CodePhraseRule {
    const GRAMMAR: &'static str = "terminology::code";

    fn invalid(&self, input: &str, reason: impl Into<String>) -> TerseOutcome {
        TerseOutcome::Invalid(InvalidFormatError {
            input: input.to_string(),
            grammar: Self::GRAMMAR,
            reason: reason.into(),
        })
    }

    /// Decodes an already tokenized code phrase; `input` is used for errors.
    fn decode_tokens(&self, input: &str, tokens: &[Token]) -> TerseOutcome {
        let components = match split_components(tokens) {
            Ok(components) => components,
            Err(reason) => return self.invalid(input, reason),
        };
        if components.len() == 1 {
            return TerseOutcome::NotTerseSyntax;
        }
        if components.len() > 3 {
            return self.invalid(
                input,
                format!(
                    "expected 2 or 3 '::'-separated components, found {}",
                    components.len()
                ),
            );
        }
        if components.iter().any(String::is_empty) {
            return self.invalid(input, "empty component");
        }

        let mut components = components.into_iter();
        let (terminology, code) = match (components.next(), components.next(), components.next()) {
            (Some(name), Some(version), Some(code)) => (format!("{name}({version})"), code),
            (Some(name), Some(code), None) => (name, code),
            _ => return TerseOutcome::NotTerseSyntax,
        };
        TerseOutcome::Parsed(code_phrase_node(terminology, code))
    }

    fn encode_fields(&self, node: &ObjectNode) -> Option<String> {
        if present(node).any(|(name, _)| name != "terminology_id" && name != "code_string") {
            return None;
        }
        let terminology = node.get("terminology_id")?.as_object()?;
        if present(terminology).any(|(name, _)| name != "value") {
            return None;
        }
        let terminology = non_empty_str(terminology, "value")?;
        let code = non_empty_str(node, "code_string")?;

        Some(match split_terminology(terminology) {
            Some((name, version)) => format!(
                "{}::{}::{}",
                escape_component(name),
                escape_component(version),
                escape_component(code)
            ),
            None => format!(
                "{}::{}",
                escape_component(terminology),
                escape_component(code)
            ),
        })
    }
}

impl TerseRule for CodePhraseRule {
    fn type_name(&self) -> &'static str {
        CODE_PHRASE
    }

    fn grammar(&self) -> &'static str {
        Self::GRAMMAR
    }

    fn encode(&self, node: &ObjectNode) -> Option<String> {
        self.encode_fields(node)
    }

    fn decode(&self, input: &str) -> TerseOutcome {
        if !input.contains("::") {
            return TerseOutcome::NotTerseSyntax;
        }
        let tokens = match tokenize(input) {
            Ok(tokens) => tokens,
            Err(reason) => return self.invalid(input, reason),
        };
        if tokens.contains(&Token::Pipe) {
            return TerseOutcome::NotTerseSyntax;
        }
        self.decode_tokens(input, &tokens)
    }
}

/// `terminology::code|text|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodedTextRule;

impl CodedTextRule {
    const GRAMMAR: &'static str = "terminology::code|text|";

    fn invalid(&self, input: &str, reason: impl Into<String>) -> TerseOutcome {
        TerseOutcome::Invalid(InvalidFormatError {
            input: input.to_string(),
            grammar: Self::GRAMMAR,
            reason: reason.into(),
        })
    }
}

impl TerseRule for CodedTextRule {
    fn type_name(&self) -> &'static str {
        DV_CODED_TEXT
    }

    fn grammar(&self) -> &'static str {
        Self::GRAMMAR
    }

    fn encode(&self, node: &ObjectNode) -> Option<String> {
        if present(node).any(|(name, _)| name != "value" && name != "defining_code") {
            return None;
        }
        let text = non_empty_str(node, "value")?;
        let code = node.get("defining_code")?.as_object()?;
        let code = CodePhraseRule.encode_fields(code)?;
        Some(format!("{code}|{}|", escape_component(text)))
    }

    fn decode(&self, input: &str) -> TerseOutcome {
        if !input.contains('|') || !input.contains("::") {
            return TerseOutcome::NotTerseSyntax;
        }
        let tokens = match tokenize(input) {
            Ok(tokens) => tokens,
            Err(reason) if input.ends_with('|') => return self.invalid(input, reason),
            Err(_) => return TerseOutcome::NotTerseSyntax,
        };

        let pipes: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Token::Pipe)
            .map(|(i, _)| i)
            .collect();
        let (Some(&first), Some(&last)) = (pipes.first(), pipes.last()) else {
            return TerseOutcome::NotTerseSyntax;
        };
        if last != tokens.len() - 1 {
            return TerseOutcome::NotTerseSyntax;
        }

        let head = &tokens[..first];
        let code = match CodePhraseRule.decode_tokens(input, head) {
            TerseOutcome::Parsed(code) => code,
            TerseOutcome::NotTerseSyntax => return TerseOutcome::NotTerseSyntax,
            TerseOutcome::Invalid(err) => return self.invalid(input, err.reason),
        };

        if first == last {
            return self.invalid(input, "missing rendered text before the closing '|'");
        }
        if pipes.len() > 2 {
            return self.invalid(input, "rendered text contains an unescaped '|'");
        }
        let text = literal_text(&tokens[first + 1..last]);
        if text.is_empty() {
            return self.invalid(input, "rendered text is empty");
        }

        TerseOutcome::Parsed(
            ObjectNode::tagged(DV_CODED_TEXT)
                .with("value", text)
                .with("defining_code", code),
        )
    }
}

/// The set of terse rules in use, at most one per type name.
///
/// Rules are tried in registration order; the default set tries
/// `DV_CODED_TEXT` before `CODE_PHRASE`.
#[derive(Debug)]
pub struct TerseCodec {
    rules: Vec<Box<dyn TerseRule>>,
}

impl Default for TerseCodec {
    fn default() -> Self {
        let mut codec = Self::empty();
        codec.register(Box::new(CodedTextRule));
        codec.register(Box::new(CodePhraseRule));
        codec
    }
}

impl TerseCodec {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, replacing any rule already bound to the same type name.
    pub fn register(&mut self, rule: Box<dyn TerseRule>) {
        match self
            .rules
            .iter_mut()
            .find(|existing| existing.type_name() == rule.type_name())
        {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn rule_for(&self, type_name: &str) -> Option<&dyn TerseRule> {
        self.rules
            .iter()
            .find(|rule| rule.type_name() == type_name)
            .map(AsRef::as_ref)
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn TerseRule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Rules that can produce a value for a slot of type `expected`: the
    /// type's own rule first, then rules of its subtypes. All rules when no
    /// type is expected.
    pub fn rules_for(&self, expected: Option<&str>, schema: &dyn SchemaView) -> Vec<&dyn TerseRule> {
        let Some(expected) = expected else {
            return self.rules().collect();
        };
        let own = self.rule_for(expected);
        own.into_iter()
            .chain(self.rules().filter(|rule| {
                rule.type_name() != expected && schema.is_subtype_of(rule.type_name(), expected)
            }))
            .collect()
    }

    pub fn encode(&self, type_name: &str, node: &ObjectNode) -> Option<String> {
        self.rule_for(type_name)?.encode(node)
    }

    /// Tries every applicable rule. The first parse wins; otherwise the first
    /// invalid-content report, otherwise [`TerseOutcome::NotTerseSyntax`].
    pub fn decode(&self, input: &str, expected: Option<&str>, schema: &dyn SchemaView) -> TerseOutcome {
        let mut invalid = None;
        for rule in self.rules_for(expected, schema) {
            match rule.decode(input) {
                TerseOutcome::Parsed(node) => return TerseOutcome::Parsed(node),
                TerseOutcome::Invalid(err) => {
                    invalid.get_or_insert(err);
                }
                TerseOutcome::NotTerseSyntax => {}
            }
        }
        invalid.map_or(TerseOutcome::NotTerseSyntax, TerseOutcome::Invalid)
    }

    /// Grammars applicable to `expected`, for error messages.
    pub fn grammars_for(&self, expected: Option<&str>, schema: &dyn SchemaView) -> Vec<&'static str> {
        self.rules_for(expected, schema)
            .into_iter()
            .map(|rule| rule.grammar())
            .collect()
    }
}

pub fn is_terse_code_phrase(input: &str) -> bool {
    matches!(CodePhraseRule.decode(input), TerseOutcome::Parsed(_))
}

pub fn is_terse_coded_text(input: &str) -> bool {
    matches!(CodedTextRule.decode(input), TerseOutcome::Parsed(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_phrase(terminology: &str, code: &str) -> ObjectNode {
        code_phrase_node(terminology.to_string(), code.to_string())
    }

    fn reason(outcome: TerseOutcome) -> String {
        match outcome {
            TerseOutcome::Invalid(err) => err.reason,
            other => panic!("expected invalid content, got {other:?}"),
        }
    }

    #[test]
    fn test_code_phrase_encode() {
        assert_eq!(
            CodePhraseRule.encode(&code_phrase("ISO_639-1", "en")).as_deref(),
            Some("ISO_639-1::en")
        );
        assert_eq!(
            CodePhraseRule.encode(&code_phrase("SNOMED-CT(2003)", "123")).as_deref(),
            Some("SNOMED-CT::2003::123")
        );
        assert_eq!(
            CodePhraseRule.encode(&code_phrase("local", "a:b|c")).as_deref(),
            Some(r"local::a\:b\|c")
        );
    }

    #[test]
    fn test_code_phrase_decode() {
        assert_eq!(
            CodePhraseRule.decode("ISO_639-1::en"),
            TerseOutcome::Parsed(code_phrase("ISO_639-1", "en"))
        );
        assert_eq!(
            CodePhraseRule.decode("SNOMED-CT::2003::123"),
            TerseOutcome::Parsed(code_phrase("SNOMED-CT(2003)", "123"))
        );
        assert_eq!(
            CodePhraseRule.decode(r"local::a\:b\|c"),
            TerseOutcome::Parsed(code_phrase("local", "a:b|c"))
        );
        assert_eq!(
            CodePhraseRule.decode("http://example.org/a"),
            TerseOutcome::NotTerseSyntax
        );
        assert_eq!(CodePhraseRule.decode("plain"), TerseOutcome::NotTerseSyntax);
        assert_eq!(CodePhraseRule.decode(r"a\::b"), TerseOutcome::NotTerseSyntax);
    }

    #[test]
    fn test_code_phrase_invalid_content() {
        assert_eq!(reason(CodePhraseRule.decode("::en")), "empty component");
        assert_eq!(reason(CodePhraseRule.decode("ISO::")), "empty component");
        assert!(reason(CodePhraseRule.decode("a::b::c::d")).contains("found 4"));
        assert!(reason(CodePhraseRule.decode("a:::b")).contains("ambiguous"));
        assert!(reason(CodePhraseRule.decode(r"a::b\")).contains("dangling"));
        assert!(reason(CodePhraseRule.decode(r"a::\qb")).contains("unknown escape"));
    }

    #[test]
    fn test_code_phrase_with_extra_fields_is_not_encoded() {
        let mut node = code_phrase("ISO_639-1", "en");
        node.insert("preferred_term", "English");
        assert_eq!(CodePhraseRule.encode(&node), None);

        node.insert("preferred_term", GenericNode::Null);
        assert!(CodePhraseRule.encode(&node).is_some());

        assert_eq!(CodePhraseRule.encode(&code_phrase("", "en")), None);
    }

    #[test]
    fn test_coded_text_round_trip() {
        let node = ObjectNode::tagged(DV_CODED_TEXT)
            .with("value", "event")
            .with("defining_code", code_phrase("openehr", "433"));
        let terse = CodedTextRule.encode(&node).unwrap();
        assert_eq!(terse, "openehr::433|event|");
        assert_eq!(CodedTextRule.decode(&terse), TerseOutcome::Parsed(node));

        let escaped = ObjectNode::tagged(DV_CODED_TEXT)
            .with("value", "a|b: c")
            .with("defining_code", code_phrase("local", "at0001"));
        let terse = CodedTextRule.encode(&escaped).unwrap();
        assert_eq!(terse, r"local::at0001|a\|b\: c|");
        assert_eq!(CodedTextRule.decode(&terse), TerseOutcome::Parsed(escaped));
    }

    #[test]
    fn test_coded_text_classification() {
        assert_eq!(CodedTextRule.decode("openehr::433"), TerseOutcome::NotTerseSyntax);
        assert_eq!(CodedTextRule.decode("a|b|"), TerseOutcome::NotTerseSyntax);
        assert_eq!(
            CodedTextRule.decode("openehr::433|event"),
            TerseOutcome::NotTerseSyntax
        );
        assert_eq!(reason(CodedTextRule.decode("openehr::433||")), "rendered text is empty");
        assert!(reason(CodedTextRule.decode("openehr::433|a|b|")).contains("unescaped '|'"));
        assert!(reason(CodedTextRule.decode("openehr::433|")).contains("missing rendered text"));
        assert_eq!(reason(CodedTextRule.decode("::433|event|")), "empty component");
    }

    #[test]
    fn test_coded_text_rejects_unexpressible_fields() {
        let node = ObjectNode::tagged(DV_CODED_TEXT)
            .with("value", "event")
            .with("formatting", "bold")
            .with("defining_code", code_phrase("openehr", "433"));
        assert_eq!(CodedTextRule.encode(&node), None);

        let empty = ObjectNode::tagged(DV_CODED_TEXT)
            .with("value", "")
            .with("defining_code", code_phrase("openehr", "433"));
        assert_eq!(CodedTextRule.encode(&empty), None);
    }

    #[test]
    fn test_register_replaces_rule_for_same_type() {
        let mut codec = TerseCodec::default();
        assert_eq!(codec.rules().count(), 2);
        codec.register(Box::new(CodePhraseRule));
        let names: Vec<_> = codec.rules().map(|r| r.type_name()).collect();
        assert_eq!(names, vec![DV_CODED_TEXT, CODE_PHRASE]);
        assert!(TerseCodec::empty().rule_for(CODE_PHRASE).is_none());
    }

    #[test]
    fn test_quick_classifiers() {
        assert!(is_terse_code_phrase("ISO_639-1::en"));
        assert!(!is_terse_code_phrase("openehr::433|event|"));
        assert!(is_terse_coded_text("openehr::433|event|"));
        assert!(!is_terse_coded_text("ISO_639-1::en"));
    }
}
