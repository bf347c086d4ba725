//! Source-anchored error reports shared by the parser and the transformer.

use getset::{CopyGetters, Getters};
use pest::error::{ErrorVariant, InputLocation};
use std::fmt;

use crate::ast::Position;
use crate::grammar::Rule;

const TAB_WIDTH: usize = 8;
const MAX_EXPECTED: usize = 4;

const KEYWORDS: &[&str] = &[
    "bool", "case", "const", "default", "double", "enum", "float", "hyper", "int", "long",
    "opaque", "pragma", "program", "quadruple", "string", "struct", "switch", "typedef",
    "union", "unsigned", "version", "void"
];

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Category {
    #[display(fmt = "parse error")]
    Parse,
    #[display(fmt = "semantic error")]
    Semantic
}

#[derive(Clone, Constructor, Getters, CopyGetters, Debug, PartialEq, Eq, thiserror::Error)]
pub struct Diagnostic {
    #[getset(get = "pub")]
    filename: String,

    #[getset(get_copy = "pub")]
    position: Position,

    #[getset(get_copy = "pub")]
    category: Category,

    #[getset(get = "pub")]
    message: String,

    #[getset(get = "pub")]
    line_text: String
}

impl Diagnostic {
    pub fn at_offset(filename: &str, source: &str, offset: usize, category: Category, message: String) -> Diagnostic {
        let position = Position::from_offset(source, offset);
        let line_text = source.lines().nth(position.line() - 1).unwrap_or("").to_string();

        Diagnostic { filename: filename.to_string(), position, category, message, line_text }
    }

    /// Builds a parse error from the first failure reported by the grammar.
    pub(crate) fn from_pest(filename: &str, source: &str, error: pest::error::Error<Rule>) -> Diagnostic {
        let offset = match error.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start
        };

        let found = describe_found(source, offset);
        let message = match error.variant {
            ErrorVariant::ParsingError { positives, .. } => {
                let mut expected = positives.iter()
                    .map(describe_rule)
                    .collect::<Vec<String>>();
                expected.sort();
                expected.dedup();

                match expected.len() {
                    1 => format!("Unexpected {}, expected {}", found, expected[0]),
                    n if n > 1 && n <= MAX_EXPECTED => format!("Unexpected {}, expected one of {}", found, expected.join(", ")),
                    _ => format!("Unexpected {}", found)
                }
            },
            ErrorVariant::CustomError { message } => message
        };

        Diagnostic::at_offset(filename, source, offset, Category::Parse, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}:{}:{}: {}", self.filename, self.position.line(), self.position.column(), self.category)?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{}", expand_tabs(&self.line_text))?;
        write!(f, "{}^", " ".repeat(caret_offset(&self.line_text, self.position.column())))
    }
}

fn expand_tabs(line: &str) -> String {
    let mut expanded = String::new();
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - expanded.chars().count() % TAB_WIDTH;
            expanded.push_str(&" ".repeat(pad));
        } else {
            expanded.push(ch);
        }
    }
    expanded
}

/// Display width of the characters that precede `column` once tabs are expanded.
fn caret_offset(line: &str, column: usize) -> usize {
    let prefix = line.chars().take(column.saturating_sub(1)).collect::<String>();
    expand_tabs(&prefix).chars().count()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn describe_found(source: &str, offset: usize) -> String {
    let rest = &source[offset.min(source.len())..];
    let mut chars = rest.chars();

    match chars.next() {
        None => String::from("end of file"),
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
            let word = rest.chars().take_while(|c| is_ident_char(*c)).collect::<String>();
            if KEYWORDS.contains(&word.as_str()) {
                format!("'{}'", word)
            } else {
                format!("identifier '{}'", word)
            }
        },
        Some(ch) if ch.is_ascii_digit() || (ch == '-' && chars.next().map_or(false, |c| c.is_ascii_digit())) => {
            let number = ch.to_string() + &rest[1..].chars().take_while(|c| is_ident_char(*c)).collect::<String>();
            format!("number '{}'", number)
        },
        Some(ch) => format!("'{}'", ch)
    }
}

fn describe_rule(rule: &Rule) -> String {
    let text = match rule {
        Rule::EOI => "end of file",
        Rule::identifier => "identifier",
        Rule::constant => "number",
        Rule::value => "value",
        Rule::passthru => "passthrough line",
        Rule::type_specifier | Rule::procedure_type | Rule::unsigned_int | Rule::unsigned_hyper => "type specifier",
        Rule::kw_bool => "'bool'",
        Rule::kw_case => "'case'",
        Rule::kw_const => "'const'",
        Rule::kw_default => "'default'",
        Rule::kw_double => "'double'",
        Rule::kw_enum => "'enum'",
        Rule::kw_float => "'float'",
        Rule::kw_hyper => "'hyper'",
        Rule::kw_int => "'int'",
        Rule::kw_long => "'long'",
        Rule::kw_opaque => "'opaque'",
        Rule::kw_pragma => "'pragma'",
        Rule::kw_program => "'program'",
        Rule::kw_quadruple => "'quadruple'",
        Rule::kw_string => "'string'",
        Rule::kw_struct => "'struct'",
        Rule::kw_switch => "'switch'",
        Rule::kw_typedef => "'typedef'",
        Rule::kw_union => "'union'",
        Rule::kw_unsigned => "'unsigned'",
        Rule::kw_version => "'version'",
        Rule::kw_void => "'void'",
        Rule::lbrace => "'{'",
        Rule::rbrace => "'}'",
        Rule::lparen => "'('",
        Rule::rparen => "')'",
        Rule::lbracket => "'['",
        Rule::rbracket => "']'",
        Rule::langle => "'<'",
        Rule::rangle => "'>'",
        Rule::semi => "';'",
        Rule::comma => "','",
        Rule::colon => "':'",
        Rule::equals => "'='",
        Rule::star => "'*'",
        Rule::enumerator => "enumerator",
        Rule::case_spec => "'case'",
        Rule::default_spec => "'default'",
        _ => "definition"
    };
    text.to_string()
}
