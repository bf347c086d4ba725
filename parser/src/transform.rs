//! Turns the pest parse tree into the typed AST, resolving every name against the
//! definitions that precede it.

use multimap::MultiMap;
use pest::iterators::Pair;
use pest::Parser;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use crate::ast;
use crate::ast::declaration;
use crate::ast::definition::Which;
use crate::diagnostic::{Category, Diagnostic};
use crate::grammar::{is_token, Rule, XdrParser};

type Result<T> = std::result::Result<T, Diagnostic>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Symbol {
    Type(ast::TypeKind),
    Value
}

pub(crate) struct Transformer<'s> {
    filename: &'s str,
    source: &'s str,
    symbols: HashMap<String, Symbol>,

    /// The struct or union whose body is being read. Only optional members may
    /// name it.
    incomplete: Option<(String, ast::TypeKind)>
}

impl<'s> Transformer<'s> {
    fn new(filename: &'s str, source: &'s str) -> Transformer<'s> {
        let mut symbols = HashMap::new();
        symbols.insert(String::from("TRUE"), Symbol::Value);
        symbols.insert(String::from("FALSE"), Symbol::Value);

        Transformer { filename, source, symbols, incomplete: None }
    }

    fn position(&self, pair: &Pair<'_, Rule>) -> ast::Position {
        ast::Position::from_offset(self.source, pair.as_span().start())
    }

    fn error(&self, offset: usize, message: String) -> Diagnostic {
        Diagnostic::at_offset(self.filename, self.source, offset, Category::Semantic, message)
    }

    /// The grammar guarantees tree shapes; this only fires if the grammar and the
    /// transformer disagree.
    fn malformed(&self, offset: usize, what: &str) -> Diagnostic {
        Diagnostic::at_offset(self.filename, self.source, offset, Category::Parse, format!("Malformed {}", what))
    }

    fn expect<'i, I>(&self, children: &mut I, offset: usize, what: &str) -> Result<Pair<'i, Rule>>
    where
        I: Iterator<Item = Pair<'i, Rule>>
    {
        children.next().ok_or_else(|| self.malformed(offset, what))
    }

    fn check_unique(&self, name: &str, offset: usize) -> Result<()> {
        if self.symbols.contains_key(name) {
            return Err(self.error(offset, format!("Duplicate definition of '{}'", name)));
        }
        Ok(())
    }

    fn declare(&mut self, name: &str, offset: usize, symbol: Symbol) -> Result<()> {
        self.check_unique(name, offset)?;
        trace!(name, ?symbol, "declared");
        self.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    fn resolve_type(&self, pair: &Pair<'_, Rule>) -> Result<ast::TypeSpecifier> {
        let name = pair.as_str();
        match self.symbols.get(name) {
            Some(Symbol::Type(kind)) => Ok(ast::TypeSpecifier::new(name.to_string(), *kind)),
            _ => Err(self.error(pair.as_span().start(), format!("Undefined type '{}'", name)))
        }
    }

    /// `T *next` inside the body of `T` itself.
    fn resolve_incomplete(&self, spec: &Pair<'_, Rule>) -> Option<ast::TypeSpecifier> {
        let (name, kind) = self.incomplete.as_ref()?;
        let inner = spec.clone().into_inner().next()?;
        if inner.as_rule() == Rule::identifier && inner.as_str() == name {
            Some(ast::TypeSpecifier::new(name.clone(), *kind))
        } else {
            None
        }
    }

    /// Member names are distinct within one struct or union body.
    fn declare_member(&self, members: &mut HashSet<String>, declaration: &Pair<'_, Rule>) -> Result<()> {
        match declaration_name(declaration) {
            Some(name) if !members.insert(name.as_str().to_string()) => {
                Err(self.error(name.as_span().start(), format!("Duplicate definition of '{}'", name.as_str())))
            },
            _ => Ok(())
        }
    }

    fn resolve_value(&self, pair: &Pair<'_, Rule>) -> Result<()> {
        let name = pair.as_str();
        match self.symbols.get(name) {
            Some(Symbol::Value) => Ok(()),
            _ => Err(self.error(pair.as_span().start(), format!("Undefined constant '{}'", name)))
        }
    }
}

fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_token(p.as_rule()))
}

/// The identifier a named declaration introduces; type names sit one level deeper.
fn declaration_name<'i>(declaration: &Pair<'i, Rule>) -> Option<Pair<'i, Rule>> {
    declaration.clone().into_inner().find(|p| p.as_rule() == Rule::identifier)
}

pub(crate) trait ParseFrom<R>: Sized {
    fn parse(t: &mut Transformer<'_>, reader: R) -> Result<Self>;
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Value {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Value> {
        let offset = pair.as_span().start();
        let inner = match pair.as_rule() {
            Rule::value => t.expect(&mut pair.into_inner(), offset, "value")?,
            _ => pair
        };

        match inner.as_rule() {
            Rule::constant => Ok(ast::Value::Constant(inner.as_str().to_string())),
            Rule::identifier => {
                t.resolve_value(&inner)?;
                Ok(ast::Value::Identifier(inner.as_str().to_string()))
            },
            _ => Err(t.malformed(offset, "value"))
        }
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::TypeSpecifier {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::TypeSpecifier> {
        use ast::Builtin;

        let offset = pair.as_span().start();
        let inner = t.expect(&mut pair.into_inner(), offset, "type specifier")?;

        let builtin = match inner.as_rule() {
            Rule::unsigned_hyper => Builtin::UnsignedHyper,
            Rule::unsigned_int => Builtin::UnsignedInt,
            Rule::kw_hyper => Builtin::Hyper,
            Rule::kw_int | Rule::kw_long => Builtin::Int,
            Rule::kw_float => Builtin::Float,
            Rule::kw_double => Builtin::Double,
            Rule::kw_quadruple => Builtin::Quadruple,
            Rule::kw_bool => Builtin::Bool,
            Rule::identifier => return t.resolve_type(&inner),
            _ => return Err(t.malformed(offset, "type specifier"))
        };

        Ok(ast::TypeSpecifier::builtin(builtin))
    }
}

/// `void` for a procedure argument or result yields `None`.
fn parse_procedure_type(t: &mut Transformer<'_>, pair: Pair<'_, Rule>) -> Result<Option<ast::TypeSpecifier>> {
    match significant(pair).next() {
        Some(spec) => Ok(Some(ast::TypeSpecifier::parse(t, spec)?)),
        None => Ok(None)
    }
}

fn parse_optional_value(t: &mut Transformer<'_>, pair: Option<Pair<'_, Rule>>) -> Result<Option<ast::Value>> {
    match pair {
        Some(value) => Ok(Some(ast::Value::parse(t, value)?)),
        None => Ok(None)
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Declaration {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Declaration> {
        use declaration::Which;

        let position = t.position(&pair);
        let offset = pair.as_span().start();
        let rule = pair.as_rule();
        let mut children = significant(pair);

        if rule == Rule::void_declaration {
            return Ok(ast::Declaration::void(position));
        }

        let spec = match rule {
            Rule::optional_declaration => {
                let spec = t.expect(&mut children, offset, "declaration")?;
                match t.resolve_incomplete(&spec) {
                    Some(spec) => Some(spec),
                    None => Some(ast::TypeSpecifier::parse(t, spec)?)
                }
            },
            Rule::fixed_array | Rule::variable_array | Rule::basic_declaration => {
                let spec = t.expect(&mut children, offset, "declaration")?;
                Some(ast::TypeSpecifier::parse(t, spec)?)
            },
            _ => None
        };
        let name = t.expect(&mut children, offset, "declaration")?.as_str().to_string();

        let which = match (rule, spec) {
            (Rule::fixed_opaque, _) => {
                let size = t.expect(&mut children, offset, "opaque size")?;
                Which::FixedOpaque { size: ast::Value::parse(t, size)? }
            },
            (Rule::variable_opaque, _) => Which::VariableOpaque { maxsize: parse_optional_value(t, children.next())? },
            (Rule::string_declaration, _) => Which::String { maxsize: parse_optional_value(t, children.next())? },
            (Rule::optional_declaration, Some(spec)) => Which::Optional(spec),
            (Rule::fixed_array, Some(spec)) => {
                let size = t.expect(&mut children, offset, "array size")?;
                Which::FixedArray { spec, size: ast::Value::parse(t, size)? }
            },
            (Rule::variable_array, Some(spec)) => Which::VariableArray { spec, maxsize: parse_optional_value(t, children.next())? },
            (Rule::basic_declaration, Some(spec)) => Which::Basic(spec),
            _ => return Err(t.malformed(offset, "declaration"))
        };

        Ok(ast::Declaration::new(name, position, which))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Constant {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Constant> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "constant")?;
        let value = t.expect(&mut children, offset, "constant")?;

        t.declare(name.as_str(), name.as_span().start(), Symbol::Value)?;
        Ok(ast::Constant::new(name.as_str().to_string(), value.as_str().to_string()))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Enumerator {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Enumerator> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "enumerator")?;
        let value = t.expect(&mut children, offset, "enumerator")?;
        let value = ast::Value::parse(t, value)?;

        t.declare(name.as_str(), name.as_span().start(), Symbol::Value)?;
        Ok(ast::Enumerator::new(name.as_str().to_string(), value))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Enum {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Enum> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "enum")?;
        let body = t.expect(&mut children, offset, "enum body")?;

        t.declare(name.as_str(), name.as_span().start(), Symbol::Type(ast::TypeKind::Enum))?;
        let enumerators = significant(body)
            .map(|e| ast::Enumerator::parse(t, e))
            .collect::<Result<Vec<ast::Enumerator>>>()?;

        Ok(ast::Enum::new(name.as_str().to_string(), enumerators))
    }
}

/// A struct whose last member is an optional reference to itself becomes a pointer.
fn parse_struct(t: &mut Transformer<'_>, pair: Pair<'_, Rule>) -> Result<Which> {
    use declaration::Which as Decl;

    let offset = pair.as_span().start();
    let mut children = significant(pair);
    let name_pair = t.expect(&mut children, offset, "struct")?;
    let body = t.expect(&mut children, offset, "struct body")?;
    let name = name_pair.as_str().to_string();

    t.check_unique(&name, name_pair.as_span().start())?;
    t.incomplete = Some((name.clone(), ast::TypeKind::Struct));
    let mut members = HashSet::new();
    let mut fields = vec!();
    for declaration in significant(body) {
        t.declare_member(&mut members, &declaration)?;
        fields.push(ast::Declaration::parse(t, declaration)?);
    }
    t.incomplete = None;
    t.declare(&name, name_pair.as_span().start(), Symbol::Type(ast::TypeKind::Struct))?;

    let is_pointer = match fields.last().map(ast::Declaration::which) {
        Some(Decl::Optional(spec)) => spec.type_name() == &name,
        _ => false
    };
    if !is_pointer {
        return Ok(Which::Struct(ast::Struct::new(name, fields)));
    }

    if let Some(last) = fields.pop() {
        let spec = ast::TypeSpecifier::new(name.clone(), ast::TypeKind::Pointer);
        fields.push(ast::Declaration::new(last.name().clone(), last.position(), Decl::Optional(spec)));
    }
    t.symbols.insert(name.clone(), Symbol::Type(ast::TypeKind::Pointer));
    debug!(name = name.as_str(), "struct is a linked list; treating as pointer");

    Ok(Which::Pointer(ast::Pointer::new(name, fields)))
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::CaseArm {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::CaseArm> {
        let offset = pair.as_span().start();
        let mut values = vec!();
        let mut declaration = None;

        for child in significant(pair) {
            match child.as_rule() {
                Rule::value => values.push(ast::Value::parse(t, child)?),
                _ => declaration = Some(ast::Declaration::parse(t, child)?)
            }
        }

        match declaration {
            Some(declaration) => Ok(ast::CaseArm::new(values, declaration)),
            None => Err(t.malformed(offset, "case"))
        }
    }
}

/// XDR switches on `int`, `unsigned int` or an enum, `bool` included.
fn is_discriminant_type(spec: &ast::TypeSpecifier) -> bool {
    use ast::Builtin;

    match spec.kind() {
        ast::TypeKind::Builtin(Builtin::Int) | ast::TypeKind::Builtin(Builtin::UnsignedInt) | ast::TypeKind::Builtin(Builtin::Bool) => true,
        ast::TypeKind::Enum => true,
        _ => false
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Union {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Union> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "union")?;
        let body = t.expect(&mut children, offset, "union body")?;

        t.check_unique(name.as_str(), name.as_span().start())?;
        t.incomplete = Some((name.as_str().to_string(), ast::TypeKind::Union));

        let mut body = significant(body);
        let discriminant = t.expect(&mut body, offset, "union discriminant")?;
        let discriminant_offset = discriminant.as_span().start();
        let discriminant = ast::Declaration::parse(t, discriminant)?;
        match discriminant.which() {
            declaration::Which::Basic(spec) if is_discriminant_type(spec) => {},
            _ => return Err(t.error(
                discriminant_offset,
                format!("Invalid union discriminant '{}'", discriminant.name())
            ))
        }

        let mut members = HashSet::new();
        let mut arms = vec!();
        let mut default = None;
        for child in body {
            let arm_offset = child.as_span().start();
            let declaration = significant(child.clone())
                .find(|p| p.as_rule() != Rule::value)
                .ok_or_else(|| t.malformed(arm_offset, "union arm"))?;
            t.declare_member(&mut members, &declaration)?;

            match child.as_rule() {
                Rule::case_spec => arms.push(ast::CaseArm::parse(t, child)?),
                Rule::default_spec => default = Some(ast::Declaration::parse(t, declaration)?),
                _ => return Err(t.malformed(arm_offset, "union arm"))
            }
        }

        t.incomplete = None;
        t.declare(name.as_str(), name.as_span().start(), Symbol::Type(ast::TypeKind::Union))?;
        Ok(ast::Union::new(name.as_str().to_string(), discriminant, arms, default))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Typedef {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Typedef> {
        let offset = pair.as_span().start();
        let declaration = t.expect(&mut significant(pair), offset, "typedef")?;
        let name_offset = declaration_name(&declaration).map_or(offset, |name| name.as_span().start());
        let declaration = ast::Declaration::parse(t, declaration)?;

        t.declare(declaration.name(), name_offset, Symbol::Type(ast::TypeKind::Typedef))?;
        Ok(ast::Typedef::new(declaration))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Procedure {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Procedure> {
        let position = t.position(&pair);
        let offset = pair.as_span().start();
        let mut children = significant(pair);

        let result = t.expect(&mut children, offset, "procedure")?;
        let result = parse_procedure_type(t, result)?;
        let name = t.expect(&mut children, offset, "procedure")?;
        let argument = t.expect(&mut children, offset, "procedure")?;
        let argument = parse_procedure_type(t, argument)?;
        let number = t.expect(&mut children, offset, "procedure")?;

        t.declare(name.as_str(), name.as_span().start(), Symbol::Value)?;
        Ok(ast::Procedure::new(
            name.as_str().to_string(),
            number.as_str().to_string(),
            argument,
            result,
            position
        ))
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Version {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Version> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "version")?;
        t.declare(name.as_str(), name.as_span().start(), Symbol::Value)?;

        let mut procedures = vec!();
        let mut number = None;
        for child in children {
            match child.as_rule() {
                Rule::procedure_def => procedures.push(ast::Procedure::parse(t, child)?),
                _ => number = Some(child.as_str().to_string())
            }
        }

        match number {
            Some(number) => Ok(ast::Version::new(name.as_str().to_string(), number, procedures)),
            None => Err(t.malformed(offset, "version"))
        }
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Program {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Program> {
        let offset = pair.as_span().start();
        let mut children = significant(pair);
        let name = t.expect(&mut children, offset, "program")?;
        t.declare(name.as_str(), name.as_span().start(), Symbol::Value)?;

        let mut versions = vec!();
        let mut number = None;
        for child in children {
            match child.as_rule() {
                Rule::version_def => versions.push(ast::Version::parse(t, child)?),
                _ => number = Some(child.as_str().to_string())
            }
        }

        match number {
            Some(number) => Ok(ast::Program::new(name.as_str().to_string(), number, versions)),
            None => Err(t.malformed(offset, "program"))
        }
    }
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Definition {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Definition> {
        let position = t.position(&pair);

        let which = match pair.as_rule() {
            Rule::constant_def => Which::Constant(ast::Constant::parse(t, pair)?),
            Rule::typedef_def => Which::Typedef(ast::Typedef::parse(t, pair)?),
            Rule::enum_def => Which::Enum(ast::Enum::parse(t, pair)?),
            Rule::struct_def => parse_struct(t, pair)?,
            Rule::union_def => Which::Union(ast::Union::parse(t, pair)?),
            Rule::program_def => Which::Program(ast::Program::parse(t, pair)?),
            _ => return Err(t.malformed(pair.as_span().start(), "definition"))
        };

        Ok(ast::Definition::new(position, which))
    }
}

fn parse_pragma(t: &mut Transformer<'_>, pair: Pair<'_, Rule>) -> Result<(ast::Pragma, String)> {
    let offset = pair.as_span().start();
    let mut children = significant(pair);
    let directive = t.expect(&mut children, offset, "pragma")?;
    let name = t.expect(&mut children, offset, "pragma")?;

    let pragma = match directive.as_str() {
        "header" => ast::Pragma::Header,
        "exclude" => ast::Pragma::Exclude,
        other => return Err(t.error(directive.as_span().start(), format!("Unrecognized pragma '{}'", other)))
    };

    Ok((pragma, name.as_str().to_string()))
}

impl<'i> ParseFrom<Pair<'i, Rule>> for ast::Specification {
    fn parse(t: &mut Transformer<'_>, pair: Pair<'i, Rule>) -> Result<ast::Specification> {
        let mut definitions: Vec<ast::Definition> = vec!();
        let mut pragmas = MultiMap::new();
        let mut after_passthru = false;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::EOI => {},
                Rule::pragma_def => {
                    let (pragma, name) = parse_pragma(t, child)?;
                    trace!(%pragma, name = name.as_str(), "pragma");
                    pragmas.insert(pragma, name);
                },
                Rule::passthru => {
                    let line = child.as_str().get(1..).unwrap_or("").to_string();
                    let merge = after_passthru && definitions.last().map_or(false, |d| d.kind() == "passthru");
                    if merge {
                        if let Some(Which::Passthru(passthru)) = definitions.last_mut().map(ast::Definition::which_mut) {
                            passthru.push_line(line);
                        }
                    } else {
                        let position = t.position(&child);
                        definitions.push(ast::Definition::new(position, Which::Passthru(ast::Passthru::new(vec!(line)))));
                    }
                    after_passthru = true;
                    continue;
                },
                _ => definitions.push(ast::Definition::parse(t, child)?)
            }
            after_passthru = false;
        }

        if let Some(excluded) = pragmas.get_vec(&ast::Pragma::Exclude) {
            for name in excluded.iter().filter(|name| !t.symbols.contains_key(name.as_str())) {
                warn!(name = name.as_str(), "pragma exclude names an undefined symbol");
            }
        }

        debug!(definitions = definitions.len(), "transformed specification");
        Ok(ast::Specification::new(definitions, pragmas))
    }
}

pub(crate) fn transform(filename: &str, source: &str) -> Result<ast::Specification> {
    let mut pairs = XdrParser::parse(Rule::specification, source)
        .map_err(|e| Diagnostic::from_pest(filename, source, e))?;

    let mut transformer = Transformer::new(filename, source);
    match pairs.next() {
        Some(specification) => ast::Specification::parse(&mut transformer, specification),
        None => Ok(ast::Specification::default())
    }
}
