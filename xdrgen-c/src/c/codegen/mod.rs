use getset::{CopyGetters, Getters};
use indoc::indoc;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, trace};

use parser::ast as xdr;
use parser::ast::definition::Which;

use crate::c::ast::Name;
use crate::c::Config;

mod members;
mod constants;
mod enums;
mod pointers;
mod typedefs;
mod structs;
mod unions;
mod programs;
mod passthru;

use constants::XdrConstantGenerator;
use enums::XdrEnumGenerator;
use pointers::XdrPointerGenerator;
use typedefs::XdrTypedefGenerator;
use structs::XdrStructGenerator;
use unions::XdrUnionGenerator;
use programs::XdrProgramGenerator;
use passthru::XdrPassthruGenerator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Declarations,
    Definitions,
    Maxsize
}

#[derive(Clone, Getters, CopyGetters, Debug)]
pub struct Context {
    #[getset(get_copy = "pub")]
    config: Config,

    #[getset(get = "pub")]
    filename: String,

    /// Upper-case prefix of size macros and header guards.
    #[getset(get = "pub")]
    prefix: String,

    excluded: HashSet<String>
}

impl Context {
    pub fn new(config: Config, path: &str, spec: &xdr::Specification) -> Context {
        let path = Path::new(path);
        let filename = path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path.file_stem()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();

        let prefix = Name::from(spec.header().unwrap_or(stem.as_str())).to_screaming_snake_case();
        let excluded = spec.pragmas()
            .get_vec(&xdr::Pragma::Exclude)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();

        debug!(prefix = prefix.as_str(), ?config, "generator context");
        Context { config, filename, prefix, excluded }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }
}

/// Emits the C text for one kind of definition. A mode with nothing to say yields `None`.
pub(crate) trait Generator<Node> {
    fn emit_declaration(&self, _ctx: &Context, _node: &Node) -> Option<String> {
        None
    }

    fn emit_definition(&self, _ctx: &Context, _node: &Node) -> Option<String> {
        None
    }

    fn emit_maxsize(&self, _ctx: &Context, _node: &Node) -> Option<String> {
        None
    }
}

/// Generators of data types also produce an encoder and a decoder function.
pub(crate) trait Codec<Node>: Generator<Node> {
    fn emit_encoder(&self, ctx: &Context, node: &Node) -> String;
    fn emit_decoder(&self, ctx: &Context, node: &Node) -> String;
}

pub(crate) fn c_ident(name: &str) -> String {
    Name::from(name).to_c_identifier()
}

pub(crate) fn c_value(value: &xdr::Value) -> String {
    match value {
        xdr::Value::Constant(text) => text.clone(),
        xdr::Value::Identifier(name) if name == "TRUE" => String::from("true"),
        xdr::Value::Identifier(name) if name == "FALSE" => String::from("false"),
        xdr::Value::Identifier(name) => c_ident(name)
    }
}

pub(crate) fn c_builtin_type(builtin: xdr::Builtin) -> &'static str {
    match builtin {
        xdr::Builtin::Int => "s32",
        xdr::Builtin::UnsignedInt => "u32",
        xdr::Builtin::Hyper => "s64",
        xdr::Builtin::UnsignedHyper => "u64",
        xdr::Builtin::Float => "float",
        xdr::Builtin::Double => "double",
        xdr::Builtin::Quadruple => "long double",
        xdr::Builtin::Bool => "bool"
    }
}

pub(crate) fn c_type(spec: &xdr::TypeSpecifier) -> String {
    match spec.kind() {
        xdr::TypeKind::Builtin(builtin) => String::from(c_builtin_type(builtin)),
        xdr::TypeKind::Enum | xdr::TypeKind::Typedef => c_ident(spec.type_name()),
        xdr::TypeKind::Struct | xdr::TypeKind::Union | xdr::TypeKind::Pointer => {
            format!("struct {}", c_ident(spec.type_name()))
        }
    }
}

/// Builtins and enums travel by value; everything else by address.
pub(crate) fn is_passed_by_value(spec: &xdr::TypeSpecifier) -> bool {
    match spec.kind() {
        xdr::TypeKind::Builtin(_) | xdr::TypeKind::Enum => true,
        _ => false
    }
}

/// Size in XDR units of one value of `spec`.
pub(crate) fn maxsize_of(ctx: &Context, spec: &xdr::TypeSpecifier) -> String {
    match spec.kind() {
        xdr::TypeKind::Builtin(builtin) => format!("XDR_{}", builtin.name()),
        _ => format!("{}_{}_sz", ctx.prefix(), spec.type_name())
    }
}

pub(crate) fn encoder_argument(c_type: &str, by_value: bool) -> String {
    if by_value {
        format!("{} value", c_type)
    } else {
        format!("const {} *value", c_type)
    }
}

pub(crate) fn indent(text: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { String::from("\n") } else { format!("    {}\n", line) })
        .collect()
}

fn codegen_body(statements: &[String]) -> String {
    statements.iter().map(|s| indent(s)).collect()
}

pub(crate) fn codegen_prototypes(name: &str, c_type: &str, by_value: bool) -> String {
    indoc!("
        bool xdrgen_decode_#NAME(struct xdr_stream *xdr, #TYPE *ptr);
        bool xdrgen_encode_#NAME(struct xdr_stream *xdr, #ARG);
    ")
    .replace("#NAME", name)
    .replace("#TYPE", c_type)
    .replace("#ARG", &encoder_argument(c_type, by_value))
}

pub(crate) fn codegen_decoder(name: &str, c_type: &str, statements: &[String]) -> String {
    indoc!("
        bool
        xdrgen_decode_#NAME(struct xdr_stream *xdr, #TYPE *ptr)
        {
        #BODY    return true;
        }
    ")
    .replace("#NAME", name)
    .replace("#TYPE", c_type)
    .replace("#BODY", &codegen_body(statements))
}

pub(crate) fn codegen_encoder(name: &str, argument: &str, statements: &[String]) -> String {
    indoc!("
        bool
        xdrgen_encode_#NAME(struct xdr_stream *xdr, #ARG)
        {
        #BODY    return true;
        }
    ")
    .replace("#NAME", name)
    .replace("#ARG", argument)
    .replace("#BODY", &codegen_body(statements))
}

/// `#define <name> \` followed by the parenthesised sum of `terms`.
pub(crate) fn codegen_size_macro(name: &str, terms: &[String]) -> String {
    let expression = if terms.is_empty() { String::from("0") } else { terms.join(" + ") };

    indoc!("
        #define #MACRO \\
            (#EXPR)
    ")
    .replace("#MACRO", name)
    .replace("#EXPR", &expression)
}

/// The type body, then its decoder and encoder unless the type is excluded.
pub(crate) fn codegen_with_codec<N, G: Codec<N>>(generator: &G, ctx: &Context, node: &N, name: &str, body: String) -> String {
    if ctx.is_excluded(name) {
        trace!(name, "codec excluded");
        return body;
    }

    format!("{}\n{}\n{}", body, generator.emit_decoder(ctx, node), generator.emit_encoder(ctx, node))
}

fn generate<N, G: Generator<N>>(generator: &G, ctx: &Context, node: &N, mode: Mode) -> Option<String> {
    match mode {
        Mode::Declarations => generator.emit_declaration(ctx, node),
        Mode::Definitions => generator.emit_definition(ctx, node),
        Mode::Maxsize => generator.emit_maxsize(ctx, node)
    }
}

fn generate_definition(ctx: &Context, definition: &xdr::Definition, mode: Mode) -> Option<String> {
    match definition.which() {
        Which::Constant(c) => generate(&XdrConstantGenerator, ctx, c, mode),
        Which::Enum(e) => generate(&XdrEnumGenerator, ctx, e, mode),
        Which::Pointer(p) => generate(&XdrPointerGenerator, ctx, p, mode),
        Which::Typedef(t) => generate(&XdrTypedefGenerator, ctx, t, mode),
        Which::Struct(s) => generate(&XdrStructGenerator, ctx, s, mode),
        Which::Union(u) => generate(&XdrUnionGenerator, ctx, u, mode),
        Which::Program(p) => generate(&XdrProgramGenerator, ctx, p, mode),
        Which::Passthru(p) => generate(&XdrPassthruGenerator, ctx, p, mode)
    }
}

fn codegen_annotation(ctx: &Context, definition: &xdr::Definition) -> String {
    format!(
        "/* {}:{}: {} {} */\n",
        ctx.filename(),
        definition.position().line(),
        definition.kind(),
        definition.name().unwrap_or("")
    )
}

/// Generates every definition for `mode` in source order, separated by blank lines.
pub fn codegen(ctx: &Context, spec: &xdr::Specification, mode: Mode) -> String {
    let annotate = ctx.config().annotate() && mode != Mode::Maxsize;

    spec.definitions()
        .iter()
        .filter_map(|definition| {
            let block = generate_definition(ctx, definition, mode)?;
            trace!(kind = definition.kind(), name = definition.name().unwrap_or(""), ?mode, "generated");

            Some(match definition.which() {
                Which::Passthru(_) => block,
                _ if annotate => codegen_annotation(ctx, definition) + &block.replace("    ", "\t"),
                _ => block.replace("    ", "\t")
            })
        })
        .collect::<Vec<String>>()
        .join("\n")
}
