use indoc::indoc;

use super::members::{codegen_decoder_statements, codegen_encoder_statements, codegen_member, maxsize_term};
use super::*;

pub(crate) struct XdrStructGenerator;

pub(crate) fn codegen_struct_type(name: &str, fields: &[xdr::Declaration]) -> String {
    indoc!("
        struct #NAME {
            #FIELDS
        };
    ")
    .replace("#NAME", &c_ident(name))
    .replace(
        "#FIELDS",
        &fields.iter()
            .filter_map(codegen_member)
            .map(|member| format!("{};", member))
            .collect::<Vec<String>>()
            .join("\n")
            .replace("\n", "\n    ")
    )
}

pub(crate) fn codegen_struct_declaration(ctx: &Context, name: &str) -> Option<String> {
    if ctx.is_excluded(name) {
        return None;
    }
    Some(codegen_prototypes(name, &format!("struct {}", c_ident(name)), false))
}

pub(crate) fn codegen_struct_decoder(name: &str, fields: &[xdr::Declaration]) -> String {
    let statements = fields.iter()
        .flat_map(|f| codegen_decoder_statements(f, &format!("ptr->{}", c_ident(f.name()))))
        .collect::<Vec<String>>();

    codegen_decoder(name, &format!("struct {}", c_ident(name)), &statements)
}

pub(crate) fn codegen_struct_encoder(name: &str, fields: &[xdr::Declaration]) -> String {
    let statements = fields.iter()
        .flat_map(|f| codegen_encoder_statements(f, &format!("value->{}", c_ident(f.name()))))
        .collect::<Vec<String>>();

    codegen_encoder(name, &encoder_argument(&format!("struct {}", c_ident(name)), false), &statements)
}

pub(crate) fn codegen_struct_maxsize(ctx: &Context, name: &str, fields: &[xdr::Declaration]) -> String {
    let terms = fields.iter()
        .filter_map(|f| maxsize_term(ctx, f, name))
        .collect::<Vec<String>>();

    codegen_size_macro(&format!("{}_{}_sz", ctx.prefix(), name), &terms)
}

impl Generator<xdr::Struct> for XdrStructGenerator {
    fn emit_declaration(&self, ctx: &Context, s: &xdr::Struct) -> Option<String> {
        codegen_struct_declaration(ctx, s.name())
    }

    fn emit_definition(&self, ctx: &Context, s: &xdr::Struct) -> Option<String> {
        Some(codegen_with_codec(self, ctx, s, s.name(), codegen_struct_type(s.name(), s.fields())))
    }

    fn emit_maxsize(&self, ctx: &Context, s: &xdr::Struct) -> Option<String> {
        Some(codegen_struct_maxsize(ctx, s.name(), s.fields()))
    }
}

impl Codec<xdr::Struct> for XdrStructGenerator {
    fn emit_encoder(&self, _ctx: &Context, s: &xdr::Struct) -> String {
        codegen_struct_encoder(s.name(), s.fields())
    }

    fn emit_decoder(&self, _ctx: &Context, s: &xdr::Struct) -> String {
        codegen_struct_decoder(s.name(), s.fields())
    }
}
