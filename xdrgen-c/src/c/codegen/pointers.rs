use super::structs::{codegen_struct_declaration, codegen_struct_decoder, codegen_struct_encoder, codegen_struct_maxsize, codegen_struct_type};
use super::*;

/// Linked-list structs share the struct layout; the link back to the list only
/// contributes its presence flag to the size bound.
pub(crate) struct XdrPointerGenerator;

impl Generator<xdr::Pointer> for XdrPointerGenerator {
    fn emit_declaration(&self, ctx: &Context, p: &xdr::Pointer) -> Option<String> {
        codegen_struct_declaration(ctx, p.name())
    }

    fn emit_definition(&self, ctx: &Context, p: &xdr::Pointer) -> Option<String> {
        Some(codegen_with_codec(self, ctx, p, p.name(), codegen_struct_type(p.name(), p.fields())))
    }

    fn emit_maxsize(&self, ctx: &Context, p: &xdr::Pointer) -> Option<String> {
        Some(codegen_struct_maxsize(ctx, p.name(), p.fields()))
    }
}

impl Codec<xdr::Pointer> for XdrPointerGenerator {
    fn emit_encoder(&self, _ctx: &Context, p: &xdr::Pointer) -> String {
        codegen_struct_encoder(p.name(), p.fields())
    }

    fn emit_decoder(&self, _ctx: &Context, p: &xdr::Pointer) -> String {
        codegen_struct_decoder(p.name(), p.fields())
    }
}
