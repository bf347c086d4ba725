use indoc::indoc;

use super::members::{codegen_decoder_statements, codegen_encoder_statements, codegen_member, maxsize_term};
use super::*;

pub(crate) struct XdrTypedefGenerator;

impl Generator<xdr::Typedef> for XdrTypedefGenerator {
    fn emit_declaration(&self, ctx: &Context, t: &xdr::Typedef) -> Option<String> {
        if ctx.is_excluded(t.name()) {
            return None;
        }
        Some(codegen_prototypes(t.name(), &c_ident(t.name()), false))
    }

    fn emit_definition(&self, ctx: &Context, t: &xdr::Typedef) -> Option<String> {
        let member = codegen_member(t.declaration())?;
        let body = indoc!("
            typedef #MEMBER;
        ")
        .replace("#MEMBER", &member);

        Some(codegen_with_codec(self, ctx, t, t.name(), body))
    }

    fn emit_maxsize(&self, ctx: &Context, t: &xdr::Typedef) -> Option<String> {
        let terms = maxsize_term(ctx, t.declaration(), t.name()).into_iter().collect::<Vec<String>>();
        Some(codegen_size_macro(&format!("{}_{}_sz", ctx.prefix(), t.name()), &terms))
    }
}

/// Typedef codecs receive the typedef by address and work through `(*ptr)`.
impl Codec<xdr::Typedef> for XdrTypedefGenerator {
    fn emit_encoder(&self, _ctx: &Context, t: &xdr::Typedef) -> String {
        let statements = codegen_encoder_statements(t.declaration(), "(*value)");
        codegen_encoder(t.name(), &encoder_argument(&c_ident(t.name()), false), &statements)
    }

    fn emit_decoder(&self, _ctx: &Context, t: &xdr::Typedef) -> String {
        let statements = codegen_decoder_statements(t.declaration(), "(*ptr)");
        codegen_decoder(t.name(), &c_ident(t.name()), &statements)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate_source;
    use super::*;

    #[test]
    fn test_typedef_forms() {
        let source = "const LEN = 8;\n\
                      typedef int count;\n\
                      typedef opaque verifier[LEN];\n\
                      typedef opaque blob<>;\n\
                      typedef string name<64>;\n\
                      typedef count counts<LEN>;\n";
        let output = generate_source(source, Config::default(), Mode::Definitions);

        assert!(output.contains("typedef s32 count;\n"), "{}", output);
        assert!(output.contains("typedef u8 verifier[LEN];\n"), "{}", output);
        assert!(output.contains("typedef opaque blob;\n"), "{}", output);
        assert!(output.contains("typedef string name;\n"), "{}", output);
        assert!(output.contains("typedef struct {\n\tu32 count;\n\tcount *element;\n} counts;\n"), "{}", output);
    }

    #[test]
    fn test_typedef_codec() {
        let output = generate_source("typedef unsigned hyper cookie;", Config::default(), Mode::Definitions);

        assert_eq!(
            "typedef u64 cookie;\n\
             \n\
             bool\n\
             xdrgen_decode_cookie(struct xdr_stream *xdr, cookie *ptr)\n\
             {\n\
             \tif (!xdrgen_decode_unsigned_hyper(xdr, ptr))\n\
             \t\treturn false;\n\
             \treturn true;\n\
             }\n\
             \n\
             bool\n\
             xdrgen_encode_cookie(struct xdr_stream *xdr, const cookie *value)\n\
             {\n\
             \tif (!xdrgen_encode_unsigned_hyper(xdr, (*value)))\n\
             \t\treturn false;\n\
             \treturn true;\n\
             }\n",
            output
        );
    }

    #[test]
    fn test_typedef_array_codec() {
        let output = generate_source("typedef int counts<4>;", Config::default(), Mode::Definitions);

        assert!(output.contains("\tif ((*ptr).count > 4)\n"), "{}", output);
        assert!(output.contains("\t\tif (!xdrgen_encode_int(xdr, (*value).element[i]))\n"), "{}", output);
    }

    #[test]
    fn test_typedef_maxsize() {
        assert_eq!(
            "#define TEST_counts_sz \\\n\t(XDR_unsigned_int + 4 * XDR_int)\n",
            generate_source("typedef int counts<4>;", Config::default(), Mode::Maxsize)
        );
    }
}
