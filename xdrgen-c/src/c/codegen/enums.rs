use indoc::indoc;

use super::*;

pub(crate) struct XdrEnumGenerator;

fn codegen_enum_type(e: &xdr::Enum) -> String {
    indoc!("
        enum #NAME {
            #ENUMERATORS
        };
        typedef enum #NAME #NAME;
    ")
    .replace("#NAME", &c_ident(e.name()))
    .replace(
        "#ENUMERATORS",
        &e.enumerators()
            .iter()
            .map(|e| format!("{} = {},", c_ident(e.name()), c_value(e.value())))
            .collect::<Vec<String>>()
            .join("\n    ")
    )
}

fn codegen_validation(e: &xdr::Enum) -> String {
    indoc!("
        switch (val) {
        #CASES
            break;
        default:
            return false;
        }"
    )
    .replace(
        "#CASES",
        &e.enumerators()
            .iter()
            .map(|e| format!("case {}:", c_ident(e.name())))
            .collect::<Vec<String>>()
            .join("\n")
    )
}

impl Generator<xdr::Enum> for XdrEnumGenerator {
    fn emit_declaration(&self, ctx: &Context, e: &xdr::Enum) -> Option<String> {
        if ctx.is_excluded(e.name()) {
            return None;
        }
        Some(codegen_prototypes(e.name(), &c_ident(e.name()), true))
    }

    fn emit_definition(&self, ctx: &Context, e: &xdr::Enum) -> Option<String> {
        Some(codegen_with_codec(self, ctx, e, e.name(), codegen_enum_type(e)))
    }

    fn emit_maxsize(&self, ctx: &Context, e: &xdr::Enum) -> Option<String> {
        Some(codegen_size_macro(&format!("{}_{}_sz", ctx.prefix(), e.name()), &[String::from("XDR_int")]))
    }
}

impl Codec<xdr::Enum> for XdrEnumGenerator {
    fn emit_encoder(&self, _ctx: &Context, e: &xdr::Enum) -> String {
        let statements = vec!(String::from(indoc!("
            if (xdr_stream_encode_u32(xdr, value) != XDR_UNIT)
                return false;"
        )));

        codegen_encoder(e.name(), &encoder_argument(&c_ident(e.name()), true), &statements)
    }

    /// The wire value is checked against the enumerators unless validation is off.
    fn emit_decoder(&self, ctx: &Context, e: &xdr::Enum) -> String {
        let mut statements = vec!(String::from(indoc!("
            u32 val;

            if (xdr_stream_decode_u32(xdr, &val) < 0)
                return false;"
        )));
        if ctx.config().enum_validation() {
            statements.push(codegen_validation(e));
        }
        statements.push(String::from("*ptr = val;"));

        codegen_decoder(e.name(), &c_ident(e.name()), &statements)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate_source;
    use super::*;
    use crate::c::Peer;

    const COLOR: &str = "enum color { RED = 0, GREEN = 1 };";

    #[test]
    fn test_enum_definition() {
        let output = generate_source(COLOR, Config::default(), Mode::Definitions);

        assert!(output.starts_with("enum color {\n\tRED = 0,\n\tGREEN = 1,\n};\ntypedef enum color color;\n"), "{}", output);
        assert!(output.contains("bool\nxdrgen_encode_color(struct xdr_stream *xdr, color value)\n{\n"), "{}", output);
        assert!(
            output.contains("\tswitch (val) {\n\tcase RED:\n\tcase GREEN:\n\t\tbreak;\n\tdefault:\n\t\treturn false;\n\t}\n\t*ptr = val;\n\treturn true;\n}\n"),
            "{}",
            output
        );
    }

    #[test]
    fn test_enum_validation_off() {
        let output = generate_source(COLOR, Config::new(Peer::Server, false, false), Mode::Definitions);

        assert!(!output.contains("switch (val)"), "{}", output);
        assert!(output.contains("\t\treturn false;\n\t*ptr = val;\n"), "{}", output);
    }

    #[test]
    fn test_enum_declaration_and_maxsize() {
        assert_eq!(
            "bool xdrgen_decode_color(struct xdr_stream *xdr, color *ptr);\nbool xdrgen_encode_color(struct xdr_stream *xdr, color value);\n",
            generate_source(COLOR, Config::default(), Mode::Declarations)
        );
        assert_eq!("#define TEST_color_sz \\\n\t(XDR_int)\n", generate_source(COLOR, Config::default(), Mode::Maxsize));
    }

    #[test]
    fn test_excluded_enum_keeps_type() {
        let source = "pragma exclude color;\nenum color { RED = 0 };";

        assert_eq!("", generate_source(source, Config::default(), Mode::Declarations));
        assert_eq!(
            "enum color {\n\tRED = 0,\n};\ntypedef enum color color;\n",
            generate_source(source, Config::default(), Mode::Definitions)
        );
    }
}
