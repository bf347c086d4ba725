use indoc::indoc;

use super::members::{codegen_decoder_statements, codegen_encoder_statements, codegen_member, maxsize_term};
use super::*;

pub(crate) struct XdrUnionGenerator;

/// Every arm's declaration, the default arm last.
fn arm_declarations(u: &xdr::Union) -> Vec<&xdr::Declaration> {
    u.arms()
        .iter()
        .map(xdr::CaseArm::declaration)
        .chain(u.default().iter())
        .collect()
}

fn codegen_union_type(u: &xdr::Union) -> String {
    let mut members = vec!();
    members.extend(codegen_member(u.discriminant()).map(|m| format!("{};", m)));

    let arms = arm_declarations(u)
        .into_iter()
        .filter_map(codegen_member)
        .map(|m| format!("{};", m))
        .collect::<Vec<String>>();
    if arms.len() > 0 {
        members.push(
            indoc!("
                union {
                    #ARMS
                } u;"
            )
            .replace("#ARMS", &arms.join("\n").replace("\n", "\n    "))
        );
    }

    indoc!("
        struct #NAME {
            #MEMBERS
        };
    ")
    .replace("#NAME", &c_ident(u.name()))
    .replace("#MEMBERS", &members.join("\n").replace("\n", "\n    "))
}

fn codegen_switch<F>(u: &xdr::Union, base: &str, arm_statements: F) -> String
where
    F: Fn(&xdr::Declaration, &str) -> Vec<String>
{
    let arm_body = |decl: &xdr::Declaration| -> String {
        let mut statements = arm_statements(decl, &format!("{}->u.{}", base, c_ident(decl.name())));
        statements.push(String::from("break;"));
        statements.iter().map(|s| indent(s)).collect()
    };

    let mut cases = String::new();
    for arm in u.arms() {
        for value in arm.values() {
            cases.push_str(&format!("case {}:\n", c_value(value)));
        }
        cases.push_str(&arm_body(arm.declaration()));
    }
    match u.default() {
        Some(decl) => {
            cases.push_str("default:\n");
            cases.push_str(&arm_body(decl));
        },
        None => cases.push_str("default:\n    return false;\n")
    }

    indoc!("
        switch (#BASE->#DISC) {
        #CASES}"
    )
    .replace("#BASE", base)
    .replace("#DISC", &c_ident(u.discriminant().name()))
    .replace("#CASES", &cases)
}

fn codegen_max(terms: &[String]) -> Option<String> {
    match terms.split_first() {
        None => None,
        Some((head, [])) => Some(head.clone()),
        Some((head, tail)) => codegen_max(tail).map(|rest| format!("XDRGEN_MAX({}, {})", head, rest))
    }
}

impl Generator<xdr::Union> for XdrUnionGenerator {
    fn emit_declaration(&self, ctx: &Context, u: &xdr::Union) -> Option<String> {
        if ctx.is_excluded(u.name()) {
            return None;
        }
        Some(codegen_prototypes(u.name(), &format!("struct {}", c_ident(u.name())), false))
    }

    fn emit_definition(&self, ctx: &Context, u: &xdr::Union) -> Option<String> {
        Some(codegen_with_codec(self, ctx, u, u.name(), codegen_union_type(u)))
    }

    /// The discriminant plus the largest arm.
    fn emit_maxsize(&self, ctx: &Context, u: &xdr::Union) -> Option<String> {
        let mut terms = vec!();
        terms.extend(maxsize_term(ctx, u.discriminant(), u.name()));

        let arms = arm_declarations(u)
            .into_iter()
            .filter_map(|decl| maxsize_term(ctx, decl, u.name()))
            .collect::<Vec<String>>();
        terms.extend(codegen_max(&arms));

        Some(codegen_size_macro(&format!("{}_{}_sz", ctx.prefix(), u.name()), &terms))
    }
}

impl Codec<xdr::Union> for XdrUnionGenerator {
    fn emit_encoder(&self, _ctx: &Context, u: &xdr::Union) -> String {
        let mut statements = codegen_encoder_statements(
            u.discriminant(),
            &format!("value->{}", c_ident(u.discriminant().name()))
        );
        statements.push(codegen_switch(u, "value", codegen_encoder_statements));

        codegen_encoder(u.name(), &encoder_argument(&format!("struct {}", c_ident(u.name())), false), &statements)
    }

    fn emit_decoder(&self, _ctx: &Context, u: &xdr::Union) -> String {
        let mut statements = codegen_decoder_statements(
            u.discriminant(),
            &format!("ptr->{}", c_ident(u.discriminant().name()))
        );
        statements.push(codegen_switch(u, "ptr", codegen_decoder_statements));

        codegen_decoder(u.name(), &format!("struct {}", c_ident(u.name())), &statements)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate_source;
    use super::*;

    const RESULT: &str = "enum stat { OK = 0, ERR = 1, PERM = 2 };\n\
                          union result switch (stat status) {\n\
                          case OK:\n\
                              hyper value;\n\
                          case ERR:\n\
                          case PERM:\n\
                              void;\n\
                          };\n";

    #[test]
    fn test_union_type() {
        let output = generate_source(RESULT, Config::default(), Mode::Definitions);

        assert!(output.contains("struct result {\n\tstat status;\n\tunion {\n\t\ts64 value;\n\t} u;\n};\n"), "{}", output);
    }

    #[test]
    fn test_union_decoder() {
        let output = generate_source(RESULT, Config::default(), Mode::Definitions);

        assert!(
            output.contains(
                "\tif (!xdrgen_decode_stat(xdr, &ptr->status))\n\
                 \t\treturn false;\n\
                 \tswitch (ptr->status) {\n\
                 \tcase OK:\n\
                 \t\tif (!xdrgen_decode_hyper(xdr, &ptr->u.value))\n\
                 \t\t\treturn false;\n\
                 \t\tbreak;\n\
                 \tcase ERR:\n\
                 \tcase PERM:\n\
                 \t\tbreak;\n\
                 \tdefault:\n\
                 \t\treturn false;\n\
                 \t}\n\
                 \treturn true;\n"
            ),
            "{}",
            output
        );
        assert!(output.contains("\tif (!xdrgen_encode_stat(xdr, value->status))\n"), "{}", output);
        assert!(output.contains("\t\tif (!xdrgen_encode_hyper(xdr, value->u.value))\n"), "{}", output);
    }

    #[test]
    fn test_union_default_arm() {
        let source = "union opt switch (bool present) { case TRUE: int x; default: void; };";
        let output = generate_source(source, Config::default(), Mode::Definitions);

        assert!(output.contains("\tcase true:\n"), "{}", output);
        assert!(output.contains("\tdefault:\n\t\tbreak;\n\t}\n"), "{}", output);
    }

    #[test]
    fn test_union_maxsize() {
        let source = "struct big { hyper a; hyper b; };\n\
                      union u switch (unsigned int d) { case 0: int x; case 1: big y; default: void; };";

        assert!(
            generate_source(source, Config::default(), Mode::Maxsize)
                .ends_with("#define TEST_u_sz \\\n\t(XDR_unsigned_int + XDRGEN_MAX(XDR_int, TEST_big_sz))\n")
        );
    }

    #[test]
    fn test_codegen_max() {
        let terms = vec!(String::from("a"), String::from("b"), String::from("c"));

        assert_eq!(Some(String::from("XDRGEN_MAX(a, XDRGEN_MAX(b, c))")), codegen_max(&terms));
        assert_eq!(Some(String::from("a")), codegen_max(&terms[..1]));
        assert_eq!(None, codegen_max(&[]));
    }
}
