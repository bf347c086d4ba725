#[macro_use] extern crate derive_more;
extern crate getset;

pub mod ast;
pub mod diagnostic;
mod grammar;
mod transform;

pub use diagnostic::{Category, Diagnostic};

/// Parses and checks an XDR specification. `filename` only labels diagnostics.
pub fn parse(filename: &str, source: &str) -> Result<ast::Specification, Diagnostic> {
    tracing::debug!(filename, bytes = source.len(), "parsing");
    return transform::transform(filename, source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::declaration;
    use ast::definition::Which;

    fn parse_ok(source: &str) -> ast::Specification {
        match parse("test.x", source) {
            Ok(spec) => spec,
            Err(e) => panic!("unexpected diagnostic:\n{}", e)
        }
    }

    fn parse_err(source: &str) -> Diagnostic {
        match parse("test.x", source) {
            Ok(spec) => panic!("expected a diagnostic, got {:?}", spec),
            Err(e) => e
        }
    }

    #[test]
    fn test_constant() {
        let spec = parse_ok("const FOO = 42;\nconst BAR = -0x10;\n");

        assert_eq!(2, spec.definitions().len());
        match spec.definitions()[1].which() {
            Which::Constant(c) => {
                assert_eq!("BAR", c.name());
                assert_eq!("-0x10", c.value());
            },
            other => panic!("unexpected {:?}", other)
        }
        assert_eq!(ast::Position::new(2, 1), spec.definitions()[1].position());
    }

    #[test]
    fn test_struct_members() {
        let spec = parse_ok(
            "const MAX = 8;\n\
             struct S {\n\
                 int a;\n\
                 unsigned b<>;\n\
                 opaque c[MAX];\n\
                 string d<16>;\n\
                 unsigned hyper e;\n\
             };\n"
        );

        let s = match spec.definitions()[1].which() {
            Which::Struct(s) => s,
            other => panic!("unexpected {:?}", other)
        };
        let fields = s.fields();
        assert_eq!(5, fields.len());
        assert_eq!(
            &declaration::Which::Basic(ast::TypeSpecifier::builtin(ast::Builtin::Int)),
            fields[0].which()
        );
        assert_eq!(
            &declaration::Which::VariableArray {
                spec: ast::TypeSpecifier::builtin(ast::Builtin::UnsignedInt),
                maxsize: None
            },
            fields[1].which()
        );
        assert_eq!(
            &declaration::Which::FixedOpaque { size: ast::Value::Identifier(String::from("MAX")) },
            fields[2].which()
        );
        assert_eq!(
            &declaration::Which::String { maxsize: Some(ast::Value::Constant(String::from("16"))) },
            fields[3].which()
        );
        assert_eq!(Some(&ast::TypeSpecifier::builtin(ast::Builtin::UnsignedHyper)), fields[4].type_specifier());
    }

    #[test]
    fn test_pointer_detection() {
        let spec = parse_ok("struct node { int value; node *next; };\nstruct list { node *head; };\n");

        match spec.definitions()[0].which() {
            Which::Pointer(p) => {
                assert_eq!("node", p.name());
                assert_eq!(
                    Some(ast::TypeKind::Pointer),
                    p.fields()[1].type_specifier().map(ast::TypeSpecifier::kind)
                );
            },
            other => panic!("unexpected {:?}", other)
        }
        match spec.definitions()[1].which() {
            Which::Struct(s) => assert_eq!(
                Some(ast::TypeKind::Pointer),
                s.fields()[0].type_specifier().map(ast::TypeSpecifier::kind)
            ),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn test_union_and_enum() {
        let spec = parse_ok(
            "enum color { RED = 0, GREEN = 1 };\n\
             union u switch (color c) {\n\
             case RED:\n\
             case GREEN:\n\
                 int x;\n\
             default:\n\
                 void;\n\
             };\n"
        );

        match spec.definitions()[1].which() {
            Which::Union(u) => {
                assert_eq!("c", u.discriminant().name());
                assert_eq!(1, u.arms().len());
                assert_eq!(2, u.arms()[0].values().len());
                assert!(u.default().as_ref().map_or(false, ast::Declaration::is_void));
            },
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn test_program() {
        let spec = parse_ok(
            "struct args { int a; };\n\
             program CALC {\n\
                 version CALC_V1 {\n\
                     void CALC_NULL(void) = 0;\n\
                     int CALC_ADD(args) = 1;\n\
                 } = 1;\n\
             } = 0x20000001;\n"
        );

        match spec.definitions()[1].which() {
            Which::Program(p) => {
                assert_eq!("0x20000001", p.number());
                let procedures = p.versions()[0].procedures();
                assert_eq!(None, *procedures[0].argument());
                assert_eq!(None, *procedures[0].result());
                assert_eq!(Some("args"), procedures[1].argument().as_ref().map(|a| a.type_name().as_str()));
                assert_eq!(ast::Position::new(5, 1), procedures[1].position());
            },
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn test_passthru_and_pragmas() {
        let spec = parse_ok(
            "%#include <a.h>\n\
             %#include <b.h>\n\
             pragma header nfs4;\n\
             pragma exclude S;\n\
             struct S { int a; };\n\
             %/* trailer */\n"
        );

        assert_eq!(Some("nfs4"), spec.header());
        assert!(spec.is_excluded("S"));
        assert_eq!(3, spec.definitions().len());
        match spec.definitions()[0].which() {
            Which::Passthru(p) => assert_eq!(&vec!(String::from("#include <a.h>"), String::from("#include <b.h>")), p.lines()),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn test_comments() {
        let spec = parse_ok("/* block\n comment */ const A = 1; // trailing\n");
        assert_eq!(1, spec.definitions().len());
    }

    #[test]
    fn test_undefined_type() {
        let e = parse_err("struct S { T x; };");

        assert_eq!(Category::Semantic, e.category());
        assert_eq!("Undefined type 'T'", e.message());
        assert_eq!(ast::Position::new(1, 12), e.position());
    }

    #[test]
    fn test_semantic_errors() {
        assert_eq!("Undefined constant 'N'", parse_err("struct S { int a[N]; };").message());
        assert_eq!("Duplicate definition of 'A'", parse_err("const A = 1;\nconst A = 2;").message());
        assert_eq!("Unrecognized pragma 'bogus'", parse_err("pragma bogus x;").message());
        assert_eq!(
            "Invalid union discriminant 'd'",
            parse_err("union U switch (int d<>) { case 0: void; };").message()
        );
    }

    #[test]
    fn test_union_discriminant_types() {
        let e = parse_err("struct P { hyper h; };\nunion U switch (P p) { case 0: int x; };");
        assert_eq!("Invalid union discriminant 'p'", e.message());
        assert_eq!(ast::Position::new(2, 17), e.position());

        for discriminant in &["float f", "double f", "quadruple f", "hyper f", "unsigned hyper f"] {
            let source = format!("union U switch ({}) {{ case 0: int x; }};", discriminant);
            assert_eq!("Invalid union discriminant 'f'", parse_err(&source).message());
        }

        parse_ok("enum E { A = 0 };\nunion U1 switch (E e) { case A: void; };");
        parse_ok("union U2 switch (unsigned int d) { case 0: void; };");
        parse_ok("union U3 switch (bool b) { case TRUE: int x; case FALSE: void; };");
    }

    #[test]
    fn test_self_containing_types() {
        let e = parse_err("struct S2 { S2 s; };");
        assert_eq!("Undefined type 'S2'", e.message());
        assert_eq!(ast::Position::new(1, 13), e.position());

        assert_eq!("Undefined type 'S2'", parse_err("struct S2 { int a; S2 s[2]; };").message());
        assert_eq!("Undefined type 'U'", parse_err("union U switch (int d) { case 0: U u; };").message());

        let spec = parse_ok("union U switch (int d) { case 0: U *next; default: void; };");
        match spec.definitions()[0].which() {
            Which::Union(u) => assert_eq!(
                Some(ast::TypeKind::Union),
                u.arms()[0].declaration().type_specifier().map(ast::TypeSpecifier::kind)
            ),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn test_duplicate_typedef_position() {
        let e = parse_err("const A = 1;\ntypedef int   A;");

        assert_eq!("Duplicate definition of 'A'", e.message());
        assert_eq!(ast::Position::new(2, 15), e.position());
    }

    #[test]
    fn test_duplicate_members() {
        let e = parse_err("union U switch (int d) { case 0: int x; case 1: int x; };");
        assert_eq!("Duplicate definition of 'x'", e.message());
        assert_eq!(ast::Position::new(1, 53), e.position());

        assert_eq!("Duplicate definition of 'a'", parse_err("struct S { int a; hyper a; };").message());
        assert_eq!(
            "Duplicate definition of 'x'",
            parse_err("union V switch (int d) { case 0: int x; default: hyper x; };").message()
        );
        parse_ok("union W switch (int d) { case 0: void; case 1: void; default: int d; };");
    }

    #[test]
    fn test_truncated_struct() {
        let e = parse_err("struct S {\n");

        assert_eq!(Category::Parse, e.category());
        assert_eq!(ast::Position::new(2, 1), e.position());
        assert!(e.message().starts_with("Unexpected end of file"), "{}", e.message());
    }

    #[test]
    fn test_missing_semicolon() {
        let e = parse_err("struct S { int a };");

        assert_eq!(ast::Position::new(1, 18), e.position());
        assert!(e.message().starts_with("Unexpected '}'"), "{}", e.message());
        assert!(e.message().contains("';'"), "{}", e.message());
    }

    #[test]
    fn test_keyword_is_not_identifier() {
        let e = parse_err("const int = 1;");
        assert!(e.message().starts_with("Unexpected 'int'"), "{}", e.message());
    }
}
