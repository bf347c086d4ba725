use indoc::indoc;

use super::*;

pub(crate) struct XdrConstantGenerator;

impl Generator<xdr::Constant> for XdrConstantGenerator {
    fn emit_definition(&self, _ctx: &Context, c: &xdr::Constant) -> Option<String> {
        Some(
            indoc!("
                #define #NAME (#VALUE)
            ")
            .replace("#NAME", &c_ident(c.name()))
            .replace("#VALUE", c.value())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate_source;
    use super::*;

    #[test]
    fn test_constant() {
        assert_eq!("#define FOO (42)\n", generate_source("const FOO = 42;", Config::default(), Mode::Definitions));
        assert_eq!("#define MASK (0xff)\n", generate_source("const MASK = 0xff;", Config::default(), Mode::Definitions));
    }
}
