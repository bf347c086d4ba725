use super::*;

pub(crate) struct XdrPassthruGenerator;

/// Passthrough lines land verbatim in the definitions and nowhere else.
impl Generator<xdr::Passthru> for XdrPassthruGenerator {
    fn emit_definition(&self, _ctx: &Context, p: &xdr::Passthru) -> Option<String> {
        Some(p.lines().iter().map(|line| format!("{}\n", line)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate_source;
    use super::*;

    #[test]
    fn test_passthru_is_verbatim() {
        let source = "%#include <linux/sunrpc/xdrgen/nfs4_1.h>\n%    indented;\n";

        assert_eq!(
            "#include <linux/sunrpc/xdrgen/nfs4_1.h>\n    indented;\n",
            generate_source(source, Config::default(), Mode::Definitions)
        );
        assert_eq!("", generate_source(source, Config::default(), Mode::Declarations));
    }
}
