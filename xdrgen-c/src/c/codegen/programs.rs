use indoc::indoc;

use super::*;
use crate::c::Peer;

pub(crate) struct XdrProgramGenerator;

/// An RPC argument or result marshalling function for one peer.
struct Stub {
    returns: &'static str,
    name: String,
    params: &'static str,
    body: String
}

impl Stub {
    fn prototype(&self) -> String {
        format!("{} {}({});\n", self.returns, self.name, self.params)
    }

    fn definition(&self) -> String {
        indoc!("
            #RETURNS
            #NAME(#PARAMS)
            {
            #BODY}
        ")
        .replace("#RETURNS", self.returns)
        .replace("#NAME", &self.name)
        .replace("#PARAMS", self.params)
        .replace("#BODY", &indent(&self.body))
    }
}

fn stub_type_name(spec: Option<&xdr::TypeSpecifier>) -> &str {
    spec.map(|s| s.type_name().as_str()).unwrap_or("void")
}

/// Distinct argument or result types of the procedures that are not excluded, in
/// first-use order.
fn stub_types<'a, F>(ctx: &Context, p: &'a xdr::Program, select: F) -> Vec<Option<&'a xdr::TypeSpecifier>>
where
    F: Fn(&'a xdr::Procedure) -> &'a Option<xdr::TypeSpecifier>
{
    let mut types: Vec<Option<&xdr::TypeSpecifier>> = vec!();
    for procedure in p.versions().iter().flat_map(|v| v.procedures().iter()) {
        if ctx.is_excluded(procedure.name()) {
            continue;
        }
        let spec = select(procedure).as_ref();
        if !types.iter().any(|t| stub_type_name(*t) == stub_type_name(spec)) {
            types.push(spec);
        }
    }
    types
}

fn server_decode_stub(program: &str, spec: Option<&xdr::TypeSpecifier>) -> Stub {
    let body = match spec {
        Some(spec) => {
            indoc!("
                #TYPE *argp = rqstp->rq_argp;

                return xdrgen_decode_#NAME(xdr, argp);
            ")
            .replace("#TYPE", &c_type(spec))
            .replace("#NAME", spec.type_name())
        },
        None => String::from("return xdrgen_decode_void(xdr);\n")
    };

    Stub {
        returns: "bool",
        name: format!("{}_svc_decode_{}", program, stub_type_name(spec)),
        params: "struct svc_rqst *rqstp, struct xdr_stream *xdr",
        body
    }
}

fn server_encode_stub(program: &str, spec: Option<&xdr::TypeSpecifier>) -> Stub {
    let body = match spec {
        Some(spec) => {
            indoc!("
                #TYPE *resp = rqstp->rq_resp;

                return xdrgen_encode_#NAME(xdr, #RESP);
            ")
            .replace("#TYPE", &c_type(spec))
            .replace("#NAME", spec.type_name())
            .replace("#RESP", if is_passed_by_value(spec) { "*resp" } else { "resp" })
        },
        None => String::from("return xdrgen_encode_void(xdr);\n")
    };

    Stub {
        returns: "bool",
        name: format!("{}_svc_encode_{}", program, stub_type_name(spec)),
        params: "struct svc_rqst *rqstp, struct xdr_stream *xdr",
        body
    }
}

fn client_encode_stub(program: &str, spec: Option<&xdr::TypeSpecifier>) -> Stub {
    let body = match spec {
        Some(spec) => {
            indoc!("
                const #TYPE *args = data;

                xdrgen_encode_#NAME(xdr, #ARGS);
            ")
            .replace("#TYPE", &c_type(spec))
            .replace("#NAME", spec.type_name())
            .replace("#ARGS", if is_passed_by_value(spec) { "*args" } else { "args" })
        },
        None => String::from("xdrgen_encode_void(xdr);\n")
    };

    Stub {
        returns: "void",
        name: format!("{}_clnt_encode_{}", program, stub_type_name(spec)),
        params: "struct rpc_rqst *req, struct xdr_stream *xdr, const void *data",
        body
    }
}

fn client_decode_stub(program: &str, spec: Option<&xdr::TypeSpecifier>) -> Stub {
    let body = match spec {
        Some(spec) => {
            indoc!("
                #TYPE *result = data;

                if (!xdrgen_decode_#NAME(xdr, result))
                    return -EIO;
                return 0;
            ")
            .replace("#TYPE", &c_type(spec))
            .replace("#NAME", spec.type_name())
        },
        None => String::from(indoc!("
            if (!xdrgen_decode_void(xdr))
                return -EIO;
            return 0;
        "))
    };

    Stub {
        returns: "int",
        name: format!("{}_clnt_decode_{}", program, stub_type_name(spec)),
        params: "struct rpc_rqst *req, struct xdr_stream *xdr, void *data",
        body
    }
}

/// Servers decode arguments and encode results; clients do the reverse.
fn stubs(ctx: &Context, p: &xdr::Program) -> Vec<Stub> {
    let program = Name::from(p.name()).to_snake_case();
    let arguments = stub_types(ctx, p, xdr::Procedure::argument);
    let results = stub_types(ctx, p, xdr::Procedure::result);

    let mut stubs = vec!();
    match ctx.config().peer() {
        Peer::Server => {
            stubs.extend(arguments.into_iter().map(|spec| server_decode_stub(&program, spec)));
            stubs.extend(results.into_iter().map(|spec| server_encode_stub(&program, spec)));
        },
        Peer::Client => {
            stubs.extend(arguments.into_iter().map(|spec| client_encode_stub(&program, spec)));
            stubs.extend(results.into_iter().map(|spec| client_decode_stub(&program, spec)));
        }
    }
    debug!(program = p.name().as_str(), peer = %ctx.config().peer(), stubs = stubs.len(), "rpc stubs");
    stubs
}

fn codegen_numbers(p: &xdr::Program) -> String {
    let mut sections = vec!(
        indoc!("
            #ifndef #NAME
            #define #NAME (#NUMBER)
            #endif
        ")
        .replace("#NAME", &c_ident(p.name()))
        .replace("#NUMBER", p.number())
    );

    for version in p.versions() {
        sections.push(format!("#define {} ({})\n", c_ident(version.name()), version.number()));
        sections.push(
            indoc!("
                enum {
                    #PROCEDURES
                };
            ")
            .replace(
                "#PROCEDURES",
                &version.procedures()
                    .iter()
                    .map(|procedure| format!("{} = {},", c_ident(procedure.name()), procedure.number()))
                    .collect::<Vec<String>>()
                    .join("\n    ")
            )
        );
    }

    sections.join("\n")
}

fn codegen_procedure_maxsize(ctx: &Context, procedure: &xdr::Procedure) -> String {
    let term = |spec: &Option<xdr::TypeSpecifier>| spec.iter().map(|s| maxsize_of(ctx, s)).collect::<Vec<String>>();

    codegen_size_macro(&format!("{}_{}_argsz", ctx.prefix(), procedure.name()), &term(procedure.argument()))
        + &codegen_size_macro(&format!("{}_{}_ressz", ctx.prefix(), procedure.name()), &term(procedure.result()))
}

impl Generator<xdr::Program> for XdrProgramGenerator {
    fn emit_declaration(&self, ctx: &Context, p: &xdr::Program) -> Option<String> {
        let stubs = stubs(ctx, p);
        if stubs.is_empty() {
            return None;
        }
        Some(stubs.iter().map(Stub::prototype).collect())
    }

    fn emit_definition(&self, ctx: &Context, p: &xdr::Program) -> Option<String> {
        let mut sections = vec!(codegen_numbers(p));
        sections.extend(stubs(ctx, p).iter().map(Stub::definition));
        Some(sections.join("\n"))
    }

    fn emit_maxsize(&self, ctx: &Context, p: &xdr::Program) -> Option<String> {
        let macros = p.versions()
            .iter()
            .flat_map(|v| v.procedures().iter())
            .filter(|procedure| !ctx.is_excluded(procedure.name()))
            .map(|procedure| codegen_procedure_maxsize(ctx, procedure))
            .collect::<String>();

        if macros.is_empty() {
            None
        } else {
            Some(macros)
        }
    }
}
