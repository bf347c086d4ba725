mod ast;
mod codegen;

use getset::CopyGetters;
use indoc::indoc;
use tracing::debug;

pub use codegen::{codegen, Context, Mode};

/// Which side of an RPC conversation the generated stubs serve.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Peer {
    #[display(fmt = "client")]
    Client,
    #[display(fmt = "server")]
    Server
}

/// Generation switches, fixed for the whole run.
#[derive(Clone, Copy, Constructor, CopyGetters, Debug, PartialEq, Eq)]
#[getset(get_copy = "pub")]
pub struct Config {
    peer: Peer,
    annotate: bool,
    enum_validation: bool
}

impl Default for Config {
    fn default() -> Self {
        Config { peer: Peer::Server, annotate: false, enum_validation: true }
    }
}

fn codegen_banner(ctx: &Context) -> String {
    indoc!("
        /* Generated by xdrgen. Manual edits will be lost. */
        /* XDR specification file: #FILE */
    ")
    .replace("#FILE", ctx.filename())
}

fn codegen_peer_include(ctx: &Context) -> &'static str {
    match ctx.config().peer() {
        Peer::Client => "#include <linux/sunrpc/clnt.h>",
        Peer::Server => "#include <linux/sunrpc/svc.h>"
    }
}

fn codegen_file(ctx: &Context, suffix: &str, includes: &[&str], sections: Vec<String>) -> String {
    let guard = format!("_LINUX_XDRGEN_{}_{}_H", ctx.prefix(), suffix);
    let sections = sections.into_iter()
        .filter(|s| s.len() != 0)
        .collect::<Vec<String>>();

    indoc!("
        #BANNER
        #ifndef #GUARD
        #define #GUARD

        #INCLUDES

        #SECTIONS
        #endif /* #GUARD */
    ")
    .replace("#BANNER", &codegen_banner(ctx))
    .replace("#INCLUDES", &includes.join("\n"))
    .replace("#SECTIONS", &sections.iter().map(|s| format!("{}\n", s)).collect::<String>())
    .replace("#GUARD", &guard)
}

/// A header holding the encoder, decoder and RPC stub prototypes.
pub fn declarations_file(ctx: &Context, spec: &parser::ast::Specification) -> String {
    debug!(prefix = ctx.prefix().as_str(), "generating declarations file");
    codegen_file(
        ctx,
        "DECL",
        &[
            "#include <linux/types.h>",
            "#include <linux/sunrpc/xdr.h>",
            "#include <linux/sunrpc/xdrgen/_defs.h>",
            codegen_peer_include(ctx)
        ],
        vec!(codegen(ctx, spec, Mode::Declarations))
    )
}

/// Type definitions, codec bodies and RPC stubs, followed by the maxsize macros.
pub fn definitions_file(ctx: &Context, spec: &parser::ast::Specification) -> String {
    debug!(prefix = ctx.prefix().as_str(), "generating definitions file");
    let max = indoc!("
        #ifndef XDRGEN_MAX
        #define XDRGEN_MAX(a, b) ((a) > (b) ? (a) : (b))
        #endif
    ");

    codegen_file(
        ctx,
        "DEF",
        &[
            "#include <linux/types.h>",
            "#include <linux/sunrpc/xdr.h>",
            "#include <linux/sunrpc/xdrgen/_defs.h>",
            "#include <linux/sunrpc/xdrgen/_builtins.h>",
            codegen_peer_include(ctx)
        ],
        vec!(
            String::from(max),
            codegen(ctx, spec, Mode::Definitions),
            codegen(ctx, spec, Mode::Maxsize)
        )
    )
}
