use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use xdrgen_c::{Config, Peer};

use crate::driver::{Language, Output, Request};

/// Generate C encoders, decoders and RPC stubs from an XDR specification.
#[derive(Debug, Parser)]
#[command(name = "xdrgen", version)]
pub struct CommandLineInterface {
    /// Log progress to standard error.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Emit a header of encoder, decoder and RPC stub prototypes.
    Declarations(GenerateArgs),
    /// Emit type definitions, codec bodies, RPC stubs and maxsize macros.
    Definitions(GenerateArgs),
    /// Parse and check a specification without emitting anything.
    Lint(LintArgs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    #[value(name = "C", alias = "c")]
    C
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeerArg {
    Client,
    Server
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Output language.
    #[arg(long, value_enum, default_value = "C")]
    language: LanguageArg,

    /// Which side of the RPC conversation the stubs serve.
    #[arg(long, value_enum, default_value = "server")]
    peer: PeerArg,

    /// Precede each generated block with its source location.
    #[arg(long)]
    annotate: bool,

    /// Skip checking decoded enum values against their enumerators.
    #[arg(long)]
    no_enum_validation: bool,

    /// The .x file to compile.
    filename: PathBuf
}

#[derive(Debug, Args)]
struct LintArgs {
    /// The .x file to check.
    filename: PathBuf
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::C => Language::C
        }
    }
}

impl From<PeerArg> for Peer {
    fn from(arg: PeerArg) -> Self {
        match arg {
            PeerArg::Client => Peer::Client,
            PeerArg::Server => Peer::Server
        }
    }
}

impl GenerateArgs {
    fn request(&self, output: Output) -> Request {
        Request::new(
            self.filename.clone(),
            output,
            self.language.into(),
            Config::new(self.peer.into(), self.annotate, !self.no_enum_validation)
        )
    }
}

impl CommandLineInterface {
    pub fn request(&self) -> Request {
        match &self.command {
            Command::Declarations(args) => args.request(Output::Declarations),
            Command::Definitions(args) => args.request(Output::Definitions),
            Command::Lint(args) => Request::new(args.filename.clone(), Output::Lint, Language::C, Config::default())
        }
    }
}
