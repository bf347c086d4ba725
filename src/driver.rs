use std::fs;
use std::path::PathBuf;

use getset::{CopyGetters, Getters};
use tracing::{debug, info};
use xdrgen_c::Config;

use crate::error::Error;

/// Target languages for generated code.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Language {
    #[display(fmt = "C")]
    C
}

/// What a run produces on standard output.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Output {
    #[display(fmt = "declarations")]
    Declarations,
    #[display(fmt = "definitions")]
    Definitions,
    #[display(fmt = "lint")]
    Lint
}

#[derive(Clone, Constructor, CopyGetters, Getters, Debug)]
pub struct Request {
    #[getset(get = "pub")]
    path: PathBuf,

    #[getset(get_copy = "pub")]
    output: Output,

    #[getset(get_copy = "pub")]
    language: Language,

    #[getset(get_copy = "pub")]
    config: Config
}

/// Generates one output from specification text. `filename` labels diagnostics and
/// names the generated file's banner, guard and macro prefix.
pub fn generate(filename: &str, source: &str, output: Output, language: Language, config: Config) -> Result<String, Error> {
    let spec = parser::parse(filename, source)?;
    debug!(definitions = spec.definitions().len(), "parsed specification");

    let ctx = xdrgen_c::Context::new(config, filename, &spec);
    let text = match (language, output) {
        (_, Output::Lint) => String::new(),
        (Language::C, Output::Declarations) => xdrgen_c::declarations_file(&ctx, &spec),
        (Language::C, Output::Definitions) => xdrgen_c::definitions_file(&ctx, &spec)
    };
    Ok(text)
}

/// Reads the requested specification and generates its output. Nothing is
/// returned unless the whole file parsed and checked cleanly.
pub fn run(request: &Request) -> Result<String, Error> {
    let path = request.path();
    info!(path = %path.display(), output = %request.output(), language = %request.language(), "xdrgen");

    let source = fs::read_to_string(path).map_err(|source| Error::Io { path: path.clone(), source })?;
    generate(&path.to_string_lossy(), &source, request.output(), request.language(), request.config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_is_silent() {
        let text = generate("calc.x", "const N = 1;", Output::Lint, Language::C, Config::default());
        assert_eq!("", text.unwrap_or_else(|e| panic!("{}", e)));
    }

    #[test]
    fn test_diagnostic_is_returned() {
        match generate("calc.x", "struct S { foo f; };", Output::Definitions, Language::C, Config::default()) {
            Err(Error::Diagnostic(d)) => assert_eq!(1, d.position().line()),
            other => panic!("expected a diagnostic, got {:?}", other)
        }
    }

    #[test]
    fn test_missing_file() {
        let request = Request::new(PathBuf::from("/nonexistent/calc.x"), Output::Lint, Language::C, Config::default());
        let e = run(&request).unwrap_err();

        assert!(e.to_string().starts_with("xdrgen: /nonexistent/calc.x: "), "{}", e);
    }
}
