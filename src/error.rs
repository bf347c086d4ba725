use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("xdrgen: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error
    },

    #[error(transparent)]
    Diagnostic(#[from] parser::Diagnostic)
}
