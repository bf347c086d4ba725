#[macro_use] extern crate derive_more;
extern crate getset;
extern crate parser;

pub mod cli;
pub mod driver;
pub mod error;

pub use error::Error;
