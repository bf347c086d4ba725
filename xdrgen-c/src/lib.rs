#[macro_use] extern crate derive_more;
extern crate getset;
extern crate indoc;
extern crate parser;

mod c;

pub use c::{codegen, declarations_file, definitions_file, Config, Context, Mode, Peer};
