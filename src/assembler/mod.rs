//! The Assembler module is in charge of taking
//! assembly source text and producing a Program
//! from the AST submodule.
//!
//! It does this without a separate tokenizing pass:
//! an immutable Cursor walks the source characters and
//! every grammar production is an ordered-choice,
//! backtracking recursive descent function over it.

pub mod ast;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse, Parser};
