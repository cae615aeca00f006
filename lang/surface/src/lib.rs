//! The reader: source text to datum trees.

pub mod span {
    pub use roux_utils::span::*;
}

pub mod textual {
    /// Datum trees produced by the reader.
    pub mod syntax;
    pub use syntax::*;
    /// Logos-based lexer and token definitions.
    pub mod lexer;
    pub use lexer::*;
    /// Recursive-descent reader over the token stream.
    pub mod reader;
    pub use reader::*;
    /// Parse error formatting.
    pub mod err;
    pub use err::*;

    #[cfg(test)]
    /// Reader smoke tests.
    mod tests;
}

pub use textual::{Datum, ParseError, parse};
