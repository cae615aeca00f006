#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod arena;
pub mod span;

pub mod prelude {
    /// Source code location.
    pub use crate::span::{FileInfo, LineCol, Span};
    /// Identifier minting.
    pub use crate::{
        arena::{IndexLike, Minter},
        new_key_type,
    };
}
