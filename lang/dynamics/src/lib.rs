#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod syntax;
mod impls;
pub mod fmt;
pub mod err;
pub use err::*;

pub mod env;
pub use env::{Binding, Environment, Ident};
pub mod world;
pub use world::{SharedOutput, World};
pub mod eval;
pub use eval::{Kont, Step};
pub mod link;
pub use link::Link;

pub mod special;
pub mod builtin;
pub mod capture;
pub mod rules;
pub mod interop;
pub mod library;
pub mod prelude;

#[cfg(test)]
mod tests;
