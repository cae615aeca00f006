//! Sessions: a configured runtime with its host, and the entry points the
//! command line and the tests use to run programs.

pub mod conf;
pub mod err;
pub mod session;

pub use conf::Conf;
pub use err::*;
pub use session::{Session, check_source};

#[cfg(test)]
mod tests;
