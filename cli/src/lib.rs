pub mod cli;
pub mod repl;

pub use cli::{Cli, Commands};
