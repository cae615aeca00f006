pub mod fmt;
pub use fmt::*;

pub mod chars;
pub use chars::*;

pub mod symbol;
pub use symbol::*;
