//! Mathematical utilities: the deviation function and a bracketing root search.

pub mod deviation;
pub mod root;

pub use deviation::*;
pub use root::*;
