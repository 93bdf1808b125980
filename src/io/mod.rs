//! Input/output helpers.
//!
//! - rate table JSON read/write (`table`)
//! - CSV exports (`export`)
//! - archive backup with manifest (`backup`)
//! - zip packaging of a whole tree (`pack`)

pub mod backup;
pub mod export;
pub mod pack;
pub mod table;

pub use backup::*;
pub use export::*;
pub use pack::*;
pub use table::*;
