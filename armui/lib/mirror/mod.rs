//! Read-only access to the ripping service's SQLite database.
//!
//! The database belongs to the ripping service. Nothing here writes to it; every
//! mutation goes through [`crate::upstream::ArmClient`].

mod models;
mod pagination;
mod reader;
mod sqlite;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use models::*;
pub use pagination::*;
pub use reader::*;
pub use sqlite::*;
