//! Log listing, reading and line parsing.

mod parser;
mod reader;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use parser::*;
pub use reader::*;
