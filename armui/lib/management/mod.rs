//! Aggregations and request flows composed from the mirror, the upstream clients and the
//! local files.

mod dashboard;
mod jobs;
mod settings;
mod system;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use dashboard::*;
pub use jobs::*;
pub use settings::*;
pub use system::*;
