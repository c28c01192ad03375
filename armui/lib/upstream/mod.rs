//! HTTP clients for the services this dashboard sits in front of.
//!
//! None of these clients retry. A failed call is reported once as
//! [`Upstream::Unavailable`] and callers decide how to degrade.

mod arm;
mod crc;
mod outcome;
mod system_cache;
mod transcoder;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use arm::*;
pub use crc::*;
pub use outcome::*;
pub use system_cache::*;
pub use transcoder::*;
