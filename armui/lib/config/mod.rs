//! Process settings, sensitive-key declarations, masking and config resolution.

mod arm_yaml;
mod defaults;
mod fields;
mod mask;
mod resolver;
mod settings;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use arm_yaml::*;
pub use defaults::*;
pub use fields::*;
pub use mask::*;
pub use resolver::*;
pub use settings::*;
