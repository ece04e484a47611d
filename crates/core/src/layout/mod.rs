mod attribs;
mod compiler;
mod root_parameter;
mod root_params;
mod stage_slot;

pub use attribs::*;
pub use compiler::*;
pub use root_parameter::*;
pub use root_params::*;
pub use stage_slot::*;
