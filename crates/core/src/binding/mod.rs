mod binder;
mod resource_mapping;
mod signature;
mod srb;
mod variables;

pub use binder::*;
pub use resource_mapping::*;
pub use signature::*;
pub use srb::*;
pub use variables::*;
