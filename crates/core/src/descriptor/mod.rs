mod heap_budget;
mod resource_desc;
mod sampler_desc;
mod signature_desc;

pub use heap_budget::*;
pub use resource_desc::*;
pub use sampler_desc::*;
pub use signature_desc::*;
