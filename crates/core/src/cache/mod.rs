mod bound_object;
mod resource_cache;

pub use bound_object::*;
pub use resource_cache::*;
