mod commit;
mod resource_state;
mod transition;

pub use commit::*;
pub use resource_state::*;
pub use transition::*;
