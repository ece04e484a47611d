mod binding_platform;
mod command_sink;
mod handles;
mod objects;

pub use binding_platform::*;
pub use command_sink::*;
pub use handles::*;
pub use objects::*;

#[cfg(any(test, feature = "soft"))]
pub mod soft;
