pub mod binding;
pub mod cache;
pub mod descriptor;
pub mod layout;
pub mod pipeline;
pub mod platform;
