use gpu_root_binding::platform::soft::{SoftCreateInfo, SoftPlatform};
use std::sync::Arc;

pub mod heap_exhaustion;
pub mod rebinding;
pub mod root_view;
pub mod runtime_array;
pub mod stage_tables;
pub mod static_resources;
pub mod transitions;

/// A fresh software platform for a single test, with logging routed to the test output
pub fn soft_platform(create_info: SoftCreateInfo) -> Arc<SoftPlatform> {
	let _ = env_logger::builder().is_test(true).try_init();
	SoftPlatform::new(create_info)
}
