/// The primary platform is the software platform
#[cfg(feature = "soft")]
pub type P = gpu_root_binding_core::platform::soft::SoftPlatform;
#[cfg(not(any(feature = "soft")))]
compile_error!("Must select a primary platform by enabling a feature like \"soft\"");

pub mod binding {
	pub type RootSignature = gpu_root_binding_core::binding::RootSignature<crate::P>;
	pub type ShaderResourceBinding = gpu_root_binding_core::binding::ShaderResourceBinding<crate::P>;
	pub type ResourceMapping = gpu_root_binding_core::binding::ResourceMapping<crate::P>;

	pub use gpu_root_binding_core::binding::*;
}

pub mod cache {
	pub type BoundObject = gpu_root_binding_core::cache::BoundObject<crate::P>;
	pub type CachedBinding = gpu_root_binding_core::cache::CachedBinding<crate::P>;
	pub type RootTableCache = gpu_root_binding_core::cache::RootTableCache<crate::P>;
	pub type ResourceCache = gpu_root_binding_core::cache::ResourceCache<crate::P>;
	pub type CacheInitError = gpu_root_binding_core::cache::CacheInitError<crate::P>;

	pub use gpu_root_binding_core::cache::*;
}

pub mod descriptor {
	pub use gpu_root_binding_core::descriptor::*;
}

pub mod layout {
	pub use gpu_root_binding_core::layout::*;
}

pub mod pipeline {
	pub type CommitError = gpu_root_binding_core::pipeline::CommitError<crate::P>;

	pub use gpu_root_binding_core::pipeline::*;
}

pub mod platform {
	pub type TransitionTarget<'a> = gpu_root_binding_core::platform::TransitionTarget<'a, crate::P>;

	pub use gpu_root_binding_core::platform::*;
}
