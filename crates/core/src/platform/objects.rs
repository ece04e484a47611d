use crate::pipeline::ResourceState;
use crate::platform::{BindingPlatform, CpuDescriptorHandle, GpuVirtualAddress};
use std::sync::Arc;

/// A device object that tracks the state it is in.
pub trait StateTracked: Send + Sync + 'static {
	fn name(&self) -> &str;

	/// The current state, [`ResourceState::UNKNOWN`] if the object is not tracked.
	fn state(&self) -> ResourceState;

	/// Called after a transition to `state` has been recorded.
	fn set_state(&self, state: ResourceState);

	fn is_in_known_state(&self) -> bool {
		self.state().is_known()
	}

	/// Whether the object is in all of the `states`.
	fn check_state(&self, states: ResourceState) -> bool {
		self.state().contains(states)
	}

	/// Whether the object is in any of the `states`.
	fn check_any_state(&self, states: ResourceState) -> bool {
		self.state().intersects(states)
	}
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
	#[default]
	Default,
	/// Backing memory is renamed every frame, so the GPU address may change between commits. Dynamic buffers have no
	/// persistent CBV descriptor and can only be bound to root views.
	Dynamic,
}

bitflags::bitflags! {
	/// The ways a buffer may be bound to a shader.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct BufferBindFlags: u32 {
		const UNIFORM_BUFFER = 0b1;
		const SHADER_RESOURCE = 0b10;
		const UNORDERED_ACCESS = 0b100;
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferViewType {
	ShaderResource,
	UnorderedAccess,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureViewType {
	ShaderResource,
	UnorderedAccess,
	RenderTarget,
	DepthStencil,
}

pub trait BufferObject: StateTracked {
	fn usage(&self) -> BufferUsage;

	fn bind_flags(&self) -> BufferBindFlags;

	/// The CPU descriptor of the constant buffer view, None for dynamic buffers or buffers without
	/// [`BufferBindFlags::UNIFORM_BUFFER`].
	fn cbv_handle(&self) -> Option<CpuDescriptorHandle>;

	fn gpu_address(&self) -> GpuVirtualAddress;
}

pub trait BufferViewObject<P: BindingPlatform>: Send + Sync + 'static {
	fn view_type(&self) -> BufferViewType;

	/// Whether the view accesses its buffer with a format, as opposed to structured or raw access.
	fn is_formatted(&self) -> bool;

	fn handle(&self) -> CpuDescriptorHandle;

	fn buffer(&self) -> &Arc<P::Buffer>;
}

pub trait TextureObject: StateTracked {}

pub trait TextureViewObject<P: BindingPlatform>: Send + Sync + 'static {
	fn view_type(&self) -> TextureViewType;

	fn handle(&self) -> CpuDescriptorHandle;

	fn texture(&self) -> &Arc<P::Texture>;

	/// The sampler attached to this view, bound alongside it in combined sampler mode.
	fn sampler(&self) -> Option<&Arc<P::Sampler>>;
}

pub trait SamplerObject: Send + Sync + 'static {
	fn handle(&self) -> CpuDescriptorHandle;
}

pub trait AccelStructObject: StateTracked {
	fn handle(&self) -> CpuDescriptorHandle;
}
