use crate::platform::{
	AccelStructObject, BindingPlatform, BufferObject, BufferUsage, BufferViewObject, CpuDescriptorHandle,
	SamplerObject, TextureViewObject, TransitionTarget,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A device object bound to a cache slot. Holding it keeps the object alive for as long as it is bound.
pub enum BoundObject<P: BindingPlatform> {
	Buffer(Arc<P::Buffer>),
	BufferView(Arc<P::BufferView>),
	TextureView(Arc<P::TextureView>),
	Sampler(Arc<P::Sampler>),
	AccelStruct(Arc<P::AccelStruct>),
}

impl<P: BindingPlatform> Clone for BoundObject<P> {
	fn clone(&self) -> Self {
		match self {
			BoundObject::Buffer(buffer) => BoundObject::Buffer(buffer.clone()),
			BoundObject::BufferView(view) => BoundObject::BufferView(view.clone()),
			BoundObject::TextureView(view) => BoundObject::TextureView(view.clone()),
			BoundObject::Sampler(sampler) => BoundObject::Sampler(sampler.clone()),
			BoundObject::AccelStruct(accel) => BoundObject::AccelStruct(accel.clone()),
		}
	}
}

impl<P: BindingPlatform> BoundObject<P> {
	/// Whether both refer to the very same object.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(BoundObject::Buffer(a), BoundObject::Buffer(b)) => Arc::ptr_eq(a, b),
			(BoundObject::BufferView(a), BoundObject::BufferView(b)) => Arc::ptr_eq(a, b),
			(BoundObject::TextureView(a), BoundObject::TextureView(b)) => Arc::ptr_eq(a, b),
			(BoundObject::Sampler(a), BoundObject::Sampler(b)) => Arc::ptr_eq(a, b),
			(BoundObject::AccelStruct(a), BoundObject::AccelStruct(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			BoundObject::Buffer(_) => "buffer",
			BoundObject::BufferView(_) => "buffer view",
			BoundObject::TextureView(_) => "texture view",
			BoundObject::Sampler(_) => "sampler",
			BoundObject::AccelStruct(_) => "acceleration structure",
		}
	}

	/// The CPU descriptor describing this object. Dynamic buffers have none.
	pub fn cpu_handle(&self) -> Option<CpuDescriptorHandle> {
		match self {
			BoundObject::Buffer(buffer) => buffer.cbv_handle(),
			BoundObject::BufferView(view) => Some(view.handle()),
			BoundObject::TextureView(view) => Some(view.handle()),
			BoundObject::Sampler(sampler) => Some(sampler.handle()),
			BoundObject::AccelStruct(accel) => Some(accel.handle()),
		}
	}

	/// The state tracked resource behind this object, samplers have none.
	pub fn transition_target(&self) -> Option<TransitionTarget<'_, P>> {
		match self {
			BoundObject::Buffer(buffer) => Some(TransitionTarget::Buffer(&**buffer)),
			BoundObject::BufferView(view) => Some(TransitionTarget::Buffer(&**view.buffer())),
			BoundObject::TextureView(view) => Some(TransitionTarget::Texture(&**view.texture())),
			BoundObject::Sampler(_) => None,
			BoundObject::AccelStruct(accel) => Some(TransitionTarget::AccelStruct(&**accel)),
		}
	}

	/// Name of the underlying resource, for diagnostics.
	pub fn name(&self) -> &str {
		match self.transition_target() {
			Some(target) => target.name(),
			None => "<sampler>",
		}
	}

	pub fn is_dynamic_buffer(&self) -> bool {
		matches!(self, BoundObject::Buffer(buffer) if buffer.usage() == BufferUsage::Dynamic)
	}

	pub fn as_buffer(&self) -> Option<&Arc<P::Buffer>> {
		match self {
			BoundObject::Buffer(buffer) => Some(buffer),
			_ => None,
		}
	}
}

impl<P: BindingPlatform> Debug for BoundObject<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BoundObject")
			.field("type", &self.type_name())
			.field("name", &self.name())
			.field("handle", &self.cpu_handle())
			.finish()
	}
}
