use crate::descriptor::HeapType;
use crate::platform::{
	AccelStructObject, BufferObject, BufferViewObject, CpuDescriptorHandle, DescriptorAllocation, SamplerObject,
	TextureObject, TextureViewObject,
};
use std::error::Error;

/// Internal interface of the device layer, may change at any time!
///
/// # Safety
/// Descriptor handles handed out by any object of this platform must stay valid for as long as the object is alive.
/// [`DescriptorAllocation`]s must not overlap with any other live allocation.
pub unsafe trait BindingPlatform: Sized + Send + Sync + 'static {
	type Buffer: BufferObject;
	type BufferView: BufferViewObject<Self>;
	type Texture: TextureObject;
	type TextureView: TextureViewObject<Self>;
	type Sampler: SamplerObject;
	type AccelStruct: AccelStructObject;
	type AllocationError: 'static + Error + Send + Sync;

	/// Allocates `count` contiguous descriptors in the shader visible heap of `heap_type` that stay resident until
	/// freed. Used for the static and mutable tables of binding objects.
	fn allocate_gpu_descriptors(
		&self,
		heap_type: HeapType,
		count: u32,
	) -> Result<DescriptorAllocation, Self::AllocationError>;

	/// # Safety
	/// `allocation` must have been returned by [`Self::allocate_gpu_descriptors`] and not been freed yet. No command
	/// referencing it may still be pending.
	unsafe fn free_gpu_descriptors(&self, allocation: &DescriptorAllocation);

	/// Copies `count` descriptors starting at `src` to `dst`.
	///
	/// # Safety
	/// Both ranges must be valid descriptors of heaps of type `heap_type`.
	unsafe fn copy_descriptors(
		&self,
		dst: CpuDescriptorHandle,
		src: CpuDescriptorHandle,
		count: u32,
		heap_type: HeapType,
	);
}
