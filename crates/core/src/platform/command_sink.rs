use crate::descriptor::HeapType;
use crate::pipeline::ResourceState;
use crate::platform::{
	BindingPlatform, DescriptorAllocation, GpuDescriptorHandle, GpuVirtualAddress, PipelineBindPoint,
	ShaderDescriptorHeaps, StateTracked,
};

/// The device object a transition applies to. Views are always resolved to the resource they view.
pub enum TransitionTarget<'a, P: BindingPlatform> {
	Buffer(&'a P::Buffer),
	Texture(&'a P::Texture),
	AccelStruct(&'a P::AccelStruct),
}

impl<P: BindingPlatform> Copy for TransitionTarget<'_, P> {}

impl<P: BindingPlatform> Clone for TransitionTarget<'_, P> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<'a, P: BindingPlatform> TransitionTarget<'a, P> {
	pub fn state_tracked(&self) -> &'a dyn StateTracked {
		match *self {
			TransitionTarget::Buffer(buffer) => buffer,
			TransitionTarget::Texture(texture) => texture,
			TransitionTarget::AccelStruct(accel) => accel,
		}
	}

	pub fn name(&self) -> &'a str {
		self.state_tracked().name()
	}
}

/// A command list recording the commands of a commit. All methods are fire-and-forget.
pub trait CommandSink<P: BindingPlatform> {
	/// Allocates `count` descriptors from the per-draw region of the shader visible heap of `heap_type`. The
	/// allocation lives until the recorded commands have finished executing.
	fn allocate_dynamic_descriptors(
		&mut self,
		heap_type: HeapType,
		count: u32,
	) -> Result<DescriptorAllocation, P::AllocationError>;

	fn set_descriptor_heaps(&mut self, heaps: ShaderDescriptorHeaps);

	fn set_root_descriptor_table(&mut self, bind_point: PipelineBindPoint, root_index: u32, handle: GpuDescriptorHandle);

	fn set_root_constant_buffer_view(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		address: GpuVirtualAddress,
	);

	/// Records a barrier moving `target` from `before` to `after`. `before` equals `after` for a hazard barrier
	/// between two unordered accesses.
	fn transition_resource(&mut self, target: TransitionTarget<'_, P>, before: ResourceState, after: ResourceState);
}
