use crate::descriptor::HeapType;
use crate::pipeline::ResourceState;
use crate::platform::soft::{SoftAllocationError, SoftPlatform};
use crate::platform::{
	CommandSink, DescriptorAllocation, GpuDescriptorHandle, GpuVirtualAddress, PipelineBindPoint,
	ShaderDescriptorHeaps, TransitionTarget,
};
use std::sync::Arc;

/// A command recorded by a [`SoftCommandList`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SoftCommand {
	SetDescriptorHeaps(ShaderDescriptorHeaps),
	SetRootDescriptorTable {
		bind_point: PipelineBindPoint,
		root_index: u32,
		handle: GpuDescriptorHandle,
	},
	SetRootConstantBufferView {
		bind_point: PipelineBindPoint,
		root_index: u32,
		address: GpuVirtualAddress,
	},
	Transition {
		name: String,
		before: ResourceState,
		after: ResourceState,
	},
}

/// Records commands instead of executing them. Dynamic descriptors stay allocated until [`Self::reset`], which
/// simulates the recorded commands having finished executing.
pub struct SoftCommandList {
	platform: Arc<SoftPlatform>,
	commands: Vec<SoftCommand>,
	dynamic_allocations: Vec<DescriptorAllocation>,
}

impl SoftCommandList {
	pub fn new(platform: Arc<SoftPlatform>) -> Self {
		Self {
			platform,
			commands: Vec::new(),
			dynamic_allocations: Vec::new(),
		}
	}

	pub fn platform(&self) -> &Arc<SoftPlatform> {
		&self.platform
	}

	pub fn commands(&self) -> &[SoftCommand] {
		&self.commands
	}

	pub fn dynamic_allocations(&self) -> &[DescriptorAllocation] {
		&self.dynamic_allocations
	}

	/// All recorded transitions as `(name, before, after)`.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, ResourceState, ResourceState)> + '_ {
		self.commands.iter().filter_map(|command| match command {
			SoftCommand::Transition { name, before, after } => Some((name.as_str(), *before, *after)),
			_ => None,
		})
	}

	/// All root descriptor tables set as `(root index, handle)`.
	pub fn root_tables(&self) -> impl Iterator<Item = (u32, GpuDescriptorHandle)> + '_ {
		self.commands.iter().filter_map(|command| match command {
			SoftCommand::SetRootDescriptorTable {
				root_index, handle, ..
			} => Some((*root_index, *handle)),
			_ => None,
		})
	}

	/// All root constant buffer views set as `(root index, address)`.
	pub fn root_constant_buffer_views(&self) -> impl Iterator<Item = (u32, GpuVirtualAddress)> + '_ {
		self.commands.iter().filter_map(|command| match command {
			SoftCommand::SetRootConstantBufferView {
				root_index, address, ..
			} => Some((*root_index, *address)),
			_ => None,
		})
	}

	/// Clears all recorded commands and frees the dynamic descriptors they used.
	pub fn reset(&mut self) {
		self.commands.clear();
		for allocation in self.dynamic_allocations.drain(..) {
			// Safety: the commands referencing these descriptors have been discarded
			unsafe { self.platform.free_dynamic(&allocation) }
		}
	}
}

impl Drop for SoftCommandList {
	fn drop(&mut self) {
		self.reset();
	}
}

impl CommandSink<SoftPlatform> for SoftCommandList {
	fn allocate_dynamic_descriptors(
		&mut self,
		heap_type: HeapType,
		count: u32,
	) -> Result<DescriptorAllocation, SoftAllocationError> {
		let allocation = self.platform.allocate_dynamic(heap_type, count)?;
		self.dynamic_allocations.push(allocation);
		Ok(allocation)
	}

	fn set_descriptor_heaps(&mut self, heaps: ShaderDescriptorHeaps) {
		log::trace!("SetDescriptorHeaps {:?}", heaps);
		self.commands.push(SoftCommand::SetDescriptorHeaps(heaps));
	}

	fn set_root_descriptor_table(&mut self, bind_point: PipelineBindPoint, root_index: u32, handle: GpuDescriptorHandle) {
		log::trace!("SetRootDescriptorTable {:?} {} {:?}", bind_point, root_index, handle);
		self.commands.push(SoftCommand::SetRootDescriptorTable {
			bind_point,
			root_index,
			handle,
		});
	}

	fn set_root_constant_buffer_view(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		address: GpuVirtualAddress,
	) {
		log::trace!("SetRootConstantBufferView {:?} {} {:?}", bind_point, root_index, address);
		self.commands.push(SoftCommand::SetRootConstantBufferView {
			bind_point,
			root_index,
			address,
		});
	}

	fn transition_resource(&mut self, target: TransitionTarget<'_, SoftPlatform>, before: ResourceState, after: ResourceState) {
		log::trace!("Transition '{}' {:?} -> {:?}", target.name(), before, after);
		self.commands.push(SoftCommand::Transition {
			name: target.name().to_string(),
			before,
			after,
		});
	}
}
