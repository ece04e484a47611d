use crate::descriptor::HeapType;

/// Address of a descriptor as seen by the CPU.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CpuDescriptorHandle(pub u64);

/// Address of a descriptor as seen by the GPU, only exists for shader visible heaps.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GpuDescriptorHandle(pub u64);

#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GpuVirtualAddress(pub u64);

/// Identifies a descriptor heap of the platform.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DescriptorHeapId(pub u32);

/// A contiguous range of descriptors within a shader visible descriptor heap.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DescriptorAllocation {
	pub heap_type: HeapType,
	pub heap: DescriptorHeapId,
	pub first_cpu: CpuDescriptorHandle,
	pub first_gpu: GpuDescriptorHandle,
	pub count: u32,
	/// Distance between two adjacent descriptors in bytes.
	pub increment: u32,
}

impl DescriptorAllocation {
	pub fn cpu_handle(&self, offset: u32) -> CpuDescriptorHandle {
		assert!(offset < self.count, "offset {} out of bounds for {} descriptors", offset, self.count);
		CpuDescriptorHandle(self.first_cpu.0 + offset as u64 * self.increment as u64)
	}

	pub fn gpu_handle(&self, offset: u32) -> GpuDescriptorHandle {
		assert!(offset < self.count, "offset {} out of bounds for {} descriptors", offset, self.count);
		GpuDescriptorHandle(self.first_gpu.0 + offset as u64 * self.increment as u64)
	}
}

/// The shader visible heaps a command list reads descriptor tables from.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ShaderDescriptorHeaps {
	pub cbv_srv_uav: Option<DescriptorHeapId>,
	pub sampler: Option<DescriptorHeapId>,
}

impl ShaderDescriptorHeaps {
	pub fn get(&self, heap_type: HeapType) -> Option<DescriptorHeapId> {
		match heap_type {
			HeapType::CbvSrvUav => self.cbv_srv_uav,
			HeapType::Sampler => self.sampler,
		}
	}

	pub fn set(&mut self, heap_type: HeapType, heap: Option<DescriptorHeapId>) {
		match heap_type {
			HeapType::CbvSrvUav => self.cbv_srv_uav = heap,
			HeapType::Sampler => self.sampler = heap,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.cbv_srv_uav.is_none() && self.sampler.is_none()
	}
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PipelineBindPoint {
	#[default]
	Graphics,
	Compute,
}
