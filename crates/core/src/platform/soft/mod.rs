//! A platform keeping descriptor heaps in host memory, without any device. Descriptors store the id of the object they
//! describe, so copies between heaps can be inspected.

mod command_list;
mod heap;
mod objects;

pub use command_list::*;
pub use heap::*;
pub use objects::*;

use crate::descriptor::{DescriptorHeapBudget, HeapType, SamplerDesc};
use crate::pipeline::ResourceState;
use crate::platform::{
	BindingPlatform, BufferViewType, CpuDescriptorHandle, DescriptorAllocation, DescriptorHeapId,
	GpuDescriptorHandle, TextureViewType,
};
use static_assertions::assert_impl_all;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SoftCreateInfo {
	/// Shader visible descriptors for static and mutable tables of binding objects.
	pub gpu_heap_budget: DescriptorHeapBudget,
	/// Shader visible descriptors for per-draw dynamic tables.
	pub dynamic_heap_budget: DescriptorHeapBudget,
	/// CPU-only descriptors of objects.
	pub staging_heap_budget: DescriptorHeapBudget,
}

impl Default for SoftCreateInfo {
	fn default() -> Self {
		Self {
			gpu_heap_budget: DescriptorHeapBudget::REASONABLE_DEFAULTS,
			dynamic_heap_budget: DescriptorHeapBudget::REASONABLE_DYNAMIC_DEFAULTS,
			staging_heap_budget: DescriptorHeapBudget::REASONABLE_DEFAULTS,
		}
	}
}

#[derive(Error)]
#[non_exhaustive]
pub enum SoftAllocationError {
	#[error(
		"Out of descriptors in the {region:?} region of the {heap_type} heap: {requested} requested, but only {available} free"
	)]
	OutOfDescriptors {
		heap_type: HeapType,
		region: HeapRegion,
		requested: u32,
		available: u32,
	},
}

impl Debug for SoftAllocationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

pub struct SoftPlatform {
	pub create_info: SoftCreateInfo,
	staging: [Arc<SoftDescriptorHeap>; HeapType::COUNT],
	shader_visible: [Arc<SoftDescriptorHeap>; HeapType::COUNT],
	descriptor_copies: AtomicU64,
}
assert_impl_all!(SoftPlatform: Send, Sync);

impl SoftPlatform {
	pub fn new(create_info: SoftCreateInfo) -> Arc<Self> {
		create_info
			.gpu_heap_budget
			.add(create_info.dynamic_heap_budget)
			.assert_within_limits();
		let heap = |id: u32, heap_type: HeapType, persistent: &DescriptorHeapBudget, dynamic: u32| {
			Arc::new(SoftDescriptorHeap::new(
				DescriptorHeapId(id),
				heap_type,
				persistent.get(heap_type),
				dynamic,
			))
		};
		Arc::new(Self {
			staging: [
				heap(0, HeapType::CbvSrvUav, &create_info.staging_heap_budget, 0),
				heap(1, HeapType::Sampler, &create_info.staging_heap_budget, 0),
			],
			shader_visible: [
				heap(
					2,
					HeapType::CbvSrvUav,
					&create_info.gpu_heap_budget,
					create_info.dynamic_heap_budget.cbv_srv_uav,
				),
				heap(
					3,
					HeapType::Sampler,
					&create_info.gpu_heap_budget,
					create_info.dynamic_heap_budget.samplers,
				),
			],
			create_info,
			descriptor_copies: AtomicU64::new(0),
		})
	}

	pub fn staging_heap(&self, heap_type: HeapType) -> &Arc<SoftDescriptorHeap> {
		&self.staging[heap_type as usize]
	}

	pub fn shader_visible_heap(&self, heap_type: HeapType) -> &Arc<SoftDescriptorHeap> {
		&self.shader_visible[heap_type as usize]
	}

	fn heap_of(&self, handle: u64) -> Option<&SoftDescriptorHeap> {
		self.staging
			.iter()
			.chain(self.shader_visible.iter())
			.find(|heap| heap.contains(handle))
			.map(|heap| &**heap)
	}

	/// Reads the descriptor at a CPU handle of any heap.
	pub fn descriptor_at(&self, handle: CpuDescriptorHandle) -> Option<SoftDescriptor> {
		self.heap_of(handle.0)?.read(handle.0)
	}

	/// Reads the descriptor at a GPU handle of a shader visible heap.
	pub fn gpu_descriptor_at(&self, handle: GpuDescriptorHandle) -> Option<SoftDescriptor> {
		self.shader_visible
			.iter()
			.find(|heap| heap.contains(handle.0))?
			.read(handle.0)
	}

	/// Total number of descriptors copied so far.
	pub fn descriptor_copies(&self) -> u64 {
		self.descriptor_copies.load(Ordering::Relaxed)
	}

	pub(crate) fn allocate_dynamic(
		&self,
		heap_type: HeapType,
		count: u32,
	) -> Result<DescriptorAllocation, SoftAllocationError> {
		allocate(self.shader_visible_heap(heap_type), HeapRegion::Dynamic, count)
	}

	/// # Safety
	/// `allocation` must have been returned by [`Self::allocate_dynamic`] and not been freed yet
	pub(crate) unsafe fn free_dynamic(&self, allocation: &DescriptorAllocation) {
		unsafe {
			self.shader_visible_heap(allocation.heap_type)
				.free(HeapRegion::Dynamic, allocation)
		}
	}

	pub fn create_buffer(&self, create_info: &SoftBufferCreateInfo) -> Result<Arc<SoftBuffer>, SoftAllocationError> {
		Ok(Arc::new(SoftBuffer::new(self, create_info)?))
	}

	pub fn create_buffer_view(
		&self,
		buffer: &Arc<SoftBuffer>,
		view_type: BufferViewType,
		formatted: bool,
	) -> Result<Arc<SoftBufferView>, SoftAllocationError> {
		Ok(Arc::new(SoftBufferView::new(
			self.staging_heap(HeapType::CbvSrvUav),
			buffer.clone(),
			view_type,
			formatted,
		)?))
	}

	pub fn create_texture(&self, name: &str, initial_state: ResourceState) -> Arc<SoftTexture> {
		Arc::new(SoftTexture::new(name, initial_state))
	}

	pub fn create_texture_view(
		&self,
		texture: &Arc<SoftTexture>,
		view_type: TextureViewType,
		sampler: Option<&Arc<SoftSampler>>,
	) -> Result<Arc<SoftTextureView>, SoftAllocationError> {
		Ok(Arc::new(SoftTextureView::new(
			self.staging_heap(HeapType::CbvSrvUav),
			texture.clone(),
			view_type,
			sampler.cloned(),
		)?))
	}

	pub fn create_sampler(&self, name: &str, desc: SamplerDesc) -> Result<Arc<SoftSampler>, SoftAllocationError> {
		Ok(Arc::new(SoftSampler::new(self.staging_heap(HeapType::Sampler), name, desc)?))
	}

	pub fn create_accel_struct(
		&self,
		name: &str,
		initial_state: ResourceState,
	) -> Result<Arc<SoftAccelStruct>, SoftAllocationError> {
		Ok(Arc::new(SoftAccelStruct::new(
			self.staging_heap(HeapType::CbvSrvUav),
			name,
			initial_state,
		)?))
	}
}

fn allocate(
	heap: &SoftDescriptorHeap,
	region: HeapRegion,
	count: u32,
) -> Result<DescriptorAllocation, SoftAllocationError> {
	heap.allocate(region, count)
		.ok_or_else(|| SoftAllocationError::OutOfDescriptors {
			heap_type: heap.heap_type(),
			region,
			requested: count,
			available: heap.free_count(region),
		})
}

unsafe impl BindingPlatform for SoftPlatform {
	type Buffer = SoftBuffer;
	type BufferView = SoftBufferView;
	type Texture = SoftTexture;
	type TextureView = SoftTextureView;
	type Sampler = SoftSampler;
	type AccelStruct = SoftAccelStruct;
	type AllocationError = SoftAllocationError;

	fn allocate_gpu_descriptors(
		&self,
		heap_type: HeapType,
		count: u32,
	) -> Result<DescriptorAllocation, Self::AllocationError> {
		allocate(self.shader_visible_heap(heap_type), HeapRegion::Persistent, count)
	}

	unsafe fn free_gpu_descriptors(&self, allocation: &DescriptorAllocation) {
		unsafe {
			self.shader_visible_heap(allocation.heap_type)
				.free(HeapRegion::Persistent, allocation)
		}
	}

	unsafe fn copy_descriptors(
		&self,
		dst: CpuDescriptorHandle,
		src: CpuDescriptorHandle,
		count: u32,
		heap_type: HeapType,
	) {
		let (Some(dst_heap), Some(src_heap)) = (self.heap_of(dst.0), self.heap_of(src.0)) else {
			panic!("Copying from {:?} to {:?}, which are not descriptors of this platform", src, dst);
		};
		debug_assert_eq!(dst_heap.heap_type(), heap_type);
		debug_assert_eq!(src_heap.heap_type(), heap_type);
		for i in 0..count as u64 {
			let offset = i * SOFT_DESCRIPTOR_INCREMENT as u64;
			dst_heap.write(dst.0 + offset, src_heap.read(src.0 + offset));
		}
		self.descriptor_copies.fetch_add(count as u64, Ordering::Relaxed);
	}
}
