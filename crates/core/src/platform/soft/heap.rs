use crate::descriptor::HeapType;
use crate::platform::{CpuDescriptorHandle, DescriptorAllocation, DescriptorHeapId, GpuDescriptorHandle};
use parking_lot::Mutex;
use rangemap::RangeSet;
use std::ops::Range;

/// Byte distance between two software descriptors.
pub const SOFT_DESCRIPTOR_INCREMENT: u32 = 32;

/// What a software descriptor points to: the id of the object it was created for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SoftDescriptor(pub u64);

/// Which part of a [`SoftDescriptorHeap`] to allocate from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeapRegion {
	/// Lives until explicitly freed.
	Persistent,
	/// Per-draw allocations of command lists.
	Dynamic,
}

/// First fit allocator of index ranges.
#[derive(Debug)]
struct RangeAllocator {
	free: RangeSet<u32>,
	capacity: u32,
}

impl RangeAllocator {
	fn new(range: Range<u32>) -> Self {
		let mut free = RangeSet::new();
		let capacity = range.end - range.start;
		if !range.is_empty() {
			free.insert(range);
		}
		Self { free, capacity }
	}

	fn allocate(&mut self, count: u32) -> Option<Range<u32>> {
		debug_assert!(count > 0, "allocations must not be empty");
		let start = self.free.iter().find(|range| range.end - range.start >= count)?.start;
		let allocation = start..start + count;
		self.free.remove(allocation.clone());
		Some(allocation)
	}

	fn free(&mut self, range: Range<u32>) {
		debug_assert!(!self.free.overlaps(&range), "double free of {:?}", range);
		self.free.insert(range);
	}

	fn free_count(&self) -> u32 {
		self.free.iter().map(|range| range.end - range.start).sum()
	}
}

struct HeapInner {
	descriptors: Vec<Option<SoftDescriptor>>,
	persistent: RangeAllocator,
	dynamic: RangeAllocator,
}

/// A software descriptor heap. Handles encode the heap id in the upper 32 bits and the byte offset of the descriptor in
/// the lower ones, so that no valid handle is ever 0.
pub struct SoftDescriptorHeap {
	id: DescriptorHeapId,
	heap_type: HeapType,
	inner: Mutex<HeapInner>,
}

impl SoftDescriptorHeap {
	pub fn new(id: DescriptorHeapId, heap_type: HeapType, persistent: u32, dynamic: u32) -> Self {
		Self {
			id,
			heap_type,
			inner: Mutex::new(HeapInner {
				descriptors: vec![None; (persistent + dynamic) as usize],
				persistent: RangeAllocator::new(0..persistent),
				dynamic: RangeAllocator::new(persistent..persistent + dynamic),
			}),
		}
	}

	pub fn id(&self) -> DescriptorHeapId {
		self.id
	}

	pub fn heap_type(&self) -> HeapType {
		self.heap_type
	}

	fn base(&self) -> u64 {
		(self.id.0 as u64 + 1) << 32
	}

	pub fn cpu_handle(&self, index: u32) -> CpuDescriptorHandle {
		CpuDescriptorHandle(self.base() + index as u64 * SOFT_DESCRIPTOR_INCREMENT as u64)
	}

	pub fn gpu_handle(&self, index: u32) -> GpuDescriptorHandle {
		GpuDescriptorHandle(self.base() + index as u64 * SOFT_DESCRIPTOR_INCREMENT as u64)
	}

	pub fn allocate(&self, region: HeapRegion, count: u32) -> Option<DescriptorAllocation> {
		let mut inner = self.inner.lock();
		let range = match region {
			HeapRegion::Persistent => inner.persistent.allocate(count),
			HeapRegion::Dynamic => inner.dynamic.allocate(count),
		}?;
		Some(DescriptorAllocation {
			heap_type: self.heap_type,
			heap: self.id,
			first_cpu: self.cpu_handle(range.start),
			first_gpu: self.gpu_handle(range.start),
			count,
			increment: SOFT_DESCRIPTOR_INCREMENT,
		})
	}

	/// # Safety
	/// `allocation` must have been allocated from `region` of this heap and not been freed yet.
	pub unsafe fn free(&self, region: HeapRegion, allocation: &DescriptorAllocation) {
		assert_eq!(allocation.heap, self.id);
		let start = self.index_of(allocation.first_cpu.0);
		let range = start..start + allocation.count;
		let mut inner = self.inner.lock();
		for descriptor in &mut inner.descriptors[range.start as usize..range.end as usize] {
			*descriptor = None;
		}
		match region {
			HeapRegion::Persistent => inner.persistent.free(range),
			HeapRegion::Dynamic => inner.dynamic.free(range),
		}
	}

	pub fn free_count(&self, region: HeapRegion) -> u32 {
		let inner = self.inner.lock();
		match region {
			HeapRegion::Persistent => inner.persistent.free_count(),
			HeapRegion::Dynamic => inner.dynamic.free_count(),
		}
	}

	pub fn capacity(&self, region: HeapRegion) -> u32 {
		let inner = self.inner.lock();
		match region {
			HeapRegion::Persistent => inner.persistent.capacity,
			HeapRegion::Dynamic => inner.dynamic.capacity,
		}
	}

	/// Returns true if `handle` points into this heap.
	pub fn contains(&self, handle: u64) -> bool {
		handle >> 32 == self.id.0 as u64 + 1
	}

	fn index_of(&self, handle: u64) -> u32 {
		debug_assert!(self.contains(handle));
		((handle & u32::MAX as u64) / SOFT_DESCRIPTOR_INCREMENT as u64) as u32
	}

	pub fn read(&self, handle: u64) -> Option<SoftDescriptor> {
		let index = self.index_of(handle) as usize;
		self.inner.lock().descriptors.get(index).copied().flatten()
	}

	pub fn write(&self, handle: u64, descriptor: Option<SoftDescriptor>) {
		let index = self.index_of(handle) as usize;
		let mut inner = self.inner.lock();
		let len = inner.descriptors.len();
		let slot = inner
			.descriptors
			.get_mut(index)
			.unwrap_or_else(|| panic!("descriptor index {} out of bounds for heap of size {}", index, len));
		*slot = descriptor;
	}
}
