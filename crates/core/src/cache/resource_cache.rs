use crate::cache::BoundObject;
use crate::descriptor::{HeapType, ResourceKind};
use crate::layout::{CacheContentType, CompiledLayout, RootType};
use crate::pipeline::StateMismatch;
use crate::platform::{
	BindingPlatform, CpuDescriptorHandle, DescriptorAllocation, DescriptorHeapId, GpuDescriptorHandle,
};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// A resolved binding held by a cache slot.
pub struct CachedBinding<P: BindingPlatform> {
	pub kind: ResourceKind,
	/// The CPU descriptor of the object. None for buffers bound to root views, which are referenced by address.
	pub cpu_handle: Option<CpuDescriptorHandle>,
	pub object: BoundObject<P>,
}

impl<P: BindingPlatform> Clone for CachedBinding<P> {
	fn clone(&self) -> Self {
		Self {
			kind: self.kind,
			cpu_handle: self.cpu_handle,
			object: self.object.clone(),
		}
	}
}

impl<P: BindingPlatform> Debug for CachedBinding<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CachedBinding")
			.field("kind", &self.kind)
			.field("cpu_handle", &self.cpu_handle)
			.field("object", &self.object)
			.finish()
	}
}

impl<P: BindingPlatform> CachedBinding<P> {
	/// Bindings counted by [`ResourceCache::dynamic_root_buffers`].
	pub fn is_dynamic_constant_buffer(&self) -> bool {
		self.kind == ResourceKind::ConstantBuffer && self.object.is_dynamic_buffer()
	}
}

/// The slots of a single root parameter.
pub struct RootTableCache<P: BindingPlatform> {
	slots: Vec<Option<CachedBinding<P>>>,
	/// Heap and offset of the table within the cache's shader visible allocation of that heap. Only static and mutable
	/// tables of binding caches have one.
	heap_offset: Option<(HeapType, u32)>,
}

impl<P: BindingPlatform> RootTableCache<P> {
	fn new(size: u32) -> Self {
		Self {
			slots: (0..size).map(|_| None).collect(),
			heap_offset: None,
		}
	}

	pub fn size(&self) -> u32 {
		self.slots.len() as u32
	}

	pub fn resource(&self, offset: u32) -> Option<&CachedBinding<P>> {
		self.slots.get(offset as usize)?.as_ref()
	}

	pub fn heap_offset(&self) -> Option<(HeapType, u32)> {
		self.heap_offset
	}

	/// All slots with their offset, empty ones included.
	pub fn slots(&self) -> impl ExactSizeIterator<Item = (u32, Option<&CachedBinding<P>>)> + '_ {
		self.slots
			.iter()
			.enumerate()
			.map(|(offset, slot)| (offset as u32, slot.as_ref()))
	}
}

/// Failed to reserve shader visible descriptors for the static and mutable tables of a binding cache.
#[derive(Error)]
#[non_exhaustive]
pub enum CacheInitError<P: BindingPlatform> {
	#[error(
		"Failed to allocate {count} shader visible descriptors in the {heap_type} heap: {source}. Increase the size of the GPU descriptor heap."
	)]
	HeapExhausted {
		heap_type: HeapType,
		count: u32,
		#[source]
		source: P::AllocationError,
	},
}

impl<P: BindingPlatform> Debug for CacheInitError<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

/// Resolved resources organized into root tables mirroring a compiled layout.
///
/// A [`CacheContentType::Signature`] cache holds only static resources, one table per range type. A
/// [`CacheContentType::Binding`] cache has one table per root parameter, root views being tables of size 1, and owns a
/// shader visible allocation that static and mutable tables are written to as resources get bound.
pub struct ResourceCache<P: BindingPlatform> {
	platform: Arc<P>,
	content_type: CacheContentType,
	tables: Vec<RootTableCache<P>>,
	allocations: [Option<DescriptorAllocation>; HeapType::COUNT],
	dynamic_root_buffers: u32,
}

impl<P: BindingPlatform> ResourceCache<P> {
	/// Creates a cache of empty tables, `table_sizes` indexed by root index.
	pub fn new(platform: Arc<P>, content_type: CacheContentType, table_sizes: &[u32]) -> Self {
		Self {
			platform,
			content_type,
			tables: table_sizes.iter().map(|size| RootTableCache::new(*size)).collect(),
			allocations: [None, None],
			dynamic_root_buffers: 0,
		}
	}

	/// Creates a cache sized for `layout`. Binding caches additionally reserve shader visible space for their static and
	/// mutable tables.
	pub fn for_layout(
		platform: Arc<P>,
		content_type: CacheContentType,
		layout: &CompiledLayout,
	) -> Result<Self, CacheInitError<P>> {
		let mut cache = Self::new(platform, content_type, &layout.cache_table_sizes(content_type));
		if content_type == CacheContentType::Binding {
			cache.reserve_gpu_descriptors(layout)?;
		}
		Ok(cache)
	}

	/// Allocates shader visible descriptors for all static and mutable tables of `layout` and assigns each table its
	/// range. Dynamic tables get their space on every commit instead.
	pub fn reserve_gpu_descriptors(&mut self, layout: &CompiledLayout) -> Result<(), CacheInitError<P>> {
		assert_eq!(
			self.content_type,
			CacheContentType::Binding,
			"Only binding caches have shader visible descriptors"
		);
		assert!(
			self.allocations.iter().all(Option::is_none),
			"Shader visible descriptors have already been reserved"
		);

		for heap_type in HeapType::ALL {
			let count = layout.total_slots(heap_type, RootType::StaticMutable);
			if count > 0 {
				let allocation = self
					.platform
					.allocate_gpu_descriptors(heap_type, count)
					.map_err(|source| CacheInitError::HeapExhausted {
						heap_type,
						count,
						source,
					})?;
				self.allocations[heap_type as usize] = Some(allocation);
			}
		}

		let mut offsets = [0; HeapType::COUNT];
		for table in layout.root_params().tables() {
			if table.root_type == RootType::StaticMutable {
				let heap_type = table.heap_type();
				let offset = &mut offsets[heap_type as usize];
				self.tables[table.root_index as usize].heap_offset = Some((heap_type, *offset));
				*offset += table.descriptor_table_size();
			}
		}
		debug_assert!(HeapType::ALL
			.iter()
			.all(|heap_type| offsets[*heap_type as usize] == layout.total_slots(*heap_type, RootType::StaticMutable)));
		Ok(())
	}

	pub fn platform(&self) -> &Arc<P> {
		&self.platform
	}

	pub fn content_type(&self) -> CacheContentType {
		self.content_type
	}

	pub fn num_tables(&self) -> usize {
		self.tables.len()
	}

	pub fn table(&self, root_index: u32) -> Option<&RootTableCache<P>> {
		self.tables.get(root_index as usize)
	}

	pub fn resource(&self, root_index: u32, offset: u32) -> Option<&CachedBinding<P>> {
		self.tables.get(root_index as usize)?.resource(offset)
	}

	/// The shader visible heap this cache reserved descriptors in.
	pub fn heap(&self, heap_type: HeapType) -> Option<DescriptorHeapId> {
		self.allocations[heap_type as usize].map(|allocation| allocation.heap)
	}

	pub fn allocation(&self, heap_type: HeapType) -> Option<&DescriptorAllocation> {
		self.allocations[heap_type as usize].as_ref()
	}

	fn shader_visible_index(&self, heap_type: HeapType, root_index: u32, offset: u32) -> Option<(&DescriptorAllocation, u32)> {
		let (table_heap, start) = self.tables.get(root_index as usize)?.heap_offset?;
		debug_assert_eq!(table_heap, heap_type, "table {} lives in another heap", root_index);
		if table_heap != heap_type {
			return None;
		}
		Some((self.allocation(heap_type)?, start + offset))
	}

	/// The CPU handle of the shader visible descriptor at `offset` in the table `root_index`, None for dynamic tables,
	/// root views and signature caches.
	pub fn shader_visible_cpu_handle(
		&self,
		heap_type: HeapType,
		root_index: u32,
		offset: u32,
	) -> Option<CpuDescriptorHandle> {
		let (allocation, index) = self.shader_visible_index(heap_type, root_index, offset)?;
		Some(allocation.cpu_handle(index))
	}

	/// The GPU handle of the shader visible descriptor at `offset` in the table `root_index`, see
	/// [`Self::shader_visible_cpu_handle`].
	pub fn shader_visible_gpu_handle(
		&self,
		heap_type: HeapType,
		root_index: u32,
		offset: u32,
	) -> Option<GpuDescriptorHandle> {
		let (allocation, index) = self.shader_visible_index(heap_type, root_index, offset)?;
		Some(allocation.gpu_handle(index))
	}

	/// Replaces the binding of a slot and returns the previous one. The slot must exist, which the binder guarantees by
	/// resolving coordinates through the layout this cache was created from.
	pub(crate) fn set_resource(
		&mut self,
		root_index: u32,
		offset: u32,
		binding: Option<CachedBinding<P>>,
	) -> Option<CachedBinding<P>> {
		debug_assert!(
			self.resource_slot_exists(root_index, offset),
			"slot {} of table {} is out of range",
			offset,
			root_index
		);
		let slot = &mut self.tables[root_index as usize].slots[offset as usize];
		let was_dynamic = slot.as_ref().is_some_and(CachedBinding::is_dynamic_constant_buffer);
		let is_dynamic = binding.as_ref().is_some_and(CachedBinding::is_dynamic_constant_buffer);
		let previous = std::mem::replace(slot, binding);
		match (was_dynamic, is_dynamic) {
			(false, true) => self.dynamic_root_buffers += 1,
			(true, false) => self.dynamic_root_buffers -= 1,
			_ => (),
		}
		previous
	}

	fn resource_slot_exists(&self, root_index: u32, offset: u32) -> bool {
		self.tables
			.get(root_index as usize)
			.is_some_and(|table| offset < table.size())
	}

	/// Number of bound constant buffers with [`BufferUsage::Dynamic`], whose address may change every frame.
	///
	/// [`BufferUsage::Dynamic`]: crate::platform::BufferUsage::Dynamic
	pub fn dynamic_root_buffers(&self) -> u32 {
		self.dynamic_root_buffers
	}

	/// Recounts [`Self::dynamic_root_buffers`] from scratch.
	pub fn count_dynamic_root_buffers(&self) -> u32 {
		self.bound_resources()
			.filter(|(.., binding)| binding.is_dynamic_constant_buffer())
			.count() as u32
	}

	/// All non-empty slots as `(root index, offset, binding)`, in root index order.
	pub fn bound_resources(&self) -> impl Iterator<Item = (u32, u32, &CachedBinding<P>)> + '_ {
		self.tables.iter().enumerate().flat_map(|(root_index, table)| {
			table
				.slots()
				.filter_map(move |(offset, slot)| slot.map(|binding| (root_index as u32, offset, binding)))
		})
	}

	/// Checks every bound resource in a known state against the state its binding requires.
	pub fn validate_resource_states(&self) -> Vec<StateMismatch> {
		self.bound_resources()
			.filter_map(|(.., binding)| {
				let requirement = binding.kind.state_requirement()?;
				let target = binding.object.transition_target()?;
				let actual = target.state_tracked().state();
				(actual.is_known() && !requirement.is_satisfied_by(actual)).then(|| StateMismatch {
					name: target.name().to_string(),
					kind: binding.kind,
					required: requirement.target,
					actual,
				})
			})
			.collect()
	}
}

impl<P: BindingPlatform> Drop for ResourceCache<P> {
	fn drop(&mut self) {
		for allocation in self.allocations.iter().flatten() {
			// Safety: allocated in reserve_gpu_descriptors, binding objects must outlive the commands using them
			unsafe { self.platform.free_gpu_descriptors(allocation) }
		}
	}
}
