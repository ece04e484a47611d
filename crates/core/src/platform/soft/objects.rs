use crate::descriptor::{HeapType, SamplerDesc};
use crate::pipeline::ResourceState;
use crate::platform::soft::{HeapRegion, SoftAllocationError, SoftDescriptor, SoftDescriptorHeap, SoftPlatform};
use crate::platform::{
	AccelStructObject, BufferBindFlags, BufferObject, BufferUsage, BufferViewObject, BufferViewType,
	CpuDescriptorHandle, DescriptorAllocation, GpuVirtualAddress, SamplerObject, StateTracked, TextureObject,
	TextureViewObject, TextureViewType,
};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_GPU_ADDRESS: AtomicU64 = AtomicU64::new(0x1_0000);

/// Alignment of constant buffer placements
const ADDRESS_ALIGNMENT: u64 = 256;

pub(crate) fn next_object_id() -> u64 {
	NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

fn next_gpu_address(size: u64) -> GpuVirtualAddress {
	let size = size.max(1).next_multiple_of(ADDRESS_ALIGNMENT);
	GpuVirtualAddress(NEXT_GPU_ADDRESS.fetch_add(size, Ordering::Relaxed))
}

#[derive(Debug)]
struct TrackedState(AtomicU32);

impl TrackedState {
	fn new(state: ResourceState) -> Self {
		Self(AtomicU32::new(state.bits()))
	}

	fn get(&self) -> ResourceState {
		ResourceState::from_bits_retain(self.0.load(Ordering::Relaxed))
	}

	fn set(&self, state: ResourceState) {
		self.0.store(state.bits(), Ordering::Relaxed);
	}
}

/// A single descriptor in a CPU-only staging heap describing an object, freed on drop.
pub struct StagingDescriptor {
	heap: Arc<SoftDescriptorHeap>,
	allocation: DescriptorAllocation,
}

impl StagingDescriptor {
	pub(crate) fn new(heap: &Arc<SoftDescriptorHeap>, object_id: u64) -> Result<Self, SoftAllocationError> {
		let allocation = heap
			.allocate(HeapRegion::Persistent, 1)
			.ok_or_else(|| SoftAllocationError::OutOfDescriptors {
				heap_type: heap.heap_type(),
				region: HeapRegion::Persistent,
				requested: 1,
				available: heap.free_count(HeapRegion::Persistent),
			})?;
		heap.write(allocation.first_cpu.0, Some(SoftDescriptor(object_id)));
		Ok(Self {
			heap: heap.clone(),
			allocation,
		})
	}

	pub fn handle(&self) -> CpuDescriptorHandle {
		self.allocation.first_cpu
	}
}

impl Debug for StagingDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("StagingDescriptor").field(&self.handle()).finish()
	}
}

impl Drop for StagingDescriptor {
	fn drop(&mut self) {
		// Safety: allocated in new and only freed here
		unsafe { self.heap.free(HeapRegion::Persistent, &self.allocation) }
	}
}

#[derive(Copy, Clone, Debug)]
pub struct SoftBufferCreateInfo<'a> {
	pub name: &'a str,
	pub size: u64,
	pub usage: BufferUsage,
	pub bind_flags: BufferBindFlags,
	pub initial_state: ResourceState,
}

impl Default for SoftBufferCreateInfo<'_> {
	fn default() -> Self {
		Self {
			name: "",
			size: 256,
			usage: BufferUsage::Default,
			bind_flags: BufferBindFlags::UNIFORM_BUFFER,
			initial_state: ResourceState::COMMON,
		}
	}
}

#[derive(Debug)]
pub struct SoftBuffer {
	id: u64,
	name: String,
	size: u64,
	usage: BufferUsage,
	bind_flags: BufferBindFlags,
	state: TrackedState,
	cbv: Option<StagingDescriptor>,
	address: AtomicU64,
}

impl SoftBuffer {
	pub(crate) fn new(platform: &SoftPlatform, info: &SoftBufferCreateInfo) -> Result<Self, SoftAllocationError> {
		let id = next_object_id();
		let cbv = match info.usage {
			BufferUsage::Default if info.bind_flags.contains(BufferBindFlags::UNIFORM_BUFFER) => {
				Some(StagingDescriptor::new(platform.staging_heap(HeapType::CbvSrvUav), id)?)
			}
			_ => None,
		};
		Ok(Self {
			id,
			name: info.name.to_string(),
			size: info.size,
			usage: info.usage,
			bind_flags: info.bind_flags,
			state: TrackedState::new(info.initial_state),
			cbv,
			address: AtomicU64::new(next_gpu_address(info.size).0),
		})
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn size(&self) -> u64 {
		self.size
	}

	/// Moves a dynamic buffer to new backing memory, as happens once per frame, and returns the new address.
	pub fn rename(&self) -> GpuVirtualAddress {
		assert_eq!(
			self.usage,
			BufferUsage::Dynamic,
			"Only dynamic buffers can be renamed, but buffer '{}' is not dynamic",
			self.name
		);
		let address = next_gpu_address(self.size);
		self.address.store(address.0, Ordering::Relaxed);
		address
	}
}

impl StateTracked for SoftBuffer {
	fn name(&self) -> &str {
		&self.name
	}

	fn state(&self) -> ResourceState {
		self.state.get()
	}

	fn set_state(&self, state: ResourceState) {
		self.state.set(state)
	}
}

impl BufferObject for SoftBuffer {
	fn usage(&self) -> BufferUsage {
		self.usage
	}

	fn bind_flags(&self) -> BufferBindFlags {
		self.bind_flags
	}

	fn cbv_handle(&self) -> Option<CpuDescriptorHandle> {
		self.cbv.as_ref().map(StagingDescriptor::handle)
	}

	fn gpu_address(&self) -> GpuVirtualAddress {
		GpuVirtualAddress(self.address.load(Ordering::Relaxed))
	}
}

#[derive(Debug)]
pub struct SoftBufferView {
	id: u64,
	view_type: BufferViewType,
	formatted: bool,
	descriptor: StagingDescriptor,
	buffer: Arc<SoftBuffer>,
}

impl SoftBufferView {
	pub(crate) fn new(
		heap: &Arc<SoftDescriptorHeap>,
		buffer: Arc<SoftBuffer>,
		view_type: BufferViewType,
		formatted: bool,
	) -> Result<Self, SoftAllocationError> {
		let id = next_object_id();
		Ok(Self {
			id,
			view_type,
			formatted,
			descriptor: StagingDescriptor::new(heap, id)?,
			buffer,
		})
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

impl BufferViewObject<SoftPlatform> for SoftBufferView {
	fn view_type(&self) -> BufferViewType {
		self.view_type
	}

	fn is_formatted(&self) -> bool {
		self.formatted
	}

	fn handle(&self) -> CpuDescriptorHandle {
		self.descriptor.handle()
	}

	fn buffer(&self) -> &Arc<SoftBuffer> {
		&self.buffer
	}
}

#[derive(Debug)]
pub struct SoftTexture {
	id: u64,
	name: String,
	state: TrackedState,
}

impl SoftTexture {
	pub(crate) fn new(name: &str, initial_state: ResourceState) -> Self {
		Self {
			id: next_object_id(),
			name: name.to_string(),
			state: TrackedState::new(initial_state),
		}
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

impl StateTracked for SoftTexture {
	fn name(&self) -> &str {
		&self.name
	}

	fn state(&self) -> ResourceState {
		self.state.get()
	}

	fn set_state(&self, state: ResourceState) {
		self.state.set(state)
	}
}

impl TextureObject for SoftTexture {}

#[derive(Debug)]
pub struct SoftTextureView {
	id: u64,
	view_type: TextureViewType,
	descriptor: StagingDescriptor,
	texture: Arc<SoftTexture>,
	sampler: Option<Arc<SoftSampler>>,
}

impl SoftTextureView {
	pub(crate) fn new(
		heap: &Arc<SoftDescriptorHeap>,
		texture: Arc<SoftTexture>,
		view_type: TextureViewType,
		sampler: Option<Arc<SoftSampler>>,
	) -> Result<Self, SoftAllocationError> {
		let id = next_object_id();
		Ok(Self {
			id,
			view_type,
			descriptor: StagingDescriptor::new(heap, id)?,
			texture,
			sampler,
		})
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

impl TextureViewObject<SoftPlatform> for SoftTextureView {
	fn view_type(&self) -> TextureViewType {
		self.view_type
	}

	fn handle(&self) -> CpuDescriptorHandle {
		self.descriptor.handle()
	}

	fn texture(&self) -> &Arc<SoftTexture> {
		&self.texture
	}

	fn sampler(&self) -> Option<&Arc<SoftSampler>> {
		self.sampler.as_ref()
	}
}

#[derive(Debug)]
pub struct SoftSampler {
	id: u64,
	name: String,
	desc: SamplerDesc,
	descriptor: StagingDescriptor,
}

impl SoftSampler {
	pub(crate) fn new(heap: &Arc<SoftDescriptorHeap>, name: &str, desc: SamplerDesc) -> Result<Self, SoftAllocationError> {
		let id = next_object_id();
		Ok(Self {
			id,
			name: name.to_string(),
			desc,
			descriptor: StagingDescriptor::new(heap, id)?,
		})
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn desc(&self) -> &SamplerDesc {
		&self.desc
	}
}

impl SamplerObject for SoftSampler {
	fn handle(&self) -> CpuDescriptorHandle {
		self.descriptor.handle()
	}
}

#[derive(Debug)]
pub struct SoftAccelStruct {
	id: u64,
	name: String,
	state: TrackedState,
	descriptor: StagingDescriptor,
}

impl SoftAccelStruct {
	pub(crate) fn new(
		heap: &Arc<SoftDescriptorHeap>,
		name: &str,
		initial_state: ResourceState,
	) -> Result<Self, SoftAllocationError> {
		let id = next_object_id();
		Ok(Self {
			id,
			name: name.to_string(),
			state: TrackedState::new(initial_state),
			descriptor: StagingDescriptor::new(heap, id)?,
		})
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

impl StateTracked for SoftAccelStruct {
	fn name(&self) -> &str {
		&self.name
	}

	fn state(&self) -> ResourceState {
		self.state.get()
	}

	fn set_state(&self, state: ResourceState) {
		self.state.set(state)
	}
}

impl AccelStructObject for SoftAccelStruct {
	fn handle(&self) -> CpuDescriptorHandle {
		self.descriptor.handle()
	}
}
