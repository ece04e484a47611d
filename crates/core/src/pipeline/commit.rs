use crate::binding::RootSignature;
use crate::cache::ResourceCache;
use crate::descriptor::{HeapType, VariableType};
use crate::layout::{CacheContentType, RootTable, RootType};
use crate::pipeline::{transition_resources, TransitionMode};
use crate::platform::{
	BindingPlatform, BufferObject, BufferUsage, CommandSink, DescriptorAllocation, PipelineBindPoint,
	ShaderDescriptorHeaps,
};
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CommitOptions {
	pub bind_point: PipelineBindPoint,
	/// Added to every root index, for signatures placed after other signatures in the same pipeline.
	pub first_root_index: u32,
	pub transition_mode: TransitionMode,
}

/// A commit that could not record the draw's bindings.
#[derive(Error)]
#[non_exhaustive]
pub enum CommitError<P: BindingPlatform> {
	#[error(
		"Failed to allocate {count} dynamic {heap_type} descriptors: {source}. Increase the size of the dynamic GPU descriptor heap or use static and mutable variables instead of dynamic ones."
	)]
	DynamicHeapExhausted {
		heap_type: HeapType,
		count: u32,
		#[source]
		source: P::AllocationError,
	},
}

impl<P: BindingPlatform> Debug for CommitError<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

/// Transitions all resources of `cache` and binds all of its root parameters, tables first, then root views, each in
/// root index order.
#[profiling::function]
pub fn commit_shader_resources<P: BindingPlatform>(
	signature: &RootSignature<P>,
	cache: &ResourceCache<P>,
	sink: &mut impl CommandSink<P>,
	options: CommitOptions,
) -> Result<(), CommitError<P>> {
	transition_resources(signature, cache, sink, options.transition_mode);
	commit_root_tables(signature, cache, sink, options)?;
	commit_root_views(signature, cache, sink, options, false);
	Ok(())
}

/// Binds all root tables. Static and mutable tables point at the descriptors reserved by `cache`, dynamic tables are
/// copied into descriptors freshly allocated from `sink`.
///
/// Slots without a CPU descriptor are reported and left as they are in the dynamic allocation.
#[profiling::function]
pub fn commit_root_tables<P: BindingPlatform>(
	signature: &RootSignature<P>,
	cache: &ResourceCache<P>,
	sink: &mut impl CommandSink<P>,
	options: CommitOptions,
) -> Result<(), CommitError<P>> {
	let layout = signature.layout();
	if layout.root_params().num_tables() == 0 {
		return Ok(());
	}

	let mut dynamic = [None::<DescriptorAllocation>; HeapType::COUNT];
	for heap_type in HeapType::ALL {
		let count = layout.total_slots(heap_type, RootType::Dynamic);
		if count > 0 {
			let allocation = sink
				.allocate_dynamic_descriptors(heap_type, count)
				.map_err(|source| CommitError::DynamicHeapExhausted {
					heap_type,
					count,
					source,
				})?;
			dynamic[heap_type as usize] = Some(allocation);
		}
	}

	let mut heaps = ShaderDescriptorHeaps::default();
	for heap_type in HeapType::ALL {
		let static_heap = cache.heap(heap_type);
		let dynamic_heap = dynamic[heap_type as usize].map(|allocation| allocation.heap);
		debug_assert!(
			static_heap.is_none() || dynamic_heap.is_none() || static_heap == dynamic_heap,
			"static and dynamic {} descriptors live in different heaps",
			heap_type
		);
		heaps.set(heap_type, static_heap.or(dynamic_heap));
	}
	if !heaps.is_empty() {
		sink.set_descriptor_heaps(heaps);
	}

	let mut dynamic_offsets = [0u32; HeapType::COUNT];
	for table in layout.root_params().tables() {
		let heap_type = table.heap_type();
		let root_index = options.first_root_index + table.root_index;
		match table.root_type {
			RootType::StaticMutable => match cache.shader_visible_gpu_handle(heap_type, table.root_index, 0) {
				Some(handle) => sink.set_root_descriptor_table(options.bind_point, root_index, handle),
				None => log::error!(
					"Table {} of signature \"{}\" has no shader visible descriptors, was the binding cache initialized?",
					table.root_index,
					signature.name()
				),
			},
			RootType::Dynamic => {
				let Some(allocation) = &dynamic[heap_type as usize] else {
					continue;
				};
				let start = dynamic_offsets[heap_type as usize];
				dynamic_offsets[heap_type as usize] += table.descriptor_table_size();
				copy_dynamic_table(signature, cache, &table, allocation, start);
				sink.set_root_descriptor_table(options.bind_point, root_index, allocation.gpu_handle(start));
			}
		}
	}
	Ok(())
}

fn copy_dynamic_table<P: BindingPlatform>(
	signature: &RootSignature<P>,
	cache: &ResourceCache<P>,
	table: &RootTable<'_>,
	allocation: &DescriptorAllocation,
	start: u32,
) {
	let heap_type = table.heap_type();
	let Some(table_cache) = cache.table(table.root_index) else {
		return;
	};
	let mut any_missing = false;
	for (offset, binding) in table_cache.slots() {
		match binding.and_then(|binding| binding.cpu_handle) {
			// Safety: the allocation lives until the sink's commands have executed, the source is kept alive by the cache
			Some(src) => unsafe {
				signature
					.platform()
					.copy_descriptors(allocation.cpu_handle(start + offset), src, 1, heap_type)
			},
			None => any_missing = true,
		}
	}

	if any_missing && log::log_enabled!(log::Level::Error) {
		for (index, array_index) in unbound_dynamic_elements(signature, cache, table.root_index) {
			log::error!(
				"No resource is bound to dynamic variable \"{}\"[{}] of signature \"{}\"",
				signature.desc().resources[index].name,
				array_index,
				signature.name()
			);
		}
	}
}

/// Elements of fixed size dynamic resources in the table `root_index` that have no CPU descriptor to copy, as
/// `(resource index, array index)`. Runtime arrays are expected to be sparse and are skipped.
fn unbound_dynamic_elements<'a, P: BindingPlatform>(
	signature: &'a RootSignature<P>,
	cache: &'a ResourceCache<P>,
	root_index: u32,
) -> impl Iterator<Item = (usize, u32)> + 'a {
	signature
		.variable_type_range(VariableType::Dynamic)
		.filter_map(move |index| {
			let res = &signature.desc().resources[index];
			let coords = signature.layout().attribs(index).binding?;
			(coords.root_index == root_index && !res.is_runtime_array()).then_some((index, coords.offset, res.array_size))
		})
		.flat_map(move |(index, offset, array_size)| {
			(0..array_size)
				.filter(move |array_index| {
					cache
						.resource(root_index, offset + array_index)
						.and_then(|binding| binding.cpu_handle)
						.is_none()
				})
				.map(move |array_index| (index, array_index))
		})
}

/// Sets the GPU address of the buffer bound to every root view. With `dynamic_buffers_only` only buffers whose address
/// may have changed since the last commit are set.
#[profiling::function]
pub fn commit_root_views<P: BindingPlatform>(
	signature: &RootSignature<P>,
	cache: &ResourceCache<P>,
	sink: &mut impl CommandSink<P>,
	options: CommitOptions,
	dynamic_buffers_only: bool,
) {
	if dynamic_buffers_only && cache.dynamic_root_buffers() == 0 {
		return;
	}
	for view in signature.layout().root_params().views() {
		let buffer = cache
			.resource(view.root_index, 0)
			.and_then(|binding| binding.object.as_buffer());
		match buffer {
			Some(buffer) => {
				if dynamic_buffers_only && buffer.usage() != BufferUsage::Dynamic {
					continue;
				}
				sink.set_root_constant_buffer_view(
					options.bind_point,
					options.first_root_index + view.root_index,
					buffer.gpu_address(),
				);
			}
			None if log::log_enabled!(log::Level::Error) => {
				if let Some((index, _)) = signature.resource_at(CacheContentType::Binding, view.root_index, 0) {
					log::error!(
						"No buffer is bound to constant buffer \"{}\" of signature \"{}\"",
						signature.desc().resources[index].name,
						signature.name()
					);
				}
			}
			None => (),
		}
	}
}
