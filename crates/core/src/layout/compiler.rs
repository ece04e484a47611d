use crate::descriptor::{DescError, HeapType, ResourceDesc, ResourceFlags, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use crate::layout::{
	root_table_slot, CacheContentType, CacheCoordinates, DescriptorRange, ImmutableSamplerAttribs, RangeType,
	ResourceAttribs, RootParamsManager, RootType, RootView, ROOT_TABLE_SLOT_COUNT,
};
use rustc_hash::FxHasher;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use thiserror::Error;

/// A [`SignatureDesc`] that could not be compiled. The signature being built is discarded entirely.
#[derive(Error)]
#[non_exhaustive]
pub enum LayoutError {
	#[error("Invalid signature description: {0}")]
	Desc(#[from] DescError),
	#[error(
		"Resource \"{name}\" at index {index} is {var_type} but follows a {previous} resource, resources must be sorted by variable type"
	)]
	UnsortedResources {
		index: usize,
		name: String,
		var_type: VariableType,
		previous: VariableType,
	},
	#[error("Shader stages {stages:?} of resource \"{name}\" can not be mapped to a root table")]
	UnmappableStages { name: String, stages: ShaderStages },
}

impl Debug for LayoutError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

/// The result of compiling a [`SignatureDesc`]: the root parameters and where every resource lives within them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledLayout {
	root_params: RootParamsManager,
	attribs: Vec<ResourceAttribs>,
	immutable_samplers: Vec<ImmutableSamplerAttribs>,
	total_srv_cbv_uav_slots: [u32; RootType::COUNT],
	total_sampler_slots: [u32; RootType::COUNT],
	total_root_views: [u32; RootType::COUNT],
	static_table_sizes: [u32; RangeType::COUNT],
	var_type_ranges: [(u32, u32); VariableType::COUNT],
	runtime_array_spaces: u32,
	hash: u64,
}

impl CompiledLayout {
	pub fn root_params(&self) -> &RootParamsManager {
		&self.root_params
	}

	pub fn attribs(&self, resource_index: usize) -> &ResourceAttribs {
		&self.attribs[resource_index]
	}

	pub fn all_attribs(&self) -> &[ResourceAttribs] {
		&self.attribs
	}

	pub fn immutable_samplers(&self) -> &[ImmutableSamplerAttribs] {
		&self.immutable_samplers
	}

	/// Number of descriptor slots all tables of `root_type` in the heap `heap_type` need together.
	pub fn total_slots(&self, heap_type: HeapType, root_type: RootType) -> u32 {
		match heap_type {
			HeapType::CbvSrvUav => self.total_srv_cbv_uav_slots[root_type as usize],
			HeapType::Sampler => self.total_sampler_slots[root_type as usize],
		}
	}

	pub fn total_root_views(&self, root_type: RootType) -> u32 {
		self.total_root_views[root_type as usize]
	}

	/// Sizes of the signature's static cache tables, indexed by [`RangeType::static_root_index`].
	pub fn static_table_sizes(&self) -> [u32; RangeType::COUNT] {
		self.static_table_sizes
	}

	/// The contiguous index range of resources with the update class `var_type`.
	pub fn variable_type_range(&self, var_type: VariableType) -> Range<usize> {
		let (start, end) = self.var_type_ranges[var_type as usize];
		start as usize..end as usize
	}

	/// Number of register spaces allocated to runtime arrays, on top of the base register space.
	pub fn runtime_array_spaces(&self) -> u32 {
		self.runtime_array_spaces
	}

	/// Structural hash of the layout. Compiling the same description always yields the same hash.
	pub fn hash(&self) -> u64 {
		self.hash
	}

	/// The number of slots in each root table of a resource cache holding `content_type`, indexed by root index.
	pub fn cache_table_sizes(&self, content_type: CacheContentType) -> Vec<u32> {
		match content_type {
			CacheContentType::Signature => self.static_table_sizes.to_vec(),
			CacheContentType::Binding => {
				let mut sizes = vec![0; self.root_params.num_root_parameters()];
				for param in self.root_params.parameters() {
					sizes[param.root_index() as usize] = param.cache_size();
				}
				sizes
			}
		}
	}
}

/// Compiles the resources of `desc` into root tables and root views.
///
/// Resources are expected to be sorted by [`VariableType`]. Static resources additionally get a location within the
/// signature's static cache, where all static resources of a [`RangeType`] share one table.
#[profiling::function]
pub fn compile_layout(desc: &SignatureDesc) -> Result<CompiledLayout, LayoutError> {
	desc.validate()?;
	let var_type_ranges = variable_type_ranges(desc)?;

	let mut compiler = LayoutCompiler::new(desc.base_register_space, desc.immutable_samplers.len());
	let mut attribs = Vec::with_capacity(desc.resources.len());
	for res in &desc.resources {
		let (start, end) = var_type_ranges[res.var_type as usize];
		attribs.push(compiler.compile_resource(desc, res, start as usize..end as usize)?);
	}
	let immutable_samplers = compiler.finish_immutable_samplers();

	let mut layout = CompiledLayout {
		root_params: compiler.root_params,
		attribs,
		immutable_samplers,
		total_srv_cbv_uav_slots: compiler.total_srv_cbv_uav_slots,
		total_sampler_slots: compiler.total_sampler_slots,
		total_root_views: compiler.total_root_views,
		static_table_sizes: compiler.static_table_sizes,
		var_type_ranges,
		runtime_array_spaces: compiler.runtime_array_spaces,
		hash: 0,
	};
	layout.hash = layout_hash(&layout);

	log::debug!(
		"Compiled layout of signature \"{}\": {} root tables, {} root views, {:?} CBV/SRV/UAV and {:?} sampler slots per root type",
		desc.name,
		layout.root_params.num_tables(),
		layout.root_params.num_views(),
		layout.total_srv_cbv_uav_slots,
		layout.total_sampler_slots,
	);
	Ok(layout)
}

fn variable_type_ranges(desc: &SignatureDesc) -> Result<[(u32, u32); VariableType::COUNT], LayoutError> {
	for (index, pair) in desc.resources.windows(2).enumerate() {
		if pair[1].var_type < pair[0].var_type {
			return Err(LayoutError::UnsortedResources {
				index: index + 1,
				name: pair[1].name.clone(),
				var_type: pair[1].var_type,
				previous: pair[0].var_type,
			});
		}
	}

	let mut ranges = [(0, 0); VariableType::COUNT];
	let mut start = 0;
	for var_type in VariableType::ALL {
		let count = desc.resources.iter().filter(|res| res.var_type == var_type).count() as u32;
		ranges[var_type as usize] = (start, start + count);
		start += count;
	}
	Ok(ranges)
}

fn layout_hash(layout: &CompiledLayout) -> u64 {
	let mut hasher = FxHasher::default();
	layout.root_params.hash(&mut hasher);
	layout.attribs.hash(&mut hasher);
	layout.immutable_samplers.hash(&mut hasher);
	layout.total_srv_cbv_uav_slots.hash(&mut hasher);
	layout.total_sampler_slots.hash(&mut hasher);
	layout.static_table_sizes.hash(&mut hasher);
	hasher.finish()
}

const TABLE_KEY_COUNT: usize = ROOT_TABLE_SLOT_COUNT * RootType::COUNT;

struct LayoutCompiler {
	base_space: u32,
	root_params: RootParamsManager,
	/// Table index per `slot * RootType::COUNT + root type`, separately for resources and samplers.
	resource_tables: [Option<usize>; TABLE_KEY_COUNT],
	sampler_tables: [Option<usize>; TABLE_KEY_COUNT],
	/// Next free register per range type within the base register space.
	registers: [u32; RangeType::COUNT],
	static_table_sizes: [u32; RangeType::COUNT],
	total_srv_cbv_uav_slots: [u32; RootType::COUNT],
	total_sampler_slots: [u32; RootType::COUNT],
	total_root_views: [u32; RootType::COUNT],
	runtime_array_spaces: u32,
	immutable_samplers: Vec<Option<ImmutableSamplerAttribs>>,
}

impl LayoutCompiler {
	fn new(base_space: u32, immutable_sampler_count: usize) -> Self {
		Self {
			base_space,
			root_params: RootParamsManager::new(),
			resource_tables: [None; TABLE_KEY_COUNT],
			sampler_tables: [None; TABLE_KEY_COUNT],
			registers: [0; RangeType::COUNT],
			static_table_sizes: [0; RangeType::COUNT],
			total_srv_cbv_uav_slots: [0; RootType::COUNT],
			total_sampler_slots: [0; RootType::COUNT],
			total_root_views: [0; RootType::COUNT],
			runtime_array_spaces: 0,
			immutable_samplers: vec![None; immutable_sampler_count],
		}
	}

	fn compile_resource(
		&mut self,
		desc: &SignatureDesc,
		res: &ResourceDesc,
		var_type_range: Range<usize>,
	) -> Result<ResourceAttribs, LayoutError> {
		let range_type = RangeType::from_resource_kind(res.kind);
		let is_runtime_array = res.is_runtime_array();

		// runtime arrays are placed alone in their own space
		let (register, space) = if is_runtime_array {
			self.runtime_array_spaces += 1;
			(0, self.base_space + self.runtime_array_spaces)
		} else {
			let register = self.registers[range_type as usize];
			self.registers[range_type as usize] += res.array_size;
			(register, self.base_space)
		};

		let is_root_view = res.kind == ResourceKind::ConstantBuffer
			&& res.var_type != VariableType::Static
			&& res.array_size == 1
			&& !res.flags.intersects(
				ResourceFlags::NO_DYNAMIC_BUFFERS | ResourceFlags::FORMATTED_BUFFER | ResourceFlags::RUNTIME_ARRAY,
			);

		let immutable_sampler = if res.kind == ResourceKind::Sampler {
			desc.find_immutable_sampler(res)
		} else {
			None
		};
		let assigned_sampler = if res.kind == ResourceKind::TextureSrv {
			desc.find_assigned_sampler(res, var_type_range).map(|i| i as u32)
		} else {
			None
		};

		let (binding, signature) = match immutable_sampler {
			Some(imtbl_index) => {
				let imtbl = &mut self.immutable_samplers[imtbl_index];
				if imtbl.is_none() {
					*imtbl = Some(ImmutableSamplerAttribs {
						register,
						space,
						array_size: res.array_size,
					});
				} else if !is_runtime_array {
					// reuse the registers of the first resource this immutable sampler was assigned to
					self.registers[range_type as usize] -= res.array_size;
				}
				(None, None)
			}
			None => {
				let binding = self.allocate_resource_slot(res, range_type, is_root_view, register, space)?;
				let signature = (res.var_type == VariableType::Static).then(|| {
					let sizes = &mut self.static_table_sizes[range_type as usize];
					let offset = *sizes;
					*sizes += res.array_size;
					CacheCoordinates {
						root_index: range_type.static_root_index(),
						offset,
					}
				});
				(Some(binding), signature)
			}
		};

		Ok(ResourceAttribs {
			register,
			space,
			assigned_sampler,
			immutable_sampler: immutable_sampler.map(|i| i as u32),
			binding,
			signature,
			is_root_view,
		})
	}

	fn allocate_resource_slot(
		&mut self,
		res: &ResourceDesc,
		range_type: RangeType,
		is_root_view: bool,
		register: u32,
		space: u32,
	) -> Result<CacheCoordinates, LayoutError> {
		let (slot, visibility) = root_table_slot(res.stages).ok_or_else(|| LayoutError::UnmappableStages {
			name: res.name.clone(),
			stages: res.stages,
		})?;
		let root_type = RootType::from_variable_type(res.var_type);
		let new_root_index = self.root_params.num_root_parameters() as u32;

		if is_root_view {
			self.root_params.add_root_view(RootView {
				root_index: new_root_index,
				visibility,
				root_type,
				range_type: RangeType::Cbv,
				register,
				space,
			});
			self.total_root_views[root_type as usize] += 1;
			return Ok(CacheCoordinates {
				root_index: new_root_index,
				offset: 0,
			});
		}

		let range = |offset| DescriptorRange {
			range_type,
			base_register: register,
			space,
			count: res.array_size,
			offset,
		};
		let key = slot * RootType::COUNT + root_type as usize;
		let tables = match range_type {
			RangeType::Sampler => &mut self.sampler_tables,
			_ => &mut self.resource_tables,
		};

		let existing = if res.is_runtime_array() { None } else { tables[key] };
		let coordinates = match existing {
			Some(table_index) => {
				let table = self.root_params.table(table_index);
				let coordinates = CacheCoordinates {
					root_index: table.root_index,
					offset: table.descriptor_table_size(),
				};
				self.root_params
					.add_descriptor_ranges(table_index, &[range(coordinates.offset)]);
				coordinates
			}
			None => {
				let table_index = self
					.root_params
					.add_root_table(new_root_index, visibility, root_type, &[range(0)]);
				// runtime arrays never share their table
				if !res.is_runtime_array() {
					tables[key] = Some(table_index);
				}
				CacheCoordinates {
					root_index: new_root_index,
					offset: 0,
				}
			}
		};

		match range_type.heap_type() {
			HeapType::CbvSrvUav => self.total_srv_cbv_uav_slots[root_type as usize] += res.array_size,
			HeapType::Sampler => self.total_sampler_slots[root_type as usize] += res.array_size,
		}
		Ok(coordinates)
	}

	/// Immutable samplers not matched to any resource are appended after all other samplers in the base space.
	fn finish_immutable_samplers(&mut self) -> Vec<ImmutableSamplerAttribs> {
		let registers = &mut self.registers[RangeType::Sampler as usize];
		let base_space = self.base_space;
		self.immutable_samplers
			.iter()
			.map(|imtbl| {
				imtbl.unwrap_or_else(|| {
					let register = *registers;
					*registers += 1;
					ImmutableSamplerAttribs {
						register,
						space: base_space,
						array_size: 1,
					}
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::descriptor::{ImmutableSamplerDesc, ShaderStages};
	use crate::layout::{RootParameter, ShaderVisibility};
	use rustc_hash::FxHashSet;

	fn res(name: &str, stages: ShaderStages, kind: ResourceKind, var_type: VariableType) -> ResourceDesc {
		ResourceDesc::new(name, stages, 1, kind, var_type)
	}

	fn mixed_desc() -> SignatureDesc {
		let mut desc = SignatureDesc::new(
			"mixed",
			vec![
				res("s_Tex", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Static),
				res("s_CB", ShaderStages::VERTEX, ResourceKind::ConstantBuffer, VariableType::Static),
				res("s_Sam", ShaderStages::PIXEL, ResourceKind::Sampler, VariableType::Static),
				ResourceDesc::new(
					"m_Textures",
					ShaderStages::PIXEL,
					4,
					ResourceKind::TextureSrv,
					VariableType::Mutable,
				),
				res("m_CB", ShaderStages::PIXEL, ResourceKind::ConstantBuffer, VariableType::Mutable),
				res(
					"m_Buf",
					ShaderStages::VERTEX | ShaderStages::PIXEL,
					ResourceKind::BufferUav,
					VariableType::Mutable,
				),
				res("m_Sam", ShaderStages::PIXEL, ResourceKind::Sampler, VariableType::Mutable),
				res("d_Tex", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Dynamic),
				res("d_CB", ShaderStages::VERTEX, ResourceKind::ConstantBuffer, VariableType::Dynamic)
					.with_flags(ResourceFlags::NO_DYNAMIC_BUFFERS),
				res("d_Sam", ShaderStages::PIXEL, ResourceKind::Sampler, VariableType::Dynamic),
			],
		);
		desc.immutable_samplers = vec![ImmutableSamplerDesc::new(
			ShaderStages::PIXEL,
			"s_Sam",
			Default::default(),
		)];
		desc
	}

	#[test]
	fn test_deterministic() -> anyhow::Result<()> {
		let a = compile_layout(&mixed_desc())?;
		let b = compile_layout(&mixed_desc())?;
		assert_eq!(a, b);
		assert_eq!(a.hash(), b.hash());

		let mut other = mixed_desc();
		other.resources[3].array_size = 5;
		assert_ne!(compile_layout(&other)?.hash(), a.hash());
		Ok(())
	}

	#[test]
	fn test_table_size_is_max_range_end() -> anyhow::Result<()> {
		let layout = compile_layout(&mixed_desc())?;
		for table in layout.root_params().tables() {
			let max_end = table.ranges.iter().map(|r| r.offset + r.count).max().unwrap_or(0);
			assert_eq!(table.descriptor_table_size(), max_end);
		}
		Ok(())
	}

	#[test]
	fn test_no_aliasing() -> anyhow::Result<()> {
		let desc = mixed_desc();
		let layout = compile_layout(&desc)?;
		let mut used = FxHashSet::default();
		for (res, attribs) in desc.resources.iter().zip(layout.all_attribs()) {
			if let Some(coords) = attribs.binding {
				for element in 0..res.array_size {
					assert!(
						used.insert((coords.root_index, coords.offset + element)),
						"{} aliases another resource",
						res.name
					);
				}
			}
		}
		Ok(())
	}

	#[test]
	fn test_static_coordinates() -> anyhow::Result<()> {
		let desc = mixed_desc();
		let layout = compile_layout(&desc)?;

		let tex = layout.attribs(0);
		assert_eq!(
			tex.signature,
			Some(CacheCoordinates {
				root_index: RangeType::Srv.static_root_index(),
				offset: 0
			})
		);
		assert!(tex.binding.is_some());
		let cb = layout.attribs(1);
		assert_eq!(
			cb.signature,
			Some(CacheCoordinates {
				root_index: RangeType::Cbv.static_root_index(),
				offset: 0
			})
		);
		// static constant buffers live in tables, as they are resolved once
		assert!(!cb.is_root_view);

		// immutable samplers never occupy a slot
		let sam = layout.attribs(2);
		assert!(sam.is_immutable_sampler_assigned());
		assert_eq!(sam.binding, None);
		assert_eq!(sam.signature, None);

		for index in layout.variable_type_range(VariableType::Mutable) {
			assert_eq!(layout.attribs(index).signature, None);
		}
		assert_eq!(layout.static_table_sizes(), [1, 0, 1, 0]);
		Ok(())
	}

	#[test]
	fn test_root_views_and_tables() -> anyhow::Result<()> {
		let desc = mixed_desc();
		let layout = compile_layout(&desc)?;
		let params = layout.root_params();

		// m_CB is the only root view, d_CB opted out by NO_DYNAMIC_BUFFERS
		assert_eq!(params.num_views(), 1);
		let m_cb = layout.attribs(4);
		assert!(m_cb.is_root_view);
		let view = params.view(0);
		assert_eq!(view.root_index, m_cb.binding.unwrap().root_index);
		assert_eq!(view.visibility, ShaderVisibility::Pixel);
		assert_eq!(view.root_type, RootType::StaticMutable);
		assert!(!layout.attribs(8).is_root_view);

		// static and mutable pixel resources share one table
		let s_tex = layout.attribs(0).binding.unwrap();
		let m_tex = layout.attribs(3).binding.unwrap();
		assert_eq!(s_tex.root_index, m_tex.root_index);
		assert_eq!(m_tex.offset, 1);
		let Some(RootParameter::Table(table)) = params.parameter(s_tex.root_index) else {
			panic!("expected a table");
		};
		assert_eq!(table.descriptor_table_size(), 5);

		assert_eq!(layout.total_slots(HeapType::CbvSrvUav, RootType::StaticMutable), 7);
		assert_eq!(layout.total_slots(HeapType::Sampler, RootType::StaticMutable), 1);
		assert_eq!(layout.total_slots(HeapType::CbvSrvUav, RootType::Dynamic), 2);
		assert_eq!(layout.total_slots(HeapType::Sampler, RootType::Dynamic), 1);
		assert_eq!(layout.total_root_views(RootType::StaticMutable), 1);

		let sizes = layout.cache_table_sizes(CacheContentType::Binding);
		assert_eq!(sizes.len(), params.num_root_parameters());
		assert_eq!(sizes[view.root_index as usize], 1);
		assert_eq!(sizes.iter().sum::<u32>(), 7 + 1 + 2 + 1 + 1);
		Ok(())
	}

	#[test]
	fn test_registers() -> anyhow::Result<()> {
		let desc = mixed_desc();
		let layout = compile_layout(&desc)?;
		// SRVs: s_Tex, m_Textures[4], d_Tex
		assert_eq!(layout.attribs(0).register, 0);
		assert_eq!(layout.attribs(3).register, 1);
		assert_eq!(layout.attribs(7).register, 5);
		// samplers: s_Sam is immutable and keeps register 0
		assert_eq!(layout.attribs(2).register, 0);
		assert_eq!(layout.attribs(6).register, 1);
		assert_eq!(
			layout.immutable_samplers(),
			&[ImmutableSamplerAttribs {
				register: 0,
				space: 0,
				array_size: 1
			}]
		);
		Ok(())
	}

	#[test]
	fn test_immutable_sampler_not_double_counted() -> anyhow::Result<()> {
		let mut desc = SignatureDesc::new(
			"",
			vec![
				ResourceDesc::new("g_Sam", ShaderStages::PIXEL, 2, ResourceKind::Sampler, VariableType::Mutable),
				ResourceDesc::new("g_Sam", ShaderStages::VERTEX, 2, ResourceKind::Sampler, VariableType::Mutable),
				res("g_Other", ShaderStages::PIXEL, ResourceKind::Sampler, VariableType::Mutable),
			],
		);
		desc.immutable_samplers = vec![
			ImmutableSamplerDesc::new(ShaderStages::PIXEL | ShaderStages::VERTEX, "g_Sam", Default::default()),
			ImmutableSamplerDesc::new(ShaderStages::COMPUTE, "g_Unused", Default::default()),
		];
		let layout = compile_layout(&desc)?;
		assert_eq!(layout.attribs(0).register, 0);
		assert_eq!(layout.attribs(1).register, 2);
		// the second g_Sam reuses the registers of the first one
		assert_eq!(layout.attribs(2).register, 2);
		assert_eq!(layout.immutable_samplers()[0].array_size, 2);
		// unmatched immutable samplers are appended
		assert_eq!(layout.immutable_samplers()[1].register, 3);
		assert_eq!(layout.total_slots(HeapType::Sampler, RootType::StaticMutable), 1);
		Ok(())
	}

	#[test]
	fn test_two_stage_textures() -> anyhow::Result<()> {
		let desc = SignatureDesc::new(
			"",
			vec![
				res("g_VertexTex", ShaderStages::VERTEX, ResourceKind::TextureSrv, VariableType::Mutable),
				res("g_PixelTex", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Mutable),
			],
		);
		let layout = compile_layout(&desc)?;
		let params = layout.root_params();
		assert_eq!(params.num_tables(), 2);
		assert_eq!(params.num_views(), 0);
		for table in params.tables() {
			assert_eq!(table.ranges.len(), 1);
			assert_eq!(table.ranges[0].count, 1);
		}
		assert_eq!(params.table(0).visibility, ShaderVisibility::Vertex);
		assert_eq!(params.table(1).visibility, ShaderVisibility::Pixel);
		Ok(())
	}

	#[test]
	fn test_runtime_array_space() -> anyhow::Result<()> {
		let mut desc = SignatureDesc::new(
			"",
			vec![
				res("g_Tex", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Mutable),
				ResourceDesc::new("g_Bindless", ShaderStages::PIXEL, 64, ResourceKind::TextureSrv, VariableType::Mutable)
					.with_flags(ResourceFlags::RUNTIME_ARRAY),
				ResourceDesc::new("g_Buffers", ShaderStages::PIXEL, 16, ResourceKind::BufferSrv, VariableType::Mutable)
					.with_flags(ResourceFlags::RUNTIME_ARRAY),
				res("g_Tex2", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Mutable),
			],
		);
		desc.base_register_space = 2;
		let layout = compile_layout(&desc)?;

		let fixed = [layout.attribs(0), layout.attribs(3)];
		let runtime = [layout.attribs(1), layout.attribs(2)];
		assert!(fixed.iter().all(|a| a.space == 2));
		assert_eq!(runtime[0].space, 3);
		assert_eq!(runtime[1].space, 4);
		assert_eq!(runtime[0].register, 0);
		assert_eq!(layout.attribs(3).register, 1);
		assert_eq!(layout.runtime_array_spaces(), 2);

		// every runtime array owns its table alone
		let root_indices = [0, 1, 2, 3].map(|i| layout.attribs(i).binding.unwrap().root_index);
		assert_eq!(root_indices[0], root_indices[3]);
		assert_ne!(root_indices[1], root_indices[0]);
		assert_ne!(root_indices[2], root_indices[0]);
		assert_ne!(root_indices[1], root_indices[2]);
		for runtime_root in [root_indices[1], root_indices[2]] {
			let Some(RootParameter::Table(table)) = layout.root_params().parameter(runtime_root) else {
				panic!("expected a table");
			};
			assert_eq!(table.ranges.len(), 1);
		}
		Ok(())
	}

	#[test]
	fn test_single_constant_buffer_is_root_view() -> anyhow::Result<()> {
		let desc = SignatureDesc::new(
			"",
			vec![res("g_CB", ShaderStages::VERTEX, ResourceKind::ConstantBuffer, VariableType::Dynamic)],
		);
		let layout = compile_layout(&desc)?;
		assert_eq!(layout.root_params().num_views(), 1);
		assert_eq!(layout.root_params().num_tables(), 0);
		assert_eq!(layout.total_slots(HeapType::CbvSrvUav, RootType::Dynamic), 0);
		assert_eq!(layout.total_root_views(RootType::Dynamic), 1);
		Ok(())
	}

	#[test]
	fn test_combined_sampler_assignment() -> anyhow::Result<()> {
		let mut desc = SignatureDesc::new(
			"",
			vec![
				res("g_Tex", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Mutable),
				res("g_Tex_sampler", ShaderStages::PIXEL, ResourceKind::Sampler, VariableType::Mutable),
				res("g_Tex", ShaderStages::VERTEX, ResourceKind::TextureSrv, VariableType::Dynamic),
				res("g_Tex_sampler", ShaderStages::VERTEX, ResourceKind::Sampler, VariableType::Dynamic),
			],
		);
		desc.use_combined_texture_samplers = true;
		let layout = compile_layout(&desc)?;
		assert_eq!(layout.attribs(0).assigned_sampler, Some(1));
		assert_eq!(layout.attribs(2).assigned_sampler, Some(3));
		assert_eq!(layout.attribs(1).assigned_sampler, None);
		Ok(())
	}

	#[test]
	fn test_unsorted() -> anyhow::Result<()> {
		let desc = SignatureDesc::new(
			"",
			vec![
				res("a", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Mutable),
				res("b", ShaderStages::PIXEL, ResourceKind::TextureSrv, VariableType::Static),
			],
		);
		assert!(matches!(
			compile_layout(&desc),
			Err(LayoutError::UnsortedResources { index: 1, .. })
		));
		Ok(())
	}
}
