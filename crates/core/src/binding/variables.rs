use crate::binding::{bind_resource, ResourceMapping};
use crate::cache::ResourceCache;
use crate::descriptor::{ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use crate::layout::CompiledLayout;
use crate::platform::BindingPlatform;

bitflags::bitflags! {
	/// Controls which variables [`bind_from_mapping`] touches.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct BindResourcesFlags: u32 {
		const UPDATE_STATIC = 0b1;
		const UPDATE_MUTABLE = 0b10;
		const UPDATE_DYNAMIC = 0b100;
		/// Elements that are already bound are left untouched.
		const KEEP_EXISTING = 0b1000;
		/// Report every element that is neither bound nor found in the mapping.
		const VERIFY_ALL_RESOLVED = 0b1_0000;

		const UPDATE_ALL = Self::UPDATE_STATIC.bits() | Self::UPDATE_MUTABLE.bits() | Self::UPDATE_DYNAMIC.bits();
	}
}

impl BindResourcesFlags {
	pub fn updates(&self, var_type: VariableType) -> bool {
		// no update flags at all means all of them
		let updates = match self.intersection(Self::UPDATE_ALL) {
			updates if updates.is_empty() => Self::UPDATE_ALL,
			updates => updates,
		};
		updates.contains(match var_type {
			VariableType::Static => Self::UPDATE_STATIC,
			VariableType::Mutable => Self::UPDATE_MUTABLE,
			VariableType::Dynamic => Self::UPDATE_DYNAMIC,
		})
	}
}

/// A bindable resource of a signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ShaderVariable {
	pub resource_index: usize,
	pub var_type: VariableType,
	pub kind: ResourceKind,
	pub stages: ShaderStages,
	pub array_size: u32,
}

/// The variables of a signature with one of the allowed [`VariableType`]s.
///
/// Samplers replaced by an immutable sampler are no variables. Neither are samplers in combined sampler mode, they are
/// bound through the texture views of their textures.
#[derive(Clone, Debug, Default)]
pub struct ShaderVariableManager {
	variables: Vec<ShaderVariable>,
}

impl ShaderVariableManager {
	pub fn new(desc: &SignatureDesc, layout: &CompiledLayout, allowed: &[VariableType]) -> Self {
		let variables = allowed
			.iter()
			.flat_map(|var_type| layout.variable_type_range(*var_type))
			.filter(|index| {
				let res = &desc.resources[*index];
				res.kind != ResourceKind::Sampler
					|| !(desc.use_combined_texture_samplers || layout.attribs(*index).is_immutable_sampler_assigned())
			})
			.map(|resource_index| {
				let res = &desc.resources[resource_index];
				ShaderVariable {
					resource_index,
					var_type: res.var_type,
					kind: res.kind,
					stages: res.stages,
					array_size: res.array_size,
				}
			})
			.collect();
		Self { variables }
	}

	pub fn len(&self) -> usize {
		self.variables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variables.is_empty()
	}

	pub fn variables(&self) -> &[ShaderVariable] {
		&self.variables
	}

	/// Variables visible from any of the `stages`.
	pub fn stage_variables(&self, stages: ShaderStages) -> impl Iterator<Item = &ShaderVariable> + '_ {
		self.variables.iter().filter(move |var| var.stages.intersects(stages))
	}

	/// Finds the variable called `name` visible from any of the `stages`.
	pub fn find(&self, desc: &SignatureDesc, stages: ShaderStages, name: &str) -> Option<&ShaderVariable> {
		self.stage_variables(stages)
			.find(|var| desc.resources[var.resource_index].name == name)
	}
}

/// Binds every element of the resources `indices` found in `mapping`. Refused binds are reported and skipped.
pub fn bind_from_mapping<P: BindingPlatform>(
	desc: &SignatureDesc,
	layout: &CompiledLayout,
	cache: &mut ResourceCache<P>,
	indices: impl IntoIterator<Item = usize>,
	mapping: &ResourceMapping<P>,
	flags: BindResourcesFlags,
) {
	for index in indices {
		let res: &ResourceDesc = &desc.resources[index];
		if !flags.updates(res.var_type) {
			continue;
		}
		let Some(coords) = layout.attribs(index).coordinates_for(cache.content_type()) else {
			continue;
		};
		for array_index in 0..res.array_size {
			let is_bound = cache.resource(coords.root_index, coords.offset + array_index).is_some();
			if is_bound && flags.contains(BindResourcesFlags::KEEP_EXISTING) {
				continue;
			}
			match mapping.get(&res.name, array_index) {
				Some(object) => {
					if let Err(err) = bind_resource(desc, layout, cache, index, array_index, Some(object.clone())) {
						log::error!("{}", err);
					}
				}
				None if !is_bound && flags.contains(BindResourcesFlags::VERIFY_ALL_RESOLVED) => {
					log::error!(
						"Unable to resolve {} variable \"{}\"[{}] of signature \"{}\": no object is mapped to it",
						res.var_type,
						res.name,
						array_index,
						desc.name
					);
				}
				None => (),
			}
		}
	}
}
