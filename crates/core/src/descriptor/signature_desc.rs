use crate::descriptor::{ImmutableSamplerDesc, ResourceDesc, ResourceFlags, ResourceKind, ShaderStages, VariableType};
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

/// The maximum number of signatures a pipeline may combine, limits [`SignatureDesc::binding_index`].
pub const MAX_SIGNATURES: u8 = 8;

/// The default suffix linking a sampler to its texture in combined sampler mode.
pub const DEFAULT_COMBINED_SAMPLER_SUFFIX: &str = "_sampler";

/// Describes all resources of a root signature.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SignatureDesc {
	pub name: String,
	/// Resources must be sorted by [`VariableType`], see [`Self::sort_by_variable_type`].
	pub resources: Vec<ResourceDesc>,
	pub immutable_samplers: Vec<ImmutableSamplerDesc>,
	/// Position of this signature within a pipeline combining multiple signatures.
	pub binding_index: u8,
	/// The register space fixed size resources are placed in. Runtime arrays use the spaces above it.
	pub base_register_space: u32,
	/// If true, texture SRVs are combined with the sampler named `texture name + combined_sampler_suffix`.
	pub use_combined_texture_samplers: bool,
	pub combined_sampler_suffix: String,
}

impl Default for SignatureDesc {
	fn default() -> Self {
		Self {
			name: String::new(),
			resources: Vec::new(),
			immutable_samplers: Vec::new(),
			binding_index: 0,
			base_register_space: 0,
			use_combined_texture_samplers: false,
			combined_sampler_suffix: DEFAULT_COMBINED_SAMPLER_SUFFIX.to_string(),
		}
	}
}

impl SignatureDesc {
	pub fn new(name: impl Into<String>, resources: Vec<ResourceDesc>) -> Self {
		Self {
			name: name.into(),
			resources,
			..Self::default()
		}
	}

	pub fn combined_sampler_suffix(&self) -> Option<&str> {
		self.use_combined_texture_samplers
			.then_some(self.combined_sampler_suffix.as_str())
	}

	/// Stable sort of resources by their [`VariableType`], keeping declaration order within each class.
	pub fn sort_by_variable_type(&mut self) {
		self.resources.sort_by_key(|res| res.var_type);
	}

	pub fn is_sorted_by_variable_type(&self) -> bool {
		self.resources.windows(2).all(|w| w[0].var_type <= w[1].var_type)
	}

	/// Finds the sampler resource assigned to the texture SRV `texture` in combined sampler mode.
	///
	/// The search is limited to `candidates`, which should be the resource range of the texture's [`VariableType`].
	pub fn find_assigned_sampler(&self, texture: &ResourceDesc, candidates: std::ops::Range<usize>) -> Option<usize> {
		let suffix = self.combined_sampler_suffix()?;
		candidates.into_iter().find(|&i| {
			let res = &self.resources[i];
			res.kind == ResourceKind::Sampler
				&& res.stages.intersects(texture.stages)
				&& res
					.name
					.strip_prefix(texture.name.as_str())
					.is_some_and(|rest| rest == suffix)
		})
	}

	/// Finds the immutable sampler applying to the sampler resource `sampler`.
	pub fn find_immutable_sampler(&self, sampler: &ResourceDesc) -> Option<usize> {
		let suffix = self.combined_sampler_suffix();
		self.immutable_samplers
			.iter()
			.position(|imtbl| imtbl.matches(sampler.stages, &sampler.name, suffix))
	}

	/// Verifies the description is well-formed. Does not require resources to be sorted.
	pub fn validate(&self) -> Result<(), DescError> {
		if self.binding_index >= MAX_SIGNATURES {
			return Err(DescError::BindingIndexOutOfRange {
				binding_index: self.binding_index,
			});
		}
		if self.use_combined_texture_samplers && self.combined_sampler_suffix.is_empty() {
			return Err(DescError::EmptyCombinedSamplerSuffix);
		}

		let mut used_stages = FxHashMap::<&str, ShaderStages>::default();
		for (index, res) in self.resources.iter().enumerate() {
			if res.name.is_empty() {
				return Err(DescError::EmptyResourceName { index });
			}
			if res.stages.is_empty() {
				return Err(DescError::NoShaderStages { name: res.name.clone() });
			}
			if res.array_size == 0 {
				return Err(DescError::ZeroArraySize { name: res.name.clone() });
			}

			let used = used_stages.entry(res.name.as_str()).or_default();
			if used.intersects(res.stages) {
				return Err(DescError::OverlappingStages {
					name: res.name.clone(),
					stages: *used & res.stages,
				});
			}
			*used |= res.stages;

			let allowed = res.kind.allowed_flags();
			if !allowed.contains(res.flags) {
				return Err(DescError::InvalidFlags {
					name: res.name.clone(),
					kind: res.kind,
					flags: res.flags,
					allowed,
				});
			}
			if res.flags.contains(ResourceFlags::COMBINED_SAMPLER) && !self.use_combined_texture_samplers {
				return Err(DescError::CombinedSamplerFlagWithoutCombinedSamplers { name: res.name.clone() });
			}
		}

		if let Some(suffix) = self.combined_sampler_suffix() {
			for tex in self.resources.iter().filter(|res| res.kind == ResourceKind::TextureSrv) {
				let sampler = self.resources.iter().find(|sam| {
					sam.kind == ResourceKind::Sampler
						&& sam.stages.intersects(tex.stages)
						&& sam
							.name
							.strip_prefix(tex.name.as_str())
							.is_some_and(|rest| rest == suffix)
				});
				if let Some(sam) = sampler {
					if sam.stages != tex.stages {
						return Err(DescError::CombinedSamplerStageMismatch {
							texture: tex.name.clone(),
							sampler: sam.name.clone(),
						});
					}
					if sam.var_type != tex.var_type {
						return Err(DescError::CombinedSamplerVariableTypeMismatch {
							texture: tex.name.clone(),
							texture_type: tex.var_type,
							sampler: sam.name.clone(),
							sampler_type: sam.var_type,
						});
					}
					if sam.array_size != 1 && sam.array_size != tex.array_size {
						return Err(DescError::CombinedSamplerArraySizeMismatch {
							texture: tex.name.clone(),
							texture_size: tex.array_size,
							sampler: sam.name.clone(),
							sampler_size: sam.array_size,
						});
					}
				}
			}
		}

		let mut used_stages = FxHashMap::<&str, ShaderStages>::default();
		for (index, imtbl) in self.immutable_samplers.iter().enumerate() {
			if imtbl.sampler_or_texture_name.is_empty() {
				return Err(DescError::EmptyImmutableSamplerName { index });
			}
			let used = used_stages.entry(imtbl.sampler_or_texture_name.as_str()).or_default();
			if used.intersects(imtbl.stages) {
				return Err(DescError::OverlappingImmutableSamplerStages {
					name: imtbl.sampler_or_texture_name.clone(),
					stages: *used & imtbl.stages,
				});
			}
			*used |= imtbl.stages;
		}
		Ok(())
	}
}

/// A malformed [`SignatureDesc`]. This is a programming error of whoever produced the description.
#[derive(Error)]
#[non_exhaustive]
pub enum DescError {
	#[error("Binding index {binding_index} exceeds the maximum allowed value {}", MAX_SIGNATURES - 1)]
	BindingIndexOutOfRange { binding_index: u8 },
	#[error("Combined texture samplers are used, but the combined sampler suffix is empty")]
	EmptyCombinedSamplerSuffix,
	#[error("Name of resource {index} must not be empty")]
	EmptyResourceName { index: usize },
	#[error("Resource \"{name}\" must be visible from at least one shader stage")]
	NoShaderStages { name: String },
	#[error("Resource \"{name}\" has an array size of 0")]
	ZeroArraySize { name: String },
	#[error(
		"Multiple resources named \"{name}\" use overlapping shader stages {stages:?}. Resources with the same name must use distinct stages."
	)]
	OverlappingStages { name: String, stages: ShaderStages },
	#[error("Resource \"{name}\" of kind {kind} has flags {flags:?}, but only {allowed:?} are allowed")]
	InvalidFlags {
		name: String,
		kind: ResourceKind,
		flags: ResourceFlags,
		allowed: ResourceFlags,
	},
	#[error("Texture \"{name}\" is flagged COMBINED_SAMPLER, but the signature does not use combined texture samplers")]
	CombinedSamplerFlagWithoutCombinedSamplers { name: String },
	#[error("Texture \"{texture}\" and sampler \"{sampler}\" assigned to it use different shader stages")]
	CombinedSamplerStageMismatch { texture: String, sampler: String },
	#[error(
		"The type ({texture_type}) of texture \"{texture}\" does not match the type ({sampler_type}) of sampler \"{sampler}\" that is assigned to it"
	)]
	CombinedSamplerVariableTypeMismatch {
		texture: String,
		texture_type: VariableType,
		sampler: String,
		sampler_type: VariableType,
	},
	#[error(
		"Sampler \"{sampler}\" with array size {sampler_size} can not be assigned to texture \"{texture}\" with array size {texture_size}, it must either be 1 or match"
	)]
	CombinedSamplerArraySizeMismatch {
		texture: String,
		texture_size: u32,
		sampler: String,
		sampler_size: u32,
	},
	#[error("Name of immutable sampler {index} must not be empty")]
	EmptyImmutableSamplerName { index: usize },
	#[error("Multiple immutable samplers named \"{name}\" use overlapping shader stages {stages:?}")]
	OverlappingImmutableSamplerStages { name: String, stages: ShaderStages },
}

impl Debug for DescError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}
