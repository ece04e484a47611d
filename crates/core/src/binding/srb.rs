use crate::binding::{
	bind_from_mapping, bind_resource, BindError, BindResourcesFlags, ResourceMapping, RootSignature, ShaderVariable,
	ShaderVariableManager,
};
use crate::cache::{BoundObject, CacheInitError, ResourceCache};
use crate::descriptor::{ShaderStages, VariableType};
use crate::layout::CacheContentType;
use crate::pipeline::{commit_shader_resources, CommitError, CommitOptions};
use crate::platform::{BindingPlatform, CommandSink};
use std::sync::Arc;

/// The mutable and dynamic bindings for one use of a [`RootSignature`], plus a copy of its static bindings.
///
/// Owns shader visible descriptors for all static and mutable tables, which are released on drop.
pub struct ShaderResourceBinding<P: BindingPlatform> {
	signature: Arc<RootSignature<P>>,
	cache: ResourceCache<P>,
	variables: ShaderVariableManager,
	static_resources_initialized: bool,
}

impl<P: BindingPlatform> ShaderResourceBinding<P> {
	pub fn new(signature: Arc<RootSignature<P>>) -> Result<Self, CacheInitError<P>> {
		let cache = ResourceCache::for_layout(
			signature.platform().clone(),
			CacheContentType::Binding,
			signature.layout(),
		)?;
		let variables = ShaderVariableManager::new(
			signature.desc(),
			signature.layout(),
			&[VariableType::Mutable, VariableType::Dynamic],
		);
		Ok(Self {
			signature,
			cache,
			variables,
			static_resources_initialized: false,
		})
	}

	pub fn signature(&self) -> &Arc<RootSignature<P>> {
		&self.signature
	}

	pub fn cache(&self) -> &ResourceCache<P> {
		&self.cache
	}

	pub fn variables(&self) -> &ShaderVariableManager {
		&self.variables
	}

	/// Finds the mutable or dynamic variable `name` visible from any of the `stages`.
	pub fn variable(&self, stages: ShaderStages, name: &str) -> Option<&ShaderVariable> {
		self.variables.find(self.signature.desc(), stages, name)
	}

	/// Binds element `array_index` of the mutable or dynamic resource `resource_index`, see [`bind_resource`] for the
	/// rules. Static resources are bound on the signature and copied in by [`Self::initialize_static_resources`].
	pub fn bind(&mut self, resource_index: usize, array_index: u32, object: Option<BoundObject<P>>) -> Result<(), BindError> {
		if self.signature.variable_type_range(VariableType::Static).contains(&resource_index) {
			return Err(BindError::StaticThroughBinding {
				name: self.signature.desc().resources[resource_index].name.clone(),
			});
		}
		bind_resource(
			self.signature.desc(),
			self.signature.layout(),
			&mut self.cache,
			resource_index,
			array_index,
			object,
		)
	}

	/// Binds element 0 of the variable `name` visible from any of the `stages`.
	pub fn set(&mut self, stages: ShaderStages, name: &str, object: Option<BoundObject<P>>) -> Result<(), BindError> {
		self.set_array(stages, name, 0, [object])
	}

	/// Binds consecutive elements of the variable `name` starting at `first_element`. Stops at the first refused element.
	pub fn set_array(
		&mut self,
		stages: ShaderStages,
		name: &str,
		first_element: u32,
		objects: impl IntoIterator<Item = Option<BoundObject<P>>>,
	) -> Result<(), BindError> {
		let resource_index = self
			.variable(stages, name)
			.ok_or_else(|| BindError::VariableNotFound { name: name.to_string() })?
			.resource_index;
		for (i, object) in objects.into_iter().enumerate() {
			self.bind(resource_index, first_element + i as u32, object)?;
		}
		Ok(())
	}

	pub fn is_bound(&self, resource_index: usize, array_index: u32) -> bool {
		self.signature
			.layout()
			.attribs(resource_index)
			.binding
			.and_then(|coords| self.cache.resource(coords.root_index, coords.offset + array_index))
			.is_some()
	}

	/// Binds all mutable and dynamic variables visible from any of the `stages` found in `mapping`.
	pub fn bind_resources(&mut self, stages: ShaderStages, mapping: &ResourceMapping<P>, flags: BindResourcesFlags) {
		let indices = self
			.variables
			.stage_variables(stages)
			.map(|var| var.resource_index)
			.collect::<Vec<_>>();
		bind_from_mapping(
			self.signature.desc(),
			self.signature.layout(),
			&mut self.cache,
			indices,
			mapping,
			flags,
		);
	}

	pub fn static_resources_initialized(&self) -> bool {
		self.static_resources_initialized
	}

	/// Copies the static resources bound on the signature into this binding object. Only the first call has an effect.
	pub fn initialize_static_resources(&mut self) {
		let signature = self.signature.clone();
		self.initialize_static_resources_from(&signature);
	}

	pub(crate) fn initialize_static_resources_from(&mut self, signature: &RootSignature<P>) {
		if self.static_resources_initialized {
			log::warn!(
				"Static resources of a binding object of signature \"{}\" have already been initialized",
				signature.name()
			);
			return;
		}
		signature.copy_static_resources(&mut self.cache);
		self.static_resources_initialized = true;
	}

	/// Transitions and binds all resources, see [`commit_shader_resources`].
	pub fn commit(&self, sink: &mut impl CommandSink<P>, options: CommitOptions) -> Result<(), CommitError<P>> {
		if !self.static_resources_initialized && !self.signature.variable_type_range(VariableType::Static).is_empty() {
			log::error!(
				"Committing a binding object of signature \"{}\" whose static resources were never initialized",
				self.signature.name()
			);
		}
		commit_shader_resources(&self.signature, &self.cache, sink, options)
	}
}
