use crate::binding::{
	bind_from_mapping, bind_resource, write_binding, BindError, BindResourcesFlags, ResourceMapping,
	ShaderResourceBinding,
};
use crate::cache::{BoundObject, CacheInitError, ResourceCache};
use crate::descriptor::{ShaderStages, SignatureDesc, VariableType};
use crate::layout::{compile_layout, CacheContentType, CacheCoordinates, CompiledLayout, LayoutError};
use crate::platform::BindingPlatform;
use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::ops::Range;
use std::sync::Arc;

/// A compiled [`SignatureDesc`] together with the static resources shared by all of its binding objects.
///
/// The description and layout never change after construction. Static resources are bound on the signature and copied
/// into every binding object by [`ShaderResourceBinding::initialize_static_resources`].
pub struct RootSignature<P: BindingPlatform> {
	platform: Arc<P>,
	desc: SignatureDesc,
	layout: CompiledLayout,
	static_cache: RwLock<ResourceCache<P>>,
	names: FxHashMap<String, SmallVec<[usize; 2]>>,
}

impl<P: BindingPlatform> RootSignature<P> {
	pub fn new(platform: Arc<P>, desc: SignatureDesc) -> Result<Arc<Self>, LayoutError> {
		let layout = compile_layout(&desc)?;
		let static_cache = ResourceCache::new(
			platform.clone(),
			CacheContentType::Signature,
			&layout.cache_table_sizes(CacheContentType::Signature),
		);
		let mut names = FxHashMap::<String, SmallVec<[usize; 2]>>::default();
		for (index, res) in desc.resources.iter().enumerate() {
			names.entry(res.name.clone()).or_default().push(index);
		}
		Ok(Arc::new(Self {
			platform,
			desc,
			layout,
			static_cache: RwLock::new(static_cache),
			names,
		}))
	}

	pub fn platform(&self) -> &Arc<P> {
		&self.platform
	}

	pub fn name(&self) -> &str {
		&self.desc.name
	}

	pub fn desc(&self) -> &SignatureDesc {
		&self.desc
	}

	pub fn layout(&self) -> &CompiledLayout {
		&self.layout
	}

	pub fn resource_count(&self) -> usize {
		self.desc.resources.len()
	}

	pub fn variable_type_range(&self, var_type: VariableType) -> Range<usize> {
		self.layout.variable_type_range(var_type)
	}

	pub fn hash(&self) -> u64 {
		self.layout.hash()
	}

	/// Finds the resource called `name` visible from any of the `stages`.
	pub fn find_resource(&self, stages: ShaderStages, name: &str) -> Option<usize> {
		self.names
			.get(name)?
			.iter()
			.copied()
			.find(|index| self.desc.resources[*index].stages.intersects(stages))
	}

	/// The resource and array element occupying `offset` of the table `root_index` in a cache of `content_type`.
	pub fn resource_at(&self, content_type: CacheContentType, root_index: u32, offset: u32) -> Option<(usize, u32)> {
		self.layout
			.all_attribs()
			.iter()
			.enumerate()
			.find_map(|(index, attribs)| {
				let coords = attribs.coordinates_for(content_type)?;
				let array_size = self.desc.resources[index].array_size;
				(coords.root_index == root_index && (coords.offset..coords.offset + array_size).contains(&offset))
					.then(|| (index, offset - coords.offset))
			})
	}

	/// Whether binding objects of `other` may be used with this signature: identical layouts and resources that only
	/// differ by name.
	pub fn is_compatible_with(&self, other: &Self) -> bool {
		if std::ptr::eq(self, other) {
			return true;
		}
		self.hash() == other.hash()
			&& self.desc.binding_index == other.desc.binding_index
			&& self.layout.root_params() == other.layout.root_params()
			&& self.desc.resources.len() == other.desc.resources.len()
			&& self.desc.immutable_samplers == other.desc.immutable_samplers
			&& self
				.desc
				.resources
				.iter()
				.zip(&other.desc.resources)
				.all(|(a, b)| a.is_compatible_with(b))
			&& self
				.layout
				.all_attribs()
				.iter()
				.zip(other.layout.all_attribs())
				.all(|(a, b)| a.is_compatible_with(b))
	}

	/// Read access to the static resources bound on this signature.
	pub fn static_cache(&self) -> RwLockReadGuard<'_, ResourceCache<P>> {
		self.static_cache.read()
	}

	/// Binds a static resource, see [`bind_resource`] for the rules.
	pub fn bind_static(
		&self,
		resource_index: usize,
		array_index: u32,
		object: Option<BoundObject<P>>,
	) -> Result<(), BindError> {
		let mut cache = self.static_cache.write();
		bind_resource(&self.desc, &self.layout, &mut cache, resource_index, array_index, object)
	}

	/// Binds the static variable `name` visible from any of the `stages`.
	pub fn set_static(&self, stages: ShaderStages, name: &str, object: Option<BoundObject<P>>) -> Result<(), BindError> {
		let index = self
			.find_resource(stages, name)
			.filter(|index| self.desc.resources[*index].var_type == VariableType::Static)
			.ok_or_else(|| BindError::VariableNotFound { name: name.to_string() })?;
		self.bind_static(index, 0, object)
	}

	/// Binds all static resources visible from any of the `stages` found in `mapping`.
	pub fn bind_static_resources(&self, stages: ShaderStages, mapping: &ResourceMapping<P>, flags: BindResourcesFlags) {
		let indices = self
			.variable_type_range(VariableType::Static)
			.filter(|index| self.desc.resources[*index].stages.intersects(stages));
		let mut cache = self.static_cache.write();
		bind_from_mapping(
			&self.desc,
			&self.layout,
			&mut cache,
			indices,
			mapping,
			flags | BindResourcesFlags::UPDATE_STATIC,
		);
	}

	/// Copies every static resource into `dst`, a binding cache of this signature. Unbound static resources are reported.
	pub fn copy_static_resources(&self, dst: &mut ResourceCache<P>) {
		assert_eq!(dst.content_type(), CacheContentType::Binding);
		let src = self.static_cache.read();
		for index in self.variable_type_range(VariableType::Static) {
			let res = &self.desc.resources[index];
			let attribs = self.layout.attribs(index);
			let (Some(src_coords), Some(dst_coords)) = (attribs.signature, attribs.binding) else {
				continue;
			};
			for array_index in 0..res.array_size {
				let binding = src.resource(src_coords.root_index, src_coords.offset + array_index);
				if binding.is_none() {
					if !res.is_runtime_array() {
						log::error!(
							"No resource is bound to static variable \"{}\"[{}] of signature \"{}\"",
							res.name,
							array_index,
							self.desc.name
						);
					}
					continue;
				}
				let coords = CacheCoordinates {
					root_index: dst_coords.root_index,
					offset: dst_coords.offset + array_index,
				};
				let already_copied = match (dst.resource(coords.root_index, coords.offset), binding) {
					(Some(existing), Some(binding)) => existing.object.ptr_eq(&binding.object),
					_ => false,
				};
				if !already_copied {
					write_binding(dst, res.kind, coords, binding.cloned());
				}
			}
		}
	}

	/// Creates a new binding object, optionally copying the static resources into it right away.
	pub fn create_binding(self: &Arc<Self>, init_static: bool) -> Result<ShaderResourceBinding<P>, CacheInitError<P>> {
		let mut srb = ShaderResourceBinding::new(self.clone())?;
		if init_static {
			srb.initialize_static_resources();
		}
		Ok(srb)
	}

	/// Copies the static resources of this signature into `srb`.
	pub fn initialize_static_srb_resources(&self, srb: &mut ShaderResourceBinding<P>) {
		assert!(
			self.is_compatible_with(srb.signature()),
			"Binding object of signature \"{}\" is not compatible with signature \"{}\"",
			srb.signature().name(),
			self.name()
		);
		srb.initialize_static_resources_from(self);
	}
}
