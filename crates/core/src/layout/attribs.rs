/// Which flavor of resource cache a set of [`CacheCoordinates`] refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CacheContentType {
	/// The small cache owned by a signature, holding only static resources in one table per range type.
	Signature,
	/// The cache owned by a binding object, mirroring the compiled root parameters.
	Binding,
}

/// Location of a resource's first array element within a resource cache.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheCoordinates {
	pub root_index: u32,
	pub offset: u32,
}

/// Compiled binding location of a single resource.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResourceAttribs {
	pub register: u32,
	pub space: u32,
	/// Index of the sampler resource combined with this texture SRV.
	pub assigned_sampler: Option<u32>,
	/// Index of the immutable sampler this sampler resource was replaced with.
	pub immutable_sampler: Option<u32>,
	/// Location in a binding object's cache. None if an immutable sampler is assigned.
	pub binding: Option<CacheCoordinates>,
	/// Location in the signature's static cache. Only static resources have one.
	pub signature: Option<CacheCoordinates>,
	pub is_root_view: bool,
}

impl ResourceAttribs {
	/// Selects the coordinates this resource has within a cache of `content_type`.
	pub fn coordinates_for(&self, content_type: CacheContentType) -> Option<CacheCoordinates> {
		match content_type {
			CacheContentType::Signature => self.signature,
			CacheContentType::Binding => self.binding,
		}
	}

	pub fn is_immutable_sampler_assigned(&self) -> bool {
		self.immutable_sampler.is_some()
	}

	/// Compares everything a binding object relies on. The static cache location is private to each signature.
	pub fn is_compatible_with(&self, other: &Self) -> bool {
		self.register == other.register
			&& self.space == other.space
			&& self.binding == other.binding
			&& self.is_immutable_sampler_assigned() == other.is_immutable_sampler_assigned()
			&& self.is_root_view == other.is_root_view
	}
}

/// Register assignment of an immutable sampler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImmutableSamplerAttribs {
	pub register: u32,
	pub space: u32,
	pub array_size: u32,
}
