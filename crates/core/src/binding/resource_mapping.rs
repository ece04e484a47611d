use crate::cache::BoundObject;
use crate::platform::BindingPlatform;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};

/// Objects by variable name and array index, for binding many variables at once with
/// [`ShaderResourceBinding::bind_resources`].
///
/// [`ShaderResourceBinding::bind_resources`]: crate::binding::ShaderResourceBinding::bind_resources
pub struct ResourceMapping<P: BindingPlatform> {
	entries: FxHashMap<String, SmallVec<[Option<BoundObject<P>>; 1]>>,
}

impl<P: BindingPlatform> Default for ResourceMapping<P> {
	fn default() -> Self {
		Self {
			entries: FxHashMap::default(),
		}
	}
}

impl<P: BindingPlatform> ResourceMapping<P> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Maps element 0 of `name` to `object`.
	pub fn set(&mut self, name: impl Into<String>, object: BoundObject<P>) -> &mut Self {
		self.set_array(name, 0, [object])
	}

	/// Maps the elements starting at `first_element` of `name` to `objects`, keeping all other elements.
	pub fn set_array(
		&mut self,
		name: impl Into<String>,
		first_element: u32,
		objects: impl IntoIterator<Item = BoundObject<P>>,
	) -> &mut Self {
		let elements = self.entries.entry(name.into()).or_default();
		for (i, object) in objects.into_iter().enumerate() {
			let index = first_element as usize + i;
			if elements.len() <= index {
				elements.resize(index + 1, None);
			}
			elements[index] = Some(object);
		}
		self
	}

	pub fn remove(&mut self, name: &str, array_index: u32) -> Option<BoundObject<P>> {
		self.entries.get_mut(name)?.get_mut(array_index as usize)?.take()
	}

	pub fn get(&self, name: &str, array_index: u32) -> Option<&BoundObject<P>> {
		self.entries.get(name)?.get(array_index as usize)?.as_ref()
	}

	/// Number of mapped objects across all names.
	pub fn len(&self) -> usize {
		self.entries.values().flatten().filter(|object| object.is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

impl<P: BindingPlatform> Debug for ResourceMapping<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.entries.iter()).finish()
	}
}
