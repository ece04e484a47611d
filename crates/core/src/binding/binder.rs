use crate::cache::{BoundObject, CachedBinding, ResourceCache};
use crate::descriptor::{ResourceDesc, ResourceFlags, ResourceKind, SignatureDesc, VariableType};
use crate::layout::{CacheContentType, CacheCoordinates, CompiledLayout, RangeType, ResourceAttribs};
use crate::platform::{
	BindingPlatform, BufferBindFlags, BufferObject, BufferUsage, BufferViewObject, BufferViewType, StateTracked,
	TextureViewObject, TextureViewType,
};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// A bind that was refused. The cache is left exactly as it was before.
#[derive(Error)]
#[non_exhaustive]
pub enum BindError {
	#[error("Resource index {index} is out of range, the signature only has {count} resources")]
	ResourceIndexOutOfRange { index: usize, count: usize },
	#[error("Array index {array_index} is out of range for \"{name}\" of array size {array_size}")]
	ArrayIndexOutOfRange {
		name: String,
		array_index: u32,
		array_size: u32,
	},
	#[error("Sampler \"{name}\" is replaced by an immutable sampler and can not be bound")]
	ImmutableSampler { name: String },
	#[error("{var_type} resource \"{name}\" has no slot in a {content_type:?} cache")]
	NoCacheSlot {
		name: String,
		var_type: VariableType,
		content_type: CacheContentType,
	},
	#[error("Can not bind a {object} to {kind} \"{name}\"")]
	UnexpectedObject {
		name: String,
		kind: ResourceKind,
		object: &'static str,
	},
	#[error("{kind} \"{name}\" requires a {expected} view, but a {actual} view was given")]
	WrongViewType {
		name: String,
		kind: ResourceKind,
		expected: String,
		actual: String,
	},
	#[error("Buffer '{buffer}' bound to {kind} \"{name}\" was not created with bind flags {required:?}")]
	MissingBufferBindFlags {
		name: String,
		kind: ResourceKind,
		buffer: String,
		required: BufferBindFlags,
	},
	#[error(
		"Dynamic buffer '{buffer}' can not be bound to {kind} \"{name}\", which is either flagged NO_DYNAMIC_BUFFERS or not a root view"
	)]
	DynamicBufferNotAllowed {
		name: String,
		kind: ResourceKind,
		buffer: String,
	},
	#[error("View of buffer '{buffer}' does not match the access mode of {kind} \"{name}\", formatted: {formatted}")]
	BufferModeMismatch {
		name: String,
		kind: ResourceKind,
		buffer: String,
		formatted: bool,
	},
	#[error(
		"Non-dynamic variable \"{name}\"[{array_index}] already holds '{bound}', rebinding it to '{new}' is not allowed. Use a dynamic variable if the binding changes."
	)]
	NonDynamicRebind {
		name: String,
		array_index: u32,
		bound: String,
		new: String,
	},
	#[error("No variable named \"{name}\" exists")]
	VariableNotFound { name: String },
	#[error("Static resource \"{name}\" must be bound on the signature, not on a binding object")]
	StaticThroughBinding { name: String },
}

impl Debug for BindError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

/// Binds `object` to element `array_index` of the resource `resource_index`, or clears the element if `object` is None.
///
/// Non-dynamic slots may only be bound once: binding a different object to an occupied non-dynamic slot is refused,
/// rebinding the same object is a no-op. Clearing an occupied non-dynamic slot succeeds, but is reported. If the slot has
/// a shader visible descriptor, the object's descriptor is copied into it immediately.
///
/// In combined sampler mode, binding a texture SRV also binds the sampler of the texture view to the texture's assigned
/// sampler. Failing to do so is reported, but does not fail the texture's bind.
pub fn bind_resource<P: BindingPlatform>(
	desc: &SignatureDesc,
	layout: &CompiledLayout,
	cache: &mut ResourceCache<P>,
	resource_index: usize,
	array_index: u32,
	object: Option<BoundObject<P>>,
) -> Result<(), BindError> {
	let res = desc
		.resources
		.get(resource_index)
		.ok_or(BindError::ResourceIndexOutOfRange {
			index: resource_index,
			count: desc.resources.len(),
		})?;
	if array_index >= res.array_size {
		return Err(BindError::ArrayIndexOutOfRange {
			name: res.name.clone(),
			array_index,
			array_size: res.array_size,
		});
	}
	let attribs = layout.attribs(resource_index);
	if attribs.is_immutable_sampler_assigned() {
		return Err(BindError::ImmutableSampler { name: res.name.clone() });
	}
	let coords = attribs
		.coordinates_for(cache.content_type())
		.ok_or_else(|| BindError::NoCacheSlot {
			name: res.name.clone(),
			var_type: res.var_type,
			content_type: cache.content_type(),
		})?;
	let coords = CacheCoordinates {
		root_index: coords.root_index,
		offset: coords.offset + array_index,
	};

	if let Some(object) = &object {
		check_object(res, attribs, object)?;
	}

	match (cache.resource(coords.root_index, coords.offset), &object) {
		(Some(bound), Some(new)) if bound.object.ptr_eq(new) => return Ok(()),
		(Some(bound), Some(new)) if res.var_type != VariableType::Dynamic => {
			return Err(BindError::NonDynamicRebind {
				name: res.name.clone(),
				array_index,
				bound: bound.object.name().to_string(),
				new: new.name().to_string(),
			});
		}
		(Some(bound), None) if res.var_type != VariableType::Dynamic => {
			log::warn!(
				"Clearing non-dynamic variable \"{}\"[{}] holding '{}' of signature \"{}\", which is likely unintended",
				res.name,
				array_index,
				bound.object.name(),
				desc.name
			);
		}
		(None, None) => return Ok(()),
		_ => (),
	}

	let sampler = match (&object, attribs.assigned_sampler) {
		(Some(BoundObject::TextureView(view)), Some(sampler_index)) => Some((view.clone(), sampler_index as usize)),
		_ => None,
	};

	let binding = object.map(|object| CachedBinding {
		kind: res.kind,
		cpu_handle: if attribs.is_root_view {
			None
		} else {
			object.cpu_handle()
		},
		object,
	});
	write_binding(cache, res.kind, coords, binding);

	if let Some((view, sampler_index)) = sampler {
		bind_assigned_sampler(desc, layout, cache, res, array_index, &view, sampler_index);
	}
	Ok(())
}

/// Stores `binding` in the cache, copying its descriptor to the shader visible heap if the slot has a descriptor there.
/// Performs no checks.
pub(crate) fn write_binding<P: BindingPlatform>(
	cache: &mut ResourceCache<P>,
	kind: ResourceKind,
	coords: CacheCoordinates,
	binding: Option<CachedBinding<P>>,
) {
	let heap_type = RangeType::from_resource_kind(kind).heap_type();
	if let Some(src) = binding.as_ref().and_then(|binding| binding.cpu_handle) {
		if let Some(dst) = cache.shader_visible_cpu_handle(heap_type, coords.root_index, coords.offset) {
			// Safety: dst was reserved by this cache, src is kept alive by the binding
			unsafe { cache.platform().copy_descriptors(dst, src, 1, heap_type) }
		}
	}
	cache.set_resource(coords.root_index, coords.offset, binding);
}

fn bind_assigned_sampler<P: BindingPlatform>(
	desc: &SignatureDesc,
	layout: &CompiledLayout,
	cache: &mut ResourceCache<P>,
	texture: &ResourceDesc,
	array_index: u32,
	view: &Arc<P::TextureView>,
	sampler_index: usize,
) {
	let sampler_res = &desc.resources[sampler_index];
	if layout.attribs(sampler_index).is_immutable_sampler_assigned() {
		return;
	}
	let Some(sampler) = view.sampler() else {
		log::error!(
			"Texture view of '{}' bound to \"{}\" has no sampler, but sampler \"{}\" is assigned to it",
			view.texture().name(),
			texture.name,
			sampler_res.name
		);
		return;
	};
	let sampler_array_index = if sampler_res.array_size == 1 { 0 } else { array_index };
	let result = bind_resource(
		desc,
		layout,
		cache,
		sampler_index,
		sampler_array_index,
		Some(BoundObject::Sampler(sampler.clone())),
	);
	if let Err(err) = result {
		log::error!(
			"Failed to bind the sampler of texture \"{}\"[{}]: {}",
			texture.name,
			array_index,
			err
		);
	}
}

fn check_object<P: BindingPlatform>(
	res: &ResourceDesc,
	attribs: &ResourceAttribs,
	object: &BoundObject<P>,
) -> Result<(), BindError> {
	let check_buffer = |buffer: &P::Buffer, required: BufferBindFlags| {
		if !buffer.bind_flags().contains(required) {
			return Err(BindError::MissingBufferBindFlags {
				name: res.name.clone(),
				kind: res.kind,
				buffer: buffer.name().to_string(),
				required,
			});
		}
		let is_dynamic = buffer.usage() == BufferUsage::Dynamic;
		let dynamic_allowed = !res.flags.contains(ResourceFlags::NO_DYNAMIC_BUFFERS)
			&& (res.kind != ResourceKind::ConstantBuffer || attribs.is_root_view);
		if is_dynamic && !dynamic_allowed {
			return Err(BindError::DynamicBufferNotAllowed {
				name: res.name.clone(),
				kind: res.kind,
				buffer: buffer.name().to_string(),
			});
		}
		Ok(())
	};
	let wrong_view = |expected: &dyn Debug, actual: &dyn Debug| BindError::WrongViewType {
		name: res.name.clone(),
		kind: res.kind,
		expected: format!("{:?}", expected),
		actual: format!("{:?}", actual),
	};

	match (res.kind, object) {
		(ResourceKind::ConstantBuffer, BoundObject::Buffer(buffer)) => {
			check_buffer(&**buffer, BufferBindFlags::UNIFORM_BUFFER)
		}
		(ResourceKind::TextureSrv | ResourceKind::TextureUav, BoundObject::TextureView(view)) => {
			let expected = match res.kind {
				ResourceKind::TextureSrv => TextureViewType::ShaderResource,
				_ => TextureViewType::UnorderedAccess,
			};
			if view.view_type() != expected {
				return Err(wrong_view(&expected, &view.view_type()));
			}
			Ok(())
		}
		(ResourceKind::BufferSrv | ResourceKind::BufferUav, BoundObject::BufferView(view)) => {
			let (expected, required) = match res.kind {
				ResourceKind::BufferSrv => (BufferViewType::ShaderResource, BufferBindFlags::SHADER_RESOURCE),
				_ => (BufferViewType::UnorderedAccess, BufferBindFlags::UNORDERED_ACCESS),
			};
			if view.view_type() != expected {
				return Err(wrong_view(&expected, &view.view_type()));
			}
			let formatted = res.flags.contains(ResourceFlags::FORMATTED_BUFFER);
			if view.is_formatted() != formatted {
				return Err(BindError::BufferModeMismatch {
					name: res.name.clone(),
					kind: res.kind,
					buffer: view.buffer().name().to_string(),
					formatted,
				});
			}
			check_buffer(&**view.buffer(), required)
		}
		(ResourceKind::Sampler, BoundObject::Sampler(_)) | (ResourceKind::AccelStruct, BoundObject::AccelStruct(_)) => {
			Ok(())
		}
		_ => Err(BindError::UnexpectedObject {
			name: res.name.clone(),
			kind: res.kind,
			object: object.type_name(),
		}),
	}
}
