#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::{BindError, BindResourcesFlags, ResourceMapping, RootSignature};
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use gpu_root_binding::layout::CacheContentType;
use gpu_root_binding::pipeline::{CommitOptions, ResourceState};
use gpu_root_binding::platform::soft::{SoftCommandList, SoftCreateInfo, SoftDescriptor};
use gpu_root_binding::platform::TextureViewType;

fn desc() -> SignatureDesc {
	SignatureDesc::new(
		"static resources",
		vec![
			ResourceDesc::new("s_Environment", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Static),
			ResourceDesc::new("s_Lut", ShaderStages::PIXEL, 2, ResourceKind::TextureSrv, VariableType::Static),
			ResourceDesc::new("m_Albedo", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
		],
	)
}

#[test]
fn test_static_resources_copied_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), desc())?;
	let layout = signature.layout();

	// static resources have a slot in both caches, mutable ones only in binding caches
	let environment = layout.attribs(0);
	let albedo = layout.attribs(2);
	assert!(environment.coordinates_for(CacheContentType::Signature).is_some());
	assert!(environment.coordinates_for(CacheContentType::Binding).is_some());
	assert!(albedo.coordinates_for(CacheContentType::Signature).is_none());
	assert_eq!(
		environment.binding.unwrap().root_index,
		albedo.binding.unwrap().root_index,
	);

	let view = |name: &str| -> anyhow::Result<BoundObject> {
		let texture = platform.create_texture(name, ResourceState::SHADER_RESOURCE);
		Ok(BoundObject::TextureView(platform.create_texture_view(
			&texture,
			TextureViewType::ShaderResource,
			None,
		)?))
	};
	let env = view("environment")?;
	let lut = [view("lut0")?, view("lut1")?];

	let mut mapping = ResourceMapping::new();
	mapping
		.set("s_Environment", env.clone())
		.set_array("s_Lut", 0, lut.iter().cloned())
		.set("m_Albedo", view("albedo")?);
	signature.bind_static_resources(ShaderStages::PIXEL, &mapping, BindResourcesFlags::empty());
	assert_eq!(signature.static_cache().bound_resources().count(), 3);

	// the signature cache has no room for mutable variables
	assert!(matches!(
		signature.bind_static(2, 0, Some(env.clone())),
		Err(BindError::NoCacheSlot {
			content_type: CacheContentType::Signature,
			..
		})
	));

	let mut srb = signature.create_binding(true)?;
	assert!(srb.static_resources_initialized());
	assert!(srb.is_bound(0, 0));
	assert!(srb.is_bound(1, 1));
	assert!(!srb.is_bound(2, 0));

	let root_index = environment.binding.unwrap().root_index;
	let env_offset = environment.binding.unwrap().offset;
	let handle = srb
		.cache()
		.shader_visible_gpu_handle(gpu_root_binding::descriptor::HeapType::CbvSrvUav, root_index, env_offset)
		.unwrap();
	let BoundObject::TextureView(env_view) = &env else {
		unreachable!()
	};
	assert_eq!(platform.gpu_descriptor_at(handle), Some(SoftDescriptor(env_view.id())));

	// static variables can not be changed through the binding object
	let other = view("other")?;
	assert!(matches!(
		srb.bind(0, 0, Some(other)),
		Err(BindError::StaticThroughBinding { .. })
	));

	srb.set(ShaderStages::PIXEL, "m_Albedo", Some(view("albedo")?))?;
	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(&mut cmd, CommitOptions::default())?;
	assert_eq!(cmd.root_tables().count(), 1);
	assert_eq!(cmd.transitions().count(), 0);
	Ok(())
}

#[test]
fn test_deferred_static_initialization_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), desc())?;
	let mut srb = signature.create_binding(false)?;
	assert!(!srb.static_resources_initialized());

	let texture = platform.create_texture("environment", ResourceState::SHADER_RESOURCE);
	let env = BoundObject::TextureView(platform.create_texture_view(&texture, TextureViewType::ShaderResource, None)?);
	signature.set_static(ShaderStages::PIXEL, "s_Environment", Some(env.clone()))?;
	assert!(!srb.is_bound(0, 0));

	signature.initialize_static_srb_resources(&mut srb);
	assert!(srb.static_resources_initialized());
	let coords = signature.layout().attribs(0).binding.unwrap();
	let copied = srb.cache().resource(coords.root_index, coords.offset).unwrap();
	assert!(copied.object.ptr_eq(&env));
	// unbound static array elements are left empty
	assert!(!srb.is_bound(1, 0));
	Ok(())
}
