#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::RootSignature;
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{
	ResourceDesc, ResourceFlags, ResourceKind, ShaderStages, SignatureDesc, VariableType,
};
use gpu_root_binding::pipeline::{CommitOptions, ResourceState};
use gpu_root_binding::platform::soft::{SoftCommandList, SoftCreateInfo, SoftDescriptor};
use gpu_root_binding::platform::TextureViewType;

#[test]
fn test_runtime_array_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let mut desc = SignatureDesc::new(
		"bindless textures",
		vec![
			ResourceDesc::new("g_Albedo", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
			ResourceDesc::new("g_Textures", ShaderStages::PIXEL, 64, ResourceKind::TextureSrv, VariableType::Mutable)
				.with_flags(ResourceFlags::RUNTIME_ARRAY),
			ResourceDesc::new("g_Normal", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
		],
	);
	desc.base_register_space = 2;
	let signature = RootSignature::new(platform.clone(), desc)?;
	let layout = signature.layout();

	let albedo = layout.attribs(0);
	let array = layout.attribs(1);
	let normal = layout.attribs(2);
	assert_eq!((albedo.space, normal.space), (2, 2));
	assert_eq!((array.register, array.space), (0, 3));
	assert_eq!(layout.runtime_array_spaces(), 1);

	// fixed size resources share a table, the runtime array has its own
	let albedo_root = albedo.binding.unwrap().root_index;
	let array_root = array.binding.unwrap().root_index;
	assert_eq!(normal.binding.unwrap().root_index, albedo_root);
	assert_ne!(array_root, albedo_root);
	let array_table = layout.root_params().tables().find(|table| table.root_index == array_root).unwrap();
	assert_eq!(array_table.ranges.len(), 1);
	assert_eq!(array_table.descriptor_table_size(), 64);

	// sparse bindings are fine and do not need to be reported
	let mut srb = signature.create_binding(true)?;
	let texture = platform.create_texture("atlas", ResourceState::SHADER_RESOURCE);
	let view = platform.create_texture_view(&texture, TextureViewType::ShaderResource, None)?;
	srb.bind(1, 17, Some(BoundObject::TextureView(view.clone())))?;
	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(&mut cmd, CommitOptions::default())?;

	let (_, handle) = cmd
		.root_tables()
		.find(|(root_index, _)| *root_index == array_root)
		.unwrap();
	let element = gpu_root_binding::platform::GpuDescriptorHandle(
		handle.0 + 17 * gpu_root_binding::platform::soft::SOFT_DESCRIPTOR_INCREMENT as u64,
	);
	assert_eq!(platform.gpu_descriptor_at(element), Some(SoftDescriptor(view.id())));
	Ok(())
}
