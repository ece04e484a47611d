#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::RootSignature;
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{HeapType, ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use gpu_root_binding::layout::{RangeType, ShaderVisibility};
use gpu_root_binding::pipeline::{CommitOptions, ResourceState};
use gpu_root_binding::platform::soft::{SoftCommandList, SoftCreateInfo, SoftDescriptor};
use gpu_root_binding::platform::TextureViewType;

#[test]
fn test_two_stage_textures_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(
		platform.clone(),
		SignatureDesc::new(
			"two stages",
			vec![
				ResourceDesc::new("g_Height", ShaderStages::VERTEX, 1, ResourceKind::TextureSrv, VariableType::Mutable),
				ResourceDesc::new("g_Albedo", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
			],
		),
	)?;

	let params = signature.layout().root_params();
	assert_eq!(params.num_tables(), 2);
	assert_eq!(params.num_views(), 0);
	let visibilities = params.tables().map(|table| table.visibility).collect::<Vec<_>>();
	assert_eq!(visibilities, [ShaderVisibility::Vertex, ShaderVisibility::Pixel]);
	for table in params.tables() {
		assert_eq!(table.ranges.len(), 1);
		assert_eq!(table.ranges[0].count, 1);
		assert_eq!(table.ranges[0].range_type, RangeType::Srv);
	}

	let mut srb = signature.create_binding(true)?;
	let mut views = Vec::new();
	for (index, name) in ["height", "albedo"].into_iter().enumerate() {
		let texture = platform.create_texture(name, ResourceState::SHADER_RESOURCE);
		let view = platform.create_texture_view(&texture, TextureViewType::ShaderResource, None)?;
		srb.bind(index, 0, Some(BoundObject::TextureView(view.clone())))?;
		views.push(view);
	}

	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(&mut cmd, CommitOptions::default())?;
	let tables = cmd.root_tables().collect::<Vec<_>>();
	assert_eq!(tables.len(), 2);
	for ((root_index, handle), view) in tables.into_iter().zip(&views) {
		let expected = srb
			.cache()
			.shader_visible_gpu_handle(HeapType::CbvSrvUav, root_index, 0)
			.unwrap();
		assert_eq!(handle, expected);
		assert_eq!(platform.gpu_descriptor_at(handle), Some(SoftDescriptor(view.id())));
	}
	assert_eq!(cmd.transitions().count(), 0);
	Ok(())
}
