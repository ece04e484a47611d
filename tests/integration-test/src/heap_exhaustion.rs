#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::RootSignature;
use gpu_root_binding::cache::{BoundObject, CacheInitError};
use gpu_root_binding::descriptor::{
	DescriptorHeapBudget, HeapType, ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType,
};
use gpu_root_binding::pipeline::{CommitError, CommitOptions, ResourceState};
use gpu_root_binding::platform::soft::{SoftCommandList, SoftCreateInfo};
use gpu_root_binding::platform::TextureViewType;

fn textures(var_type: VariableType, count: u32) -> SignatureDesc {
	SignatureDesc::new(
		"textures",
		vec![ResourceDesc::new(
			"g_Textures",
			ShaderStages::PIXEL,
			count,
			ResourceKind::TextureSrv,
			var_type,
		)],
	)
}

#[test]
fn test_binding_heap_exhausted_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo {
		gpu_heap_budget: DescriptorHeapBudget {
			cbv_srv_uav: 8,
			samplers: 0,
		},
		..SoftCreateInfo::default()
	});
	let signature = RootSignature::new(platform.clone(), textures(VariableType::Mutable, 5))?;

	let first = signature.create_binding(true)?;
	let second = signature.create_binding(true);
	assert!(matches!(
		second,
		Err(CacheInitError::HeapExhausted {
			heap_type: HeapType::CbvSrvUav,
			count: 5,
			..
		})
	));

	// descriptors of dropped binding objects can be reused
	drop(first);
	signature.create_binding(true)?;
	Ok(())
}

#[test]
fn test_dynamic_heap_exhausted_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo {
		dynamic_heap_budget: DescriptorHeapBudget {
			cbv_srv_uav: 4,
			samplers: 0,
		},
		..SoftCreateInfo::default()
	});
	let signature = RootSignature::new(platform.clone(), textures(VariableType::Dynamic, 3))?;
	let mut srb = signature.create_binding(true)?;
	for array_index in 0..3 {
		let texture = platform.create_texture("texture", ResourceState::SHADER_RESOURCE);
		let view = platform.create_texture_view(&texture, TextureViewType::ShaderResource, None)?;
		srb.bind(0, array_index, Some(BoundObject::TextureView(view)))?;
	}

	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(&mut cmd, CommitOptions::default())?;
	let result = srb.commit(&mut cmd, CommitOptions::default());
	assert!(matches!(
		result,
		Err(CommitError::DynamicHeapExhausted {
			heap_type: HeapType::CbvSrvUav,
			count: 3,
			..
		})
	));

	// executing the recorded commands releases their dynamic descriptors
	cmd.reset();
	srb.commit(&mut cmd, CommitOptions::default())?;
	assert_eq!(cmd.dynamic_allocations().len(), 1);
	Ok(())
}
