#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::RootSignature;
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use gpu_root_binding::layout::{RootParameter, RootType};
use gpu_root_binding::pipeline::CommitOptions;
use gpu_root_binding::platform::soft::{SoftBufferCreateInfo, SoftCommandList, SoftCreateInfo};
use gpu_root_binding::platform::{BufferObject, BufferUsage, PipelineBindPoint};

fn constant_buffer_desc(var_type: VariableType) -> SignatureDesc {
	SignatureDesc::new(
		"root view",
		vec![ResourceDesc::new(
			"g_Constants",
			ShaderStages::COMPUTE,
			1,
			ResourceKind::ConstantBuffer,
			var_type,
		)],
	)
}

#[test]
fn test_single_constant_buffer_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), constant_buffer_desc(VariableType::Mutable))?;

	let params = signature.layout().root_params();
	assert_eq!(params.num_tables(), 0);
	assert_eq!(params.num_views(), 1);
	assert!(matches!(
		params.parameter(0),
		Some(RootParameter::View(view)) if view.root_type == RootType::StaticMutable
	));

	let mut srb = signature.create_binding(true)?;
	let buffer = platform.create_buffer(&SoftBufferCreateInfo {
		name: "constants",
		..SoftBufferCreateInfo::default()
	})?;
	srb.bind(0, 0, Some(BoundObject::Buffer(buffer.clone())))?;

	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(
		&mut cmd,
		CommitOptions {
			bind_point: PipelineBindPoint::Compute,
			..CommitOptions::default()
		},
	)?;

	assert_eq!(
		cmd.root_constant_buffer_views().collect::<Vec<_>>(),
		[(0, buffer.gpu_address())]
	);
	assert_eq!(cmd.root_tables().count(), 0);
	assert!(cmd.dynamic_allocations().is_empty());
	assert_eq!(platform.descriptor_copies(), 0);
	Ok(())
}

#[test]
fn test_dynamic_buffer_renamed_every_frame_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), constant_buffer_desc(VariableType::Dynamic))?;
	let mut srb = signature.create_binding(true)?;
	let buffer = platform.create_buffer(&SoftBufferCreateInfo {
		name: "per frame",
		usage: BufferUsage::Dynamic,
		..SoftBufferCreateInfo::default()
	})?;
	srb.bind(0, 0, Some(BoundObject::Buffer(buffer.clone())))?;
	assert_eq!(srb.cache().dynamic_root_buffers(), 1);

	let mut cmd = SoftCommandList::new(platform.clone());
	let mut expected = Vec::new();
	for _ in 0..3 {
		let address = buffer.rename();
		srb.commit(&mut cmd, CommitOptions::default())?;
		expected.push((0, address));
	}
	assert_eq!(cmd.root_constant_buffer_views().collect::<Vec<_>>(), expected);
	assert_eq!(platform.descriptor_copies(), 0);
	Ok(())
}
