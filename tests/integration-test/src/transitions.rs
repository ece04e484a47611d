#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::RootSignature;
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use gpu_root_binding::pipeline::{CommitOptions, ResourceState, TransitionMode};
use gpu_root_binding::platform::soft::{SoftBufferCreateInfo, SoftCommandList, SoftCreateInfo};
use gpu_root_binding::platform::{BufferBindFlags, BufferViewType, StateTracked, TextureViewType};

fn desc() -> SignatureDesc {
	SignatureDesc::new(
		"transitions",
		vec![
			ResourceDesc::new("m_Constants", ShaderStages::VERTEX, 1, ResourceKind::ConstantBuffer, VariableType::Mutable),
			ResourceDesc::new("m_Albedo", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
			ResourceDesc::new("m_Particles", ShaderStages::PIXEL, 1, ResourceKind::BufferUav, VariableType::Mutable),
			ResourceDesc::new("d_Scene", ShaderStages::PIXEL, 1, ResourceKind::AccelStruct, VariableType::Dynamic),
		],
	)
}

#[test]
fn test_transition_coverage_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), desc())?;
	let mut srb = signature.create_binding(true)?;

	let constants = platform.create_buffer(&SoftBufferCreateInfo {
		name: "constants",
		initial_state: ResourceState::COPY_DEST,
		..SoftBufferCreateInfo::default()
	})?;
	let albedo = platform.create_texture("albedo", ResourceState::RENDER_TARGET);
	let particles = platform.create_buffer(&SoftBufferCreateInfo {
		name: "particles",
		bind_flags: BufferBindFlags::UNORDERED_ACCESS,
		initial_state: ResourceState::UNORDERED_ACCESS,
		..SoftBufferCreateInfo::default()
	})?;
	let scene = platform.create_accel_struct("scene", ResourceState::BUILD_AS_WRITE)?;

	srb.bind(0, 0, Some(BoundObject::Buffer(constants.clone())))?;
	let albedo_view = platform.create_texture_view(&albedo, TextureViewType::ShaderResource, None)?;
	srb.bind(1, 0, Some(BoundObject::TextureView(albedo_view)))?;
	let particles_view = platform.create_buffer_view(&particles, BufferViewType::UnorderedAccess, false)?;
	srb.bind(2, 0, Some(BoundObject::BufferView(particles_view)))?;
	srb.bind(3, 0, Some(BoundObject::AccelStruct(scene.clone())))?;
	assert_eq!(srb.cache().validate_resource_states().len(), 3);

	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(&mut cmd, CommitOptions::default())?;

	assert_eq!(constants.state(), ResourceState::CONSTANT_BUFFER);
	assert_eq!(albedo.state(), ResourceState::SHADER_RESOURCE);
	assert_eq!(particles.state(), ResourceState::UNORDERED_ACCESS);
	assert_eq!(scene.state(), ResourceState::RAY_TRACING);
	assert!(srb.cache().validate_resource_states().is_empty());
	let transitioned = cmd.transitions().map(|(name, ..)| name).collect::<Vec<_>>();
	assert_eq!(transitioned, ["constants", "albedo", "particles", "scene"]);

	// transitions precede every bind
	let last_transition = cmd.commands().iter().rposition(|command| {
		matches!(command, gpu_root_binding::platform::soft::SoftCommand::Transition { .. })
	});
	assert_eq!(last_transition, Some(3));

	// a second commit only repeats the barriers between writes
	cmd.reset();
	srb.commit(&mut cmd, CommitOptions::default())?;
	let transitioned = cmd.transitions().map(|(name, ..)| name).collect::<Vec<_>>();
	assert_eq!(transitioned, ["particles", "scene"]);
	Ok(())
}

#[test]
fn test_verify_mode_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(platform.clone(), desc())?;
	let mut srb = signature.create_binding(true)?;

	let albedo = platform.create_texture("albedo", ResourceState::COPY_DEST);
	let view = platform.create_texture_view(&albedo, TextureViewType::ShaderResource, None)?;
	srb.bind(1, 0, Some(BoundObject::TextureView(view)))?;

	let mut cmd = SoftCommandList::new(platform.clone());
	srb.commit(
		&mut cmd,
		CommitOptions {
			transition_mode: TransitionMode::Verify,
			..CommitOptions::default()
		},
	)?;
	assert_eq!(cmd.transitions().count(), 0);
	assert_eq!(albedo.state(), ResourceState::COPY_DEST);
	assert_eq!(cmd.root_tables().count(), 2);

	let mismatches = srb.cache().validate_resource_states();
	assert_eq!(mismatches.len(), 1);
	assert_eq!(mismatches[0].name, "albedo");
	assert_eq!(mismatches[0].required, ResourceState::SHADER_RESOURCE);
	Ok(())
}
