#![cfg(test)]

use crate::soft_platform;
use gpu_root_binding::binding::{BindError, RootSignature};
use gpu_root_binding::cache::BoundObject;
use gpu_root_binding::descriptor::{ResourceDesc, ResourceKind, ShaderStages, SignatureDesc, VariableType};
use gpu_root_binding::pipeline::ResourceState;
use gpu_root_binding::platform::soft::{SoftBufferCreateInfo, SoftCreateInfo};
use gpu_root_binding::platform::{BufferObject, BufferUsage, TextureViewType};
use std::sync::Arc;

#[test]
fn test_rebinding_rules_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let signature = RootSignature::new(
		platform.clone(),
		SignatureDesc::new(
			"rebinding",
			vec![
				ResourceDesc::new("m_Tex", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Mutable),
				ResourceDesc::new("d_Tex", ShaderStages::PIXEL, 1, ResourceKind::TextureSrv, VariableType::Dynamic),
			],
		),
	)?;
	let mut srb = signature.create_binding(true)?;
	let view = |name: &str| -> anyhow::Result<BoundObject> {
		let texture = platform.create_texture(name, ResourceState::COMMON);
		Ok(BoundObject::TextureView(platform.create_texture_view(
			&texture,
			TextureViewType::ShaderResource,
			None,
		)?))
	};
	let a = view("a")?;
	let b = view("b")?;

	for (resource_index, rebind_allowed) in [(0, false), (1, true)] {
		srb.bind(resource_index, 0, Some(a.clone()))?;
		srb.bind(resource_index, 0, Some(a.clone()))?;
		let result = srb.bind(resource_index, 0, Some(b.clone()));
		let coords = signature.layout().attribs(resource_index).binding.unwrap();
		let bound = &srb.cache().resource(coords.root_index, coords.offset).unwrap().object;
		if rebind_allowed {
			assert!(result.is_ok());
			assert!(bound.ptr_eq(&b));
		} else {
			assert!(matches!(result, Err(BindError::NonDynamicRebind { .. })));
			assert!(bound.ptr_eq(&a));
		}

		srb.bind(resource_index, 0, None)?;
		assert!(!srb.is_bound(resource_index, 0));
	}
	Ok(())
}

/// Deterministic xorshift, good enough to shuffle bind sequences
struct XorShift(u64);

impl XorShift {
	fn next(&mut self) -> u64 {
		self.0 ^= self.0 << 13;
		self.0 ^= self.0 >> 7;
		self.0 ^= self.0 << 17;
		self.0
	}

	fn below(&mut self, n: usize) -> usize {
		(self.next() % n as u64) as usize
	}
}

#[test]
fn test_dynamic_buffer_counter_soft() -> anyhow::Result<()> {
	let platform = soft_platform(SoftCreateInfo::default());
	let slots = [
		(ShaderStages::VERTEX, VariableType::Mutable),
		(ShaderStages::PIXEL, VariableType::Mutable),
		(ShaderStages::COMPUTE, VariableType::Mutable),
		(ShaderStages::VERTEX, VariableType::Dynamic),
		(ShaderStages::PIXEL, VariableType::Dynamic),
		(ShaderStages::GEOMETRY, VariableType::Dynamic),
		(ShaderStages::HULL, VariableType::Dynamic),
		(ShaderStages::DOMAIN, VariableType::Dynamic),
		(ShaderStages::MESH, VariableType::Dynamic),
	];
	let resources = slots
		.iter()
		.enumerate()
		.map(|(i, (stages, var_type))| {
			ResourceDesc::new(format!("g_CB{}", i), *stages, 1, ResourceKind::ConstantBuffer, *var_type)
		})
		.collect();
	let signature = RootSignature::new(platform.clone(), SignatureDesc::new("counter", resources))?;
	assert_eq!(signature.layout().root_params().num_views(), slots.len());
	let mut srb = signature.create_binding(true)?;

	let buffers = [BufferUsage::Dynamic, BufferUsage::Default, BufferUsage::Dynamic]
		.into_iter()
		.map(|usage| {
			platform.create_buffer(&SoftBufferCreateInfo {
				usage,
				..SoftBufferCreateInfo::default()
			})
		})
		.collect::<Result<Vec<_>, _>>()?;

	let mut rng = XorShift(0x2545_f491_4f6c_dd1d);
	let mut reference = vec![None; slots.len()];
	let mut refused = 0;
	for _ in 0..2000 {
		let slot = rng.below(slots.len());
		let buffer = buffers.get(rng.below(buffers.len() + 1));
		let result = srb.bind(slot, 0, buffer.map(|buffer| BoundObject::Buffer(buffer.clone())));

		let is_mutable = slots[slot].1 == VariableType::Mutable;
		let replaces_other = match (&reference[slot], buffer) {
			(Some(bound), Some(new)) => !Arc::ptr_eq(bound, new),
			_ => false,
		};
		if is_mutable && replaces_other {
			assert!(matches!(result, Err(BindError::NonDynamicRebind { .. })));
			refused += 1;
		} else {
			result?;
			reference[slot] = buffer.cloned();
		}

		let expected = reference
			.iter()
			.flatten()
			.filter(|buffer| buffer.usage() == BufferUsage::Dynamic)
			.count() as u32;
		assert_eq!(srb.cache().dynamic_root_buffers(), expected);
		assert_eq!(srb.cache().count_dynamic_root_buffers(), expected);
	}
	assert!(refused > 0);
	Ok(())
}
