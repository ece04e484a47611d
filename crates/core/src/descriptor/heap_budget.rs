use std::fmt::{Display, Formatter};

/// The two kinds of descriptor heaps a shader can reference.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HeapType {
	CbvSrvUav,
	Sampler,
}

impl HeapType {
	pub const COUNT: usize = 2;
	pub const ALL: [HeapType; Self::COUNT] = [HeapType::CbvSrvUav, HeapType::Sampler];
}

impl Display for HeapType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			HeapType::CbvSrvUav => "CBV/SRV/UAV",
			HeapType::Sampler => "sampler",
		})
	}
}

/// Number of descriptors available in each GPU-visible descriptor heap.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DescriptorHeapBudget {
	pub cbv_srv_uav: u32,
	pub samplers: u32,
}

impl DescriptorHeapBudget {
	/// Hardware limits of shader-visible heaps on resource binding tier 1.
	pub const LIMITS: Self = DescriptorHeapBudget {
		cbv_srv_uav: 1_000_000,
		samplers: 2048,
	};

	/// Budget of the heap region holding static and mutable tables of binding objects.
	pub const REASONABLE_DEFAULTS: Self = DescriptorHeapBudget {
		cbv_srv_uav: 16384,
		samplers: 1024,
	};

	/// Budget of the heap region per-draw dynamic tables are allocated from.
	pub const REASONABLE_DYNAMIC_DEFAULTS: Self = DescriptorHeapBudget {
		cbv_srv_uav: 8192,
		samplers: 1024,
	};

	pub fn get(&self, heap_type: HeapType) -> u32 {
		match heap_type {
			HeapType::CbvSrvUav => self.cbv_srv_uav,
			HeapType::Sampler => self.samplers,
		}
	}

	pub fn assert_within_limits(&self) {
		assert!(
			self.is_within_limit(Self::LIMITS),
			"{:?} must be within limit of {:?}",
			self,
			Self::LIMITS
		);
	}

	pub fn is_within_limit(&self, limit: Self) -> bool {
		// just to make sure this is updated as well
		let DescriptorHeapBudget { cbv_srv_uav, samplers } = *self;
		cbv_srv_uav <= limit.cbv_srv_uav && samplers <= limit.samplers
	}

	pub fn min(self, other: Self) -> Self {
		Self {
			cbv_srv_uav: self.cbv_srv_uav.min(other.cbv_srv_uav),
			samplers: self.samplers.min(other.samplers),
		}
	}

	pub fn add(self, other: Self) -> Self {
		Self {
			cbv_srv_uav: self.cbv_srv_uav + other.cbv_srv_uav,
			samplers: self.samplers + other.samplers,
		}
	}
}
