use crate::descriptor::ResourceKind;
use std::fmt::{Display, Formatter};

bitflags::bitflags! {
	/// Usage state a device object is in, as tracked by the object itself. An empty state means the object is not
	/// tracked and transitions are managed externally.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct ResourceState: u32 {
		const COMMON = 1 << 0;
		const VERTEX_BUFFER = 1 << 1;
		const CONSTANT_BUFFER = 1 << 2;
		const INDEX_BUFFER = 1 << 3;
		const RENDER_TARGET = 1 << 4;
		const UNORDERED_ACCESS = 1 << 5;
		const DEPTH_WRITE = 1 << 6;
		const DEPTH_READ = 1 << 7;
		const SHADER_RESOURCE = 1 << 8;
		const STREAM_OUT = 1 << 9;
		const INDIRECT_ARGUMENT = 1 << 10;
		const COPY_DEST = 1 << 11;
		const COPY_SOURCE = 1 << 12;
		const RESOLVE_DEST = 1 << 13;
		const RESOLVE_SOURCE = 1 << 14;
		const INPUT_ATTACHMENT = 1 << 15;
		const PRESENT = 1 << 16;
		const BUILD_AS_READ = 1 << 17;
		const BUILD_AS_WRITE = 1 << 18;
		const RAY_TRACING = 1 << 19;
		const SHADING_RATE = 1 << 20;

		const GENERIC_READ = Self::VERTEX_BUFFER.bits()
			| Self::CONSTANT_BUFFER.bits()
			| Self::INDEX_BUFFER.bits()
			| Self::SHADER_RESOURCE.bits()
			| Self::INDIRECT_ARGUMENT.bits()
			| Self::COPY_SOURCE.bits();
	}
}

impl ResourceState {
	pub const UNKNOWN: Self = Self::empty();

	pub fn is_known(&self) -> bool {
		!self.is_empty()
	}
}

/// The state a bound resource must be in for the shader to access it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StateRequirement {
	/// State to transition to.
	pub target: ResourceState,
	/// Being in any of these states satisfies the requirement.
	pub accepted: ResourceState,
	/// Transition even if already in an accepted state, to get the hazard barrier between two writes.
	pub always_transition: bool,
}

impl StateRequirement {
	pub fn is_satisfied_by(&self, state: ResourceState) -> bool {
		state.intersects(self.accepted)
	}

	/// Whether a resource currently in `state` must be transitioned. Resources in an unknown state are never touched.
	pub fn needs_transition(&self, state: ResourceState) -> bool {
		state.is_known() && (self.always_transition || !self.is_satisfied_by(state))
	}
}

impl ResourceKind {
	/// The state this kind of binding requires, or None if it does not reference a state tracked object.
	pub fn state_requirement(&self) -> Option<StateRequirement> {
		let (target, accepted, always_transition) = match self {
			ResourceKind::ConstantBuffer => (ResourceState::CONSTANT_BUFFER, ResourceState::CONSTANT_BUFFER, false),
			ResourceKind::BufferSrv => (ResourceState::SHADER_RESOURCE, ResourceState::SHADER_RESOURCE, false),
			ResourceKind::TextureSrv => (
				ResourceState::SHADER_RESOURCE,
				ResourceState::SHADER_RESOURCE | ResourceState::INPUT_ATTACHMENT,
				false,
			),
			ResourceKind::TextureUav | ResourceKind::BufferUav => {
				(ResourceState::UNORDERED_ACCESS, ResourceState::UNORDERED_ACCESS, true)
			}
			ResourceKind::AccelStruct => (ResourceState::RAY_TRACING, ResourceState::RAY_TRACING, true),
			ResourceKind::Sampler => return None,
		};
		Some(StateRequirement {
			target,
			accepted,
			always_transition,
		})
	}
}

/// How resources referenced by a cache are brought into the state their binding requires.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TransitionMode {
	/// States are managed externally and not checked.
	None,
	/// Record a transition for every resource not in the required state.
	#[default]
	Transition,
	/// Only check that every resource already is in the required state and log every mismatch.
	Verify,
}

/// A resource found in a state that does not satisfy its binding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateMismatch {
	pub name: String,
	pub kind: ResourceKind,
	pub required: ResourceState,
	pub actual: ResourceState,
}

impl Display for StateMismatch {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} '{}' must be in {:?} state. Actual state: {:?}",
			self.kind, self.name, self.required, self.actual
		)
	}
}
