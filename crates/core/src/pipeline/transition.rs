use crate::binding::RootSignature;
use crate::cache::ResourceCache;
use crate::pipeline::{StateMismatch, TransitionMode};
use crate::platform::{BindingPlatform, CommandSink};

/// Brings every resource bound in `cache` into the state its binding requires, or only checks that it already is.
///
/// Resources in an unknown state are skipped in either mode. UAVs and acceleration structures are transitioned even if
/// they are already in the required state, which records the barrier between two consecutive writes.
#[profiling::function]
pub fn transition_resources<P: BindingPlatform>(
	signature: &RootSignature<P>,
	cache: &ResourceCache<P>,
	sink: &mut impl CommandSink<P>,
	mode: TransitionMode,
) {
	if mode == TransitionMode::None {
		return;
	}

	for (.., binding) in cache.bound_resources() {
		let (Some(requirement), Some(target)) = (binding.kind.state_requirement(), binding.object.transition_target())
		else {
			continue;
		};
		let object = target.state_tracked();
		let state = object.state();
		match mode {
			TransitionMode::Transition => {
				if requirement.needs_transition(state) {
					sink.transition_resource(target, state, requirement.target);
					object.set_state(requirement.target);
				}
			}
			TransitionMode::Verify => {
				if state.is_known() && !requirement.is_satisfied_by(state) {
					let mismatch = StateMismatch {
						name: object.name().to_string(),
						kind: binding.kind,
						required: requirement.target,
						actual: state,
					};
					log::error!(
						"State of a resource bound to signature \"{}\" is invalid: {}",
						signature.name(),
						mismatch
					);
				}
			}
			TransitionMode::None => (),
		}
	}
}
