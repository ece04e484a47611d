use crate::descriptor::ShaderStages;
use crate::layout::ShaderVisibility;

/// Number of distinct root table slots resources are grouped into by their stages.
pub const ROOT_TABLE_SLOT_COUNT: usize = 8;

/// Maps the stages a resource is visible from to the root table slot it is grouped into, along with the visibility of
/// that table. Resources visible from multiple stages share slot 0 with [`ShaderVisibility::All`]. Single stage slots
/// are ordered by how often a stage is executed, so pixel resources get the first table.
///
/// Returns None for an empty or unknown stage mask.
pub fn root_table_slot(stages: ShaderStages) -> Option<(usize, ShaderVisibility)> {
	if stages.is_empty() || !ShaderStages::all().contains(stages) {
		return None;
	}
	if !stages.is_single_stage() {
		return Some((0, ShaderVisibility::All));
	}
	let slot = SINGLE_STAGE_SLOTS
		.iter()
		.find(|(stage, ..)| *stage == stages)
		.map_or((0, ShaderVisibility::All), |&(_, slot, visibility)| (slot, visibility));
	Some(slot)
}

/// Compute and ray tracing stages are absent, their pipelines only ever use [`ShaderVisibility::All`].
const SINGLE_STAGE_SLOTS: [(ShaderStages, usize, ShaderVisibility); 7] = [
	(ShaderStages::PIXEL, 1, ShaderVisibility::Pixel),
	(ShaderStages::VERTEX, 2, ShaderVisibility::Vertex),
	(ShaderStages::GEOMETRY, 3, ShaderVisibility::Geometry),
	(ShaderStages::HULL, 4, ShaderVisibility::Hull),
	(ShaderStages::DOMAIN, 5, ShaderVisibility::Domain),
	(ShaderStages::AMPLIFICATION, 6, ShaderVisibility::Amplification),
	(ShaderStages::MESH, 7, ShaderVisibility::Mesh),
];
