use crate::descriptor::{HeapType, ResourceKind, VariableType};
use num_derive::{FromPrimitive, ToPrimitive};
use std::fmt::{Display, Formatter};

/// Kind of a descriptor range. The discriminant doubles as the root index of the static cache table holding all static
/// resources of that kind, see [`RangeType::static_root_index`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum RangeType {
	Srv = 0,
	Uav = 1,
	Cbv = 2,
	Sampler = 3,
}

impl RangeType {
	pub const COUNT: usize = 4;
	pub const ALL: [RangeType; Self::COUNT] = [RangeType::Srv, RangeType::Uav, RangeType::Cbv, RangeType::Sampler];

	pub fn from_resource_kind(kind: ResourceKind) -> Self {
		match kind {
			ResourceKind::ConstantBuffer => RangeType::Cbv,
			ResourceKind::TextureSrv | ResourceKind::BufferSrv | ResourceKind::AccelStruct => RangeType::Srv,
			ResourceKind::TextureUav | ResourceKind::BufferUav => RangeType::Uav,
			ResourceKind::Sampler => RangeType::Sampler,
		}
	}

	pub fn heap_type(self) -> HeapType {
		match self {
			RangeType::Srv | RangeType::Uav | RangeType::Cbv => HeapType::CbvSrvUav,
			RangeType::Sampler => HeapType::Sampler,
		}
	}

	/// Root index of the table in a signature's static cache that holds every static resource of this range type.
	pub const fn static_root_index(self) -> u32 {
		self as u32
	}
}

impl Display for RangeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			RangeType::Srv => "SRV",
			RangeType::Uav => "UAV",
			RangeType::Cbv => "CBV",
			RangeType::Sampler => "sampler",
		})
	}
}

/// Update class of a root parameter. Static and mutable resources share tables, as both are written once per binding
/// object into GPU-visible descriptor space. Dynamic tables are copied into freshly allocated space on every commit.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum RootType {
	StaticMutable = 0,
	Dynamic = 1,
}

impl RootType {
	pub const COUNT: usize = 2;

	pub fn from_variable_type(var_type: VariableType) -> Self {
		match var_type {
			VariableType::Static | VariableType::Mutable => RootType::StaticMutable,
			VariableType::Dynamic => RootType::Dynamic,
		}
	}
}

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum ShaderVisibility {
	#[default]
	All,
	Vertex,
	Hull,
	Domain,
	Geometry,
	Pixel,
	Amplification,
	Mesh,
}

/// A contiguous run of descriptors of the same [`RangeType`] within a root table.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct DescriptorRange {
	pub range_type: RangeType,
	pub base_register: u32,
	pub space: u32,
	pub count: u32,
	/// Offset of the first descriptor of this range from the start of the table.
	pub offset: u32,
}

impl DescriptorRange {
	pub fn end(&self) -> u32 {
		self.offset + self.count
	}
}

/// A root parameter referencing a single buffer directly by its GPU address.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct RootView {
	pub root_index: u32,
	pub visibility: ShaderVisibility,
	pub root_type: RootType,
	pub range_type: RangeType,
	pub register: u32,
	pub space: u32,
}

/// A root parameter referencing a range of a descriptor heap. The descriptor ranges are borrowed from the
/// [`RootParamsManager`] owning them.
///
/// [`RootParamsManager`]: crate::layout::RootParamsManager
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct RootTable<'a> {
	pub root_index: u32,
	pub visibility: ShaderVisibility,
	pub root_type: RootType,
	pub ranges: &'a [DescriptorRange],
}

impl RootTable<'_> {
	/// The number of descriptors this table spans, the end of its furthest range.
	pub fn descriptor_table_size(&self) -> u32 {
		self.ranges.iter().map(DescriptorRange::end).max().unwrap_or(0)
	}

	/// Tables either contain only samplers or only CBVs, SRVs and UAVs.
	pub fn is_resource_table(&self) -> bool {
		self.ranges
			.first()
			.map_or(true, |range| range.range_type != RangeType::Sampler)
	}

	pub fn heap_type(&self) -> HeapType {
		if self.is_resource_table() {
			HeapType::CbvSrvUav
		} else {
			HeapType::Sampler
		}
	}

	/// Finds the range containing the descriptor at `offset`.
	pub fn range_at(&self, offset: u32) -> Option<&DescriptorRange> {
		self.ranges.iter().find(|range| (range.offset..range.end()).contains(&offset))
	}
}

/// Either shape a root parameter may take.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum RootParameter<'a> {
	Table(RootTable<'a>),
	View(&'a RootView),
}

impl RootParameter<'_> {
	pub fn root_index(&self) -> u32 {
		match self {
			RootParameter::Table(table) => table.root_index,
			RootParameter::View(view) => view.root_index,
		}
	}

	pub fn root_type(&self) -> RootType {
		match self {
			RootParameter::Table(table) => table.root_type,
			RootParameter::View(view) => view.root_type,
		}
	}

	pub fn visibility(&self) -> ShaderVisibility {
		match self {
			RootParameter::Table(table) => table.visibility,
			RootParameter::View(view) => view.visibility,
		}
	}

	/// Number of resource cache slots this parameter requires: the table size for tables, a single slot for views.
	pub fn cache_size(&self) -> u32 {
		match self {
			RootParameter::Table(table) => table.descriptor_table_size(),
			RootParameter::View(_) => 1,
		}
	}
}
