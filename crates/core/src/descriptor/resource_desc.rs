use num_derive::{FromPrimitive, ToPrimitive};
use std::fmt::{Display, Formatter};

bitflags::bitflags! {
	/// The shader stages a resource is visible from.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct ShaderStages: u32 {
		const VERTEX = 0b1;
		const PIXEL = 0b10;
		const GEOMETRY = 0b100;
		const HULL = 0b1000;
		const DOMAIN = 0b1_0000;
		const COMPUTE = 0b10_0000;
		const AMPLIFICATION = 0b100_0000;
		const MESH = 0b1000_0000;
		const RAY_GEN = 0b1_0000_0000;
		const RAY_MISS = 0b10_0000_0000;
		const RAY_CLOSEST_HIT = 0b100_0000_0000;
		const RAY_ANY_HIT = 0b1000_0000_0000;
		const RAY_INTERSECTION = 0b1_0000_0000_0000;
		const CALLABLE = 0b10_0000_0000_0000;

		const ALL_GRAPHICS = Self::VERTEX.bits() | Self::PIXEL.bits() | Self::GEOMETRY.bits() | Self::HULL.bits()
			| Self::DOMAIN.bits() | Self::AMPLIFICATION.bits() | Self::MESH.bits();
		const ALL_RAY_TRACING = Self::RAY_GEN.bits() | Self::RAY_MISS.bits() | Self::RAY_CLOSEST_HIT.bits()
			| Self::RAY_ANY_HIT.bits() | Self::RAY_INTERSECTION.bits() | Self::CALLABLE.bits();
	}
}

impl ShaderStages {
	/// Returns true if exactly one stage bit is set.
	pub fn is_single_stage(&self) -> bool {
		self.bits().is_power_of_two()
	}
}

bitflags::bitflags! {
	/// Additional properties of a [`ResourceDesc`].
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct ResourceFlags: u32 {
		/// Dynamic-usage buffers may not be bound to this resource, which also prevents it from becoming a root view.
		const NO_DYNAMIC_BUFFERS = 0b1;
		/// Texture SRV is combined with a sampler resource named `texture name + combined sampler suffix`.
		const COMBINED_SAMPLER = 0b10;
		/// Buffer view is accessed with a format, so it must live in a descriptor table.
		const FORMATTED_BUFFER = 0b100;
		/// Array whose size is only known at runtime. Placed alone in its own register space.
		const RUNTIME_ARRAY = 0b1000;
	}
}

/// The kind of a shader-visible resource.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum ResourceKind {
	ConstantBuffer,
	TextureSrv,
	BufferSrv,
	TextureUav,
	BufferUav,
	Sampler,
	AccelStruct,
}

impl ResourceKind {
	pub const COUNT: usize = 7;

	pub fn is_buffer(&self) -> bool {
		matches!(
			self,
			ResourceKind::ConstantBuffer | ResourceKind::BufferSrv | ResourceKind::BufferUav
		)
	}

	/// The [`ResourceFlags`] a resource of this kind may carry.
	pub fn allowed_flags(&self) -> ResourceFlags {
		let kind = match self {
			ResourceKind::ConstantBuffer => ResourceFlags::NO_DYNAMIC_BUFFERS,
			ResourceKind::TextureSrv => ResourceFlags::COMBINED_SAMPLER,
			ResourceKind::BufferSrv | ResourceKind::BufferUav => {
				ResourceFlags::NO_DYNAMIC_BUFFERS | ResourceFlags::FORMATTED_BUFFER
			}
			ResourceKind::TextureUav | ResourceKind::Sampler | ResourceKind::AccelStruct => ResourceFlags::empty(),
		};
		kind | ResourceFlags::RUNTIME_ARRAY
	}
}

impl Display for ResourceKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ResourceKind::ConstantBuffer => "constant buffer",
			ResourceKind::TextureSrv => "texture SRV",
			ResourceKind::BufferSrv => "buffer SRV",
			ResourceKind::TextureUav => "texture UAV",
			ResourceKind::BufferUav => "buffer UAV",
			ResourceKind::Sampler => "sampler",
			ResourceKind::AccelStruct => "acceleration structure",
		})
	}
}

/// The update class of a resource. Declaration order is the order resources must be sorted in.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, FromPrimitive, ToPrimitive)]
pub enum VariableType {
	/// Bound once on the signature and shared by every binding object.
	Static,
	/// Bound once per binding object.
	Mutable,
	/// May be rebound at any time, descriptors are copied into GPU-visible space on every commit.
	Dynamic,
}

impl VariableType {
	pub const COUNT: usize = 3;
	pub const ALL: [VariableType; Self::COUNT] = [VariableType::Static, VariableType::Mutable, VariableType::Dynamic];
}

impl Display for VariableType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			VariableType::Static => "static",
			VariableType::Mutable => "mutable",
			VariableType::Dynamic => "dynamic",
		})
	}
}

/// Describes a single shader-visible resource, usually produced by shader reflection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResourceDesc {
	pub name: String,
	pub stages: ShaderStages,
	pub array_size: u32,
	pub kind: ResourceKind,
	pub var_type: VariableType,
	pub flags: ResourceFlags,
}

impl ResourceDesc {
	pub fn new(
		name: impl Into<String>,
		stages: ShaderStages,
		array_size: u32,
		kind: ResourceKind,
		var_type: VariableType,
	) -> Self {
		Self {
			name: name.into(),
			stages,
			array_size,
			kind,
			var_type,
			flags: ResourceFlags::empty(),
		}
	}

	pub fn with_flags(mut self, flags: ResourceFlags) -> Self {
		self.flags = flags;
		self
	}

	pub fn is_runtime_array(&self) -> bool {
		self.flags.contains(ResourceFlags::RUNTIME_ARRAY)
	}

	/// Two resources are compatible if they only differ by name.
	pub fn is_compatible_with(&self, other: &Self) -> bool {
		self.stages == other.stages
			&& self.array_size == other.array_size
			&& self.kind == other.kind
			&& self.var_type == other.var_type
			&& self.flags == other.flags
	}
}
