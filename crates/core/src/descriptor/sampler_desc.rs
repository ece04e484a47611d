use crate::descriptor::ShaderStages;

/// Texel mixing mode when sampling between texels.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum Filter {
	#[default]
	Nearest,
	Linear,
	Anisotropic,
}

/// How texture coordinates outside of `[0, 1]` are resolved.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
pub enum AddressMode {
	#[default]
	ClampToEdge,
	Repeat,
	MirrorRepeat,
	ClampToBorder,
}

/// Color used with [`AddressMode::ClampToBorder`]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum BorderColor {
	#[default]
	TransparentBlack,
	OpaqueBlack,
	OpaqueWhite,
}

/// Sampler state baked into a layout by an [`ImmutableSamplerDesc`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SamplerDesc {
	pub mag_filter: Filter,
	pub min_filter: Filter,
	pub mipmap_mode: Filter,
	pub address_mode_u: AddressMode,
	pub address_mode_v: AddressMode,
	pub address_mode_w: AddressMode,
	/// 0 disables anisotropic filtering
	pub max_anisotropy: u32,
	pub border_color: BorderColor,
}

/// A sampler compiled into the layout itself. It never occupies a bindable slot.
///
/// It is assigned to the sampler resource named `sampler_or_texture_name`, or, when combined samplers are used, only to
/// the sampler resource named `sampler_or_texture_name + combined sampler suffix`. Stages of the sampler resource and the
/// immutable sampler must overlap.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImmutableSamplerDesc {
	pub stages: ShaderStages,
	pub sampler_or_texture_name: String,
	pub desc: SamplerDesc,
}

impl ImmutableSamplerDesc {
	pub fn new(stages: ShaderStages, sampler_or_texture_name: impl Into<String>, desc: SamplerDesc) -> Self {
		Self {
			stages,
			sampler_or_texture_name: sampler_or_texture_name.into(),
			desc,
		}
	}

	/// Returns true if this immutable sampler applies to the sampler resource `sampler_name` visible from `stages`.
	pub fn matches(&self, stages: ShaderStages, sampler_name: &str, combined_sampler_suffix: Option<&str>) -> bool {
		if !self.stages.intersects(stages) {
			return false;
		}
		sampler_name
			.strip_prefix(self.sampler_or_texture_name.as_str())
			.is_some_and(|rest| rest == combined_sampler_suffix.unwrap_or(""))
	}
}
