use super::FeatureLevel;

/// Initialization parameters for the device context.
///
/// Keep this structure small. Add flags only when a concrete platform or
/// backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Backends the instance may enumerate adapters from.
    pub backends: wgpu::Backends,

    /// Minimum capability an adapter must report to be selected.
    pub feature_level: FeatureLevel,

    /// Select a software (CPU) adapter instead of hardware.
    ///
    /// Hardware selection never falls back to software on its own; this flag is
    /// the only way to get a software device.
    pub use_software_adapter: bool,

    /// Enable instance validation and shader debug info.
    ///
    /// Defaults to on in builds with debug assertions.
    pub debug_layer: bool,

    /// Features requested only if the chosen adapter supports them.
    pub optional_features: wgpu::Features,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            feature_level: FeatureLevel::Core,
            use_software_adapter: false,
            debug_layer: cfg!(debug_assertions),
            optional_features: wgpu::Features::TEXTURE_COMPRESSION_BC,
        }
    }
}
