use std::path::PathBuf;

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Back buffer size for headless rendering. Window surfaces use the
    /// window's inner size instead.
    pub width: u32,
    pub height: u32,

    /// WGSL source with `vs_main` and `fs_main`.
    pub shader_path: PathBuf,

    /// DDS texture applied to every face.
    pub texture_path: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            shader_path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders.wgsl")),
            texture_path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/texture.dds")),
        }
    }
}

/// How far the cube spins per update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UpdateStep {
    /// Fixed angle per idle tick, independent of frame rate.
    PerTick { radians: f32 },
    /// Angle proportional to elapsed time.
    TimeBased { radians_per_second: f32 },
}

impl UpdateStep {
    /// Rotation delta for a tick that took `dt` seconds.
    pub fn delta(self, dt: f32) -> f32 {
        match self {
            Self::PerTick { radians } => radians,
            Self::TimeBased { radians_per_second } => radians_per_second * dt,
        }
    }

    pub fn time_based() -> Self {
        // 0.01 rad per tick at 60 Hz.
        Self::TimeBased {
            radians_per_second: 0.6,
        }
    }
}

impl Default for UpdateStep {
    fn default() -> Self {
        Self::PerTick { radians: 0.01 }
    }
}
