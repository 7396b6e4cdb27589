use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use texcube_engine::core::{run_headless, HeadlessOptions, RendererConfig, UpdateStep};
use texcube_engine::device::{DeviceInit, FeatureLevel};
use texcube_engine::logging::{init_logging, LoggingConfig};
use texcube_engine::upload::TextureReadback;
use texcube_engine::window::{Runtime, RuntimeConfig};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Level {
    Core,
    Downlevel,
}

impl From<Level> for FeatureLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Core => FeatureLevel::Core,
            Level::Downlevel => FeatureLevel::Downlevel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "texcube", about = "Spinning textured cube on an explicit wgpu frame pipeline.")]
struct Args {
    /// Back buffer width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Back buffer height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Use a software (CPU) adapter instead of hardware
    #[arg(long, action = clap::ArgAction::SetTrue)]
    software: bool,

    /// Minimum capability level the adapter must meet
    #[arg(long, value_enum, default_value_t = Level::Core)]
    feature_level: Level,

    /// DDS texture applied to every face
    #[arg(long, value_name = "PATH")]
    texture: Option<PathBuf>,

    /// WGSL shader with `vs_main` and `fs_main`
    #[arg(long, value_name = "PATH")]
    shader: Option<PathBuf>,

    /// Render offscreen instead of opening a window
    #[arg(long, action = clap::ArgAction::SetTrue)]
    headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 60, requires = "headless")]
    frames: u32,

    /// Write the last headless frame to this PNG
    #[arg(long, value_name = "PATH", requires = "headless")]
    capture: Option<PathBuf>,

    /// Rotate by elapsed time rather than a fixed step per frame
    #[arg(long, action = clap::ArgAction::SetTrue)]
    time_based: bool,

    /// Log filter (env_logger syntax); overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let device = DeviceInit {
        feature_level: args.feature_level.into(),
        use_software_adapter: args.software,
        ..DeviceInit::default()
    };

    let mut renderer = RendererConfig {
        width: args.width,
        height: args.height,
        ..RendererConfig::default()
    };
    if let Some(path) = args.texture {
        renderer.texture_path = path;
    }
    if let Some(path) = args.shader {
        renderer.shader_path = path;
    }

    let step = if args.time_based {
        UpdateStep::time_based()
    } else {
        UpdateStep::default()
    };

    if args.headless {
        let summary = run_headless(HeadlessOptions {
            device,
            renderer,
            frames: args.frames,
            step,
            capture: args.capture.is_some(),
        })
        .context("headless run failed")?;

        log::info!(
            "rendered {} frames offscreen, fence {} -> {}",
            summary.frames.len(),
            summary.initial_fence,
            summary.final_fence()
        );

        if let (Some(path), Some(frame)) = (args.capture, summary.capture) {
            write_png(&path, frame)?;
            log::info!("wrote {}", path.display());
        }
        return Ok(());
    }

    let config = RuntimeConfig {
        size: (args.width, args.height).into(),
        step,
        ..RuntimeConfig::default()
    };
    let summary = Runtime::run(config, device, renderer)?;
    log::info!("rendered {} frames, final fence {}", summary.frames, summary.final_fence);
    Ok(())
}

fn write_png(path: &Path, frame: TextureReadback) -> Result<()> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .ok_or_else(|| anyhow!("captured frame does not match {}x{}", frame.width, frame.height))?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
