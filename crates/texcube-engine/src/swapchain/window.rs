use winit::window::Window;

use crate::device::DeviceContext;
use crate::error::RenderError;

/// Presentation surface bound to a winit window.
///
/// wgpu does not say which swap-chain image `get_current_texture` returns, so
/// the surface numbers its buffers itself: the index advances by one on every
/// present and wraps at `buffer_count`. FIFO presentation with a frame latency
/// equal to the buffer count keeps that in step with the driver's rotation.
pub struct WindowSurface<'w> {
    /// Window the surface was created from. Must outlive the surface.
    window: &'w Window,

    surface: wgpu::Surface<'w>,

    /// Active surface configuration. Fixed after creation.
    config: wgpu::SurfaceConfiguration,

    current: usize,
    buffer_count: usize,
}

impl<'w> WindowSurface<'w> {
    pub fn new(
        ctx: &DeviceContext,
        window: &'w Window,
        buffer_count: usize,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::resource("window surface", "window has zero size"));
        }

        // Surface lifetime is tied to `window` via `'w`.
        let surface = ctx
            .instance()
            .create_surface(window)
            .map_err(RenderError::CreateSurface)?;

        if !ctx.adapter().is_surface_supported(&surface) {
            return Err(RenderError::SurfaceUnsupported {
                adapter: ctx.adapter_info().name,
            });
        }

        let caps = surface.get_capabilities(ctx.adapter());
        let format = choose_surface_format(&caps).ok_or_else(|| RenderError::SurfaceUnsupported {
            adapter: ctx.adapter_info().name,
        })?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: choose_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: buffer_count as u32,
        };
        surface.configure(ctx.device(), &config);

        log::info!(
            "window surface configured: {}x{} {:?}, {} buffers",
            config.width,
            config.height,
            config.format,
            buffer_count
        );

        Ok(Self {
            window,
            surface,
            config,
            current: 0,
            buffer_count,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Acquires the next surface texture.
    ///
    /// A lost or outdated surface is reconfigured with the same (fixed)
    /// configuration and acquisition retried once; anything else is fatal.
    pub fn acquire(&mut self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring");
                self.surface.configure(device, &self.config);
                self.surface.get_current_texture().map_err(RenderError::Acquire)
            }
            Err(err) => Err(RenderError::Acquire(err)),
        }
    }

    /// Presents `texture` and advances the back buffer index.
    pub fn present(&mut self, texture: wgpu::SurfaceTexture) {
        self.window.pre_present_notify();
        texture.present();
        self.current = (self.current + 1) % self.buffer_count;
    }
}

/// Picks the surface format the pipeline targets.
///
/// The cube is shaded in linear space and written to a UNORM target, so a
/// non-sRGB 8-bit format is preferred.
pub(crate) fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Rgba8Unorm,
        wgpu::TextureFormat::Bgra8Unorm,
    ];
    preferred
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        caps.alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::PostMultiplied],
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        }
    }

    #[test]
    fn prefers_rgba8_unorm() {
        let c = caps(vec![
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ]);
        assert_eq!(choose_surface_format(&c), Some(wgpu::TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn skips_srgb_when_a_linear_format_exists() {
        let c = caps(vec![
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgb10a2Unorm,
        ]);
        assert_eq!(choose_surface_format(&c), Some(wgpu::TextureFormat::Rgb10a2Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8UnormSrgb]);
        assert_eq!(choose_surface_format(&c), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&caps(vec![])), None);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_supported() {
        let c = caps(vec![]);
        assert_eq!(choose_alpha_mode(&c), wgpu::CompositeAlphaMode::PostMultiplied);
    }
}
