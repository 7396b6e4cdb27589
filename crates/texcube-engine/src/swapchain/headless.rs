/// Offscreen swap chain.
///
/// Owns `buffer_count` color textures and rotates through them on present,
/// the way a flip-model swap chain does. Presented images stay readable until
/// the rotation comes back around to them.
pub struct HeadlessSurface {
    textures: Vec<wgpu::Texture>,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    current: usize,
    last_presented: Option<usize>,
}

impl HeadlessSurface {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, width: u32, height: u32, buffer_count: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let textures = (0..buffer_count)
            .map(|_| {
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("texcube headless back buffer"),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: Self::FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                })
            })
            .collect();

        log::info!("headless surface created: {width}x{height} {:?}, {buffer_count} buffers", Self::FORMAT);

        Self {
            textures,
            format: Self::FORMAT,
            width,
            height,
            current: 0,
            last_presented: None,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn views(&self) -> impl Iterator<Item = wgpu::TextureView> + '_ {
        self.textures
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    pub fn present(&mut self) {
        self.last_presented = Some(self.current);
        self.current = (self.current + 1) % self.textures.len();
    }

    /// Most recently presented back buffer.
    pub fn last_presented(&self) -> Option<&wgpu::Texture> {
        self.last_presented.and_then(|i| self.textures.get(i))
    }
}
