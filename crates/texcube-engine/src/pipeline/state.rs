use crate::error::RenderError;
use crate::model::Vertex;
use crate::swapchain::DEPTH_FORMAT;

use super::layout::RootSignature;
use super::shader::{ShaderSource, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Immutable render pipeline for the cube.
pub struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    color_format: wgpu::TextureFormat,
}

impl PipelineState {
    pub fn new(
        device: &wgpu::Device,
        root: &RootSignature,
        shader: &ShaderSource,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        let module = shader.compile(device)?;

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("texcube pipeline"),
            layout: Some(root.pipeline_layout()),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::info!("pipeline created for {color_format:?} + {DEPTH_FORMAT:?}");

        Ok(Self {
            pipeline,
            color_format,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }
}
