use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Per-draw constants, laid out to match the `Transforms` uniform in
/// `shaders.wgsl`. 240 bytes; stored at 256-byte strides.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformBlock {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_pos: Vec4,
    pub light_color: Vec4,
    pub eye_pos: Vec4,
}

pub const TRANSFORM_BLOCK_SIZE: usize = size_of::<TransformBlock>();

/// Fixed viewpoint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, -6.0),
            target: Vec3::new(0.0, 0.0, 1.0),
            up: Vec3::Y,
            fov_y: FRAC_PI_4,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            near: 0.01,
            far: 100.0,
        }
    }

    /// Left-handed view matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    /// Left-handed perspective with a 0..1 depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Placement of one cube face relative to the shared face quad.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Face {
    Front,
    Right,
    Back,
    Bottom,
    Left,
    Top,
}

impl Face {
    /// Draw order; slot `i` of the constant buffer holds face `ALL[i]`.
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Bottom,
        Face::Left,
        Face::Top,
    ];

    /// Moves the `z = -1` quad onto this face, before the cube's spin.
    pub fn placement(self) -> Mat4 {
        match self {
            Face::Front => Mat4::IDENTITY,
            Face::Right => Mat4::from_rotation_y(FRAC_PI_2),
            Face::Back => Mat4::from_rotation_y(PI),
            Face::Bottom => Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)) * Mat4::from_rotation_x(FRAC_PI_2),
            Face::Left => Mat4::from_rotation_y(-FRAC_PI_2),
            Face::Top => Mat4::from_rotation_x(FRAC_PI_2),
        }
    }
}

/// CPU-side state of the spinning cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeScene {
    pub camera: Camera,
    pub light_pos: Vec4,
    pub light_color: Vec4,
    rotation: f32,
}

impl CubeScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height),
            light_pos: Vec4::new(0.0, 5.0, -6.0, 0.0),
            light_color: Vec4::ONE,
            rotation: 0.0,
        }
    }

    /// Spins the cube about the Y axis by `radians`.
    pub fn advance(&mut self, radians: f32) {
        self.rotation += radians;
    }

    /// Transform block for `face` at the current rotation.
    pub fn block(&self, face: Face) -> TransformBlock {
        let spin = Mat4::from_rotation_y(self.rotation);
        TransformBlock {
            world: spin * face.placement(),
            view: self.camera.view(),
            projection: self.camera.projection(),
            light_pos: self.light_pos,
            light_color: self.light_color,
            eye_pos: self.camera.eye.extend(0.0),
        }
    }

    /// Blocks for every face, in slot order.
    pub fn blocks(&self) -> [TransformBlock; 6] {
        Face::ALL.map(|face| self.block(face))
    }
}
