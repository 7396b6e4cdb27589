use bytemuck::{Pod, Zeroable};

/// Mesh vertex: position, normal, texture coordinate. 32-byte stride.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// One cube face: a unit quad on the `z = -1` plane facing the camera.
///
/// Every face of the cube is this quad under a different world transform.
pub const FACE_VERTICES: [Vertex; 4] = [
    Vertex { position: [1.0, 1.0, -1.0], normal: [0.0, 0.0, -1.0], uv: [1.0, 0.0] },
    Vertex { position: [1.0, -1.0, -1.0], normal: [0.0, 0.0, -1.0], uv: [1.0, 1.0] },
    Vertex { position: [-1.0, -1.0, -1.0], normal: [0.0, 0.0, -1.0], uv: [0.0, 1.0] },
    Vertex { position: [-1.0, 1.0, -1.0], normal: [0.0, 0.0, -1.0], uv: [0.0, 0.0] },
];

/// Clockwise triangle list over [`FACE_VERTICES`].
pub const FACE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_packed_to_32_bytes() {
        assert_eq!(size_of::<Vertex>(), 32);

        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2]);
    }

    #[test]
    fn host_packing_matches_field_order() {
        let bytes: &[u8] = bytemuck::cast_slice(&FACE_VERTICES);
        assert_eq!(bytes.len(), 4 * 32);

        let floats: &[f32] = bytemuck::cast_slice(&bytes[32..64]);
        assert_eq!(floats, &[1.0, -1.0, -1.0, 0.0, 0.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn indices_form_two_triangles_in_range() {
        assert_eq!(FACE_INDICES.len() % 3, 0);
        assert!(FACE_INDICES.iter().all(|&i| (i as usize) < FACE_VERTICES.len()));
    }

    #[test]
    fn first_triangle_winds_clockwise_seen_from_the_camera() {
        // Camera looks down +z; with x right and y up, clockwise means a
        // negative z component of the cross product.
        let [a, b, c] = [0, 1, 2].map(|i| FACE_VERTICES[FACE_INDICES[i] as usize].position);
        let ab = [b[0] - a[0], b[1] - a[1]];
        let ac = [c[0] - a[0], c[1] - a[1]];
        let cross_z = ab[0] * ac[1] - ab[1] * ac[0];
        assert!(cross_z < 0.0);
    }
}
