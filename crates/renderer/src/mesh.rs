use bytemuck::{Pod, Zeroable};

/// Segments per axis of the transition plane. The subdivision keeps
/// per-fragment displacement reads looking continuous across the surface;
/// the vertex stage itself is a plain MVP transform.
pub(crate) const PLANE_SEGMENTS: u32 = 40;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub(crate) struct PlaneGeometry {
    pub vertices: Vec<PlaneVertex>,
    pub indices: Vec<u16>,
    pub width: f32,
    pub height: f32,
}

/// Builds a `width`×`height` plane centered on the origin, subdivided into
/// `segments`×`segments` quads. Row 0 is the top edge (UV v = 0) so video
/// frames uploaded top-first land the right way up.
pub(crate) fn subdivided_plane(width: f32, height: f32, segments: u32) -> PlaneGeometry {
    let per_axis = segments + 1;
    let mut vertices = Vec::with_capacity((per_axis * per_axis) as usize);
    for row in 0..per_axis {
        for col in 0..per_axis {
            let u = col as f32 / segments as f32;
            let v = row as f32 / segments as f32;
            vertices.push(PlaneVertex {
                position: [(u - 0.5) * width, (0.5 - v) * height, 0.0],
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for row in 0..segments {
        for col in 0..segments {
            let top_left = (row * per_axis + col) as u16;
            let top_right = top_left + 1;
            let bottom_left = top_left + per_axis as u16;
            let bottom_right = bottom_left + 1;
            indices.extend([top_left, bottom_left, top_right]);
            indices.extend([top_right, bottom_left, bottom_right]);
        }
    }

    PlaneGeometry {
        vertices,
        indices,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_counts() {
        let plane = subdivided_plane(1920.0, 1080.0, PLANE_SEGMENTS);
        assert_eq!(plane.vertices.len(), 41 * 41);
        assert_eq!(plane.indices.len(), 40 * 40 * 6);
    }

    #[test]
    fn indices_stay_in_range() {
        let plane = subdivided_plane(100.0, 100.0, PLANE_SEGMENTS);
        let count = plane.vertices.len() as u16;
        assert!(plane.indices.iter().all(|&index| index < count));
    }

    #[test]
    fn corners_span_the_authored_size() {
        let plane = subdivided_plane(1920.0, 1080.0, 4);
        let first = plane.vertices.first().unwrap();
        let last = plane.vertices.last().unwrap();
        assert_eq!(first.position, [-960.0, 540.0, 0.0]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(last.position, [960.0, -540.0, 0.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
    }

    #[test]
    fn uv_top_edge_is_v_zero() {
        let plane = subdivided_plane(10.0, 10.0, 2);
        for vertex in &plane.vertices[..3] {
            assert_eq!(vertex.uv[1], 0.0);
            assert_eq!(vertex.position[1], 5.0);
        }
    }
}
