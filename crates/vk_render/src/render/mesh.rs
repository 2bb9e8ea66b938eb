//! Geometry types shared between the CPU and the GPU

use bytemuck::{Pod, Zeroable};

/// A colored 2D vertex as laid out in vertex buffer memory.
///
/// `#[repr(C)]` keeps the field order stable so the Vulkan attribute
/// descriptions in `vertex_layout` stay in sync with this struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in normalized device coordinates
    pub position: [f32; 2],
    /// Linear RGB color
    pub color: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 2], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// The canonical single-triangle mesh: one red, one green, one blue vertex,
/// wound clockwise so back-face culling keeps it visible.
pub fn triangle_vertices() -> [Vertex; 3] {
    [
        Vertex::new([0.0, -0.5], [1.0, 0.0, 0.0]),
        Vertex::new([0.5, 0.5], [0.0, 1.0, 0.0]),
        Vertex::new([-0.5, 0.5], [0.0, 0.0, 1.0]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        // Stride the attribute descriptions rely on: 2 + 3 floats
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn test_vertex_bytes_round_trip() {
        let vertex = Vertex::new([0.5, -0.5], [0.0, 1.0, 0.0]);
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 20);
        assert_eq!(*bytemuck::from_bytes::<Vertex>(bytes), vertex);
    }

    #[test]
    fn test_triangle_has_three_distinct_corners() {
        let vertices = triangle_vertices();
        assert_ne!(vertices[0].position, vertices[1].position);
        assert_ne!(vertices[1].position, vertices[2].position);
        assert_ne!(vertices[0].position, vertices[2].position);
    }
}
