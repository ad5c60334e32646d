//! Interleaved vertex layout for GPU upload

/// Position + normal + texture coordinate vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Vertex position in local space.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate (s, t).
    pub tex_coord: [f32; 2],
}

impl MeshVertex {
    /// Byte stride between consecutive vertices.
    pub const STRIDE: usize = std::mem::size_of::<Self>();

    /// Byte offset of each attribute, in declaration order.
    pub const OFFSETS: [usize; 3] = [
        std::mem::offset_of!(MeshVertex, position),
        std::mem::offset_of!(MeshVertex, normal),
        std::mem::offset_of!(MeshVertex, tex_coord),
    ];
}

/// View interleaved vertices as raw bytes.
pub fn vertex_bytes(vertices: &[MeshVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}
