//! In-memory mesh resource

use glam::Vec3;

use super::{MeshBuffers, MeshSink};

/// A mesh resource holding the buffers handed to it
///
/// This is the owning side of [`MeshSink`]: it copies whatever it is given,
/// or adopts generator output directly through [`Mesh::from_buffers`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    normals: Vec<f32>,
    tex_coords: Vec<f32>,
    triangles: Vec<u16>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt generated buffers without copying
    pub fn from_buffers(buffers: MeshBuffers) -> Self {
        Self {
            vertices: buffers.positions,
            normals: buffers.normals,
            tex_coords: buffers.tex_coords,
            triangles: buffers.indices,
        }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    pub fn triangles(&self) -> &[u16] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Axis-aligned bounds of the vertices referenced by triangles
    ///
    /// Unreferenced vertices (such as a zeroed tail) are ignored. `None` when
    /// there are no triangles or an index is out of range.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut referenced = vec![false; self.vertex_count()];
        for &index in &self.triangles {
            *referenced.get_mut(index as usize)? = true;
        }
        let mut points = self
            .vertices
            .chunks_exact(3)
            .zip(referenced)
            .filter(|(_, used)| *used)
            .map(|(v, _)| Vec3::new(v[0], v[1], v[2]));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

impl MeshSink for Mesh {
    fn set_vertices(&mut self, vertices: &[f32]) {
        self.vertices = vertices.to_vec();
    }

    fn set_normals(&mut self, normals: &[f32]) {
        self.normals = normals.to_vec();
    }

    fn set_tex_coords(&mut self, tex_coords: &[f32]) {
        self.tex_coords = tex_coords.to_vec();
    }

    fn set_triangles(&mut self, triangles: &[u16]) {
        self.triangles = triangles.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::generate_sphere;

    #[test]
    fn test_sink_copies_match_adopted() {
        let buffers = generate_sphere(6, 8).unwrap();
        let mut copied = Mesh::new();
        buffers.apply_to(&mut copied);
        let adopted = Mesh::from_buffers(buffers.clone());

        assert_eq!(copied, adopted);
        assert_eq!(adopted.vertex_count(), buffers.vertex_count());
        assert_eq!(adopted.triangle_count(), buffers.index_count() / 3);
    }

    #[test]
    fn test_bounding_box() {
        assert_eq!(Mesh::new().bounding_box(), None);

        let mesh = Mesh::from_buffers(generate_sphere(12, 24).unwrap());
        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min - Vec3::splat(-1.0)).length() < 1e-3, "{min}");
        assert!((max - Vec3::splat(1.0)).length() < 1e-3, "{max}");
    }

    #[test]
    fn test_bounding_box_ignores_zeroed_tail() {
        // Two stacks leave the whole body allocation unused.
        let mut buffers = generate_sphere(2, 3).unwrap();
        let emitted = buffers.emitted_vertex_count();
        assert!(emitted < buffers.vertex_count());
        for x in buffers.positions[..3 * emitted].iter_mut().step_by(3) {
            *x += 10.0;
        }
        let mesh = Mesh::from_buffers(buffers);

        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min.x - 9.5).abs() < 1e-5, "{min}");
        assert!((max.x - 11.0).abs() < 1e-5, "{max}");
    }

    #[test]
    fn test_bounding_box_without_triangles() {
        let mut mesh = Mesh::new();
        mesh.set_vertices(&[1.0, 2.0, 3.0]);
        assert_eq!(mesh.bounding_box(), None);
    }
}
