//! Mesh buffers, the mesh consumer interface, and mesh file export (OBJ, STL)

mod normals;
mod obj;
mod resource;
mod stl;
mod vertex;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use normals::{calculate_face_normals, calculate_triangle_normal, is_outward_facing};
pub use obj::{load_obj, load_obj_from_bytes, save_obj, write_obj};
pub use resource::Mesh;
pub use stl::{save_stl, write_stl};
pub use vertex::{MeshVertex, vertex_bytes};

/// Consumer of generated mesh data
///
/// Implemented by whatever owns the mesh on the rendering side. Buffers are
/// flat: three scalars per vertex for vertices and normals, two for texture
/// coordinates, three indices per triangle.
pub trait MeshSink {
    fn set_vertices(&mut self, vertices: &[f32]);
    fn set_normals(&mut self, normals: &[f32]);
    fn set_tex_coords(&mut self, tex_coords: &[f32]);
    fn set_triangles(&mut self, triangles: &[u16]);
}

/// Raw buffer data for (de)serialization, validated on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeshBuffersData {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tex_coords: Vec<f32>,
    indices: Vec<u16>,
    emitted_vertex_count: usize,
    emitted_index_count: usize,
}

/// Flat mesh buffers sharing one per-vertex ordering
///
/// Buffers may be longer than the data written into them; the tail past
/// `emitted_vertex_count` / `emitted_index_count` is zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeshBuffersData", into = "MeshBuffersData")]
pub struct MeshBuffers {
    /// Vertex positions (x, y, z per vertex)
    pub positions: Vec<f32>,
    /// Vertex normals (x, y, z per vertex)
    pub normals: Vec<f32>,
    /// Texture coordinates (s, t per vertex)
    pub tex_coords: Vec<f32>,
    /// Triangle indices (three per triangle)
    pub indices: Vec<u16>,
    emitted_vertex_count: usize,
    emitted_index_count: usize,
}

impl From<MeshBuffers> for MeshBuffersData {
    fn from(buffers: MeshBuffers) -> Self {
        Self {
            positions: buffers.positions,
            normals: buffers.normals,
            tex_coords: buffers.tex_coords,
            indices: buffers.indices,
            emitted_vertex_count: buffers.emitted_vertex_count,
            emitted_index_count: buffers.emitted_index_count,
        }
    }
}

impl TryFrom<MeshBuffersData> for MeshBuffers {
    type Error = MeshError;

    fn try_from(data: MeshBuffersData) -> Result<Self, Self::Error> {
        let buffers = Self {
            positions: data.positions,
            normals: data.normals,
            tex_coords: data.tex_coords,
            indices: data.indices,
            emitted_vertex_count: data.emitted_vertex_count,
            emitted_index_count: data.emitted_index_count,
        };
        buffers.check()?;
        Ok(buffers)
    }
}

impl MeshBuffers {
    /// Allocate zero-filled buffers for `vertex_count` vertices and `index_count` indices
    pub(crate) fn zeroed(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: vec![0.0; 3 * vertex_count],
            normals: vec![0.0; 3 * vertex_count],
            tex_coords: vec![0.0; 2 * vertex_count],
            indices: vec![0; index_count],
            emitted_vertex_count: 0,
            emitted_index_count: 0,
        }
    }

    pub(crate) fn set_emitted(&mut self, vertex_count: usize, index_count: usize) {
        self.emitted_vertex_count = vertex_count;
        self.emitted_index_count = index_count;
    }

    /// Build buffers from fully populated arrays (no slack)
    pub fn from_parts(
        positions: Vec<f32>,
        normals: Vec<f32>,
        tex_coords: Vec<f32>,
        indices: Vec<u16>,
    ) -> Result<Self, MeshError> {
        let buffers = Self {
            emitted_vertex_count: positions.len() / 3,
            emitted_index_count: indices.len(),
            positions,
            normals,
            tex_coords,
            indices,
        };
        buffers.check()?;
        Ok(buffers)
    }

    /// Check buffer lengths, the emitted range, and index bounds
    fn check(&self) -> Result<(), MeshError> {
        let invalid = |message: String| Err(MeshError::InvalidBuffers(message));
        if self.positions.len() % 3 != 0 {
            return invalid(format!(
                "{} position scalars is not a multiple of 3",
                self.positions.len()
            ));
        }
        let vertex_count = self.positions.len() / 3;
        if self.normals.len() != self.positions.len() {
            return invalid(format!(
                "{} normal scalars for {} vertices",
                self.normals.len(),
                vertex_count
            ));
        }
        if self.tex_coords.len() != 2 * vertex_count {
            return invalid(format!(
                "{} tex coord scalars for {} vertices",
                self.tex_coords.len(),
                vertex_count
            ));
        }
        if self.indices.len() % 3 != 0 {
            return invalid(format!(
                "{} indices is not a whole number of triangles",
                self.indices.len()
            ));
        }
        if self.emitted_vertex_count > vertex_count {
            return invalid(format!(
                "{} emitted vertices but only {} allocated",
                self.emitted_vertex_count, vertex_count
            ));
        }
        if self.emitted_index_count > self.indices.len() || self.emitted_index_count % 3 != 0 {
            return invalid(format!(
                "{} emitted indices does not fit {} allocated triangles",
                self.emitted_index_count,
                self.indices.len() / 3
            ));
        }
        let emitted = &self.indices[..self.emitted_index_count];
        if let Some(&bad) = emitted
            .iter()
            .find(|&&i| i as usize >= self.emitted_vertex_count)
        {
            return invalid(format!(
                "index {bad} out of range for {} vertices",
                self.emitted_vertex_count
            ));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return invalid(format!(
                "index {bad} out of range for {vertex_count} vertices"
            ));
        }
        Ok(())
    }

    /// Allocated vertex count (including slack)
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Allocated index count (including slack)
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of vertices holding generated data
    pub fn emitted_vertex_count(&self) -> usize {
        self.emitted_vertex_count
    }

    /// Number of indices holding generated data
    pub fn emitted_index_count(&self) -> usize {
        self.emitted_index_count
    }

    pub fn is_empty(&self) -> bool {
        self.emitted_index_count == 0
    }

    pub fn position(&self, index: usize) -> [f32; 3] {
        let at = 3 * index;
        [self.positions[at], self.positions[at + 1], self.positions[at + 2]]
    }

    pub fn normal(&self, index: usize) -> [f32; 3] {
        let at = 3 * index;
        [self.normals[at], self.normals[at + 1], self.normals[at + 2]]
    }

    pub fn tex_coord(&self, index: usize) -> [f32; 2] {
        let at = 2 * index;
        [self.tex_coords[at], self.tex_coords[at + 1]]
    }

    /// Iterate over emitted vertex positions
    pub fn positions_iter(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions[..3 * self.emitted_vertex_count]
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Iterate over emitted triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices[..self.emitted_index_count]
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Copy of the buffers without the zeroed tail
    pub fn trimmed(&self) -> Self {
        let vertices = self.emitted_vertex_count;
        Self {
            positions: self.positions[..3 * vertices].to_vec(),
            normals: self.normals[..3 * vertices].to_vec(),
            tex_coords: self.tex_coords[..2 * vertices].to_vec(),
            indices: self.indices[..self.emitted_index_count].to_vec(),
            emitted_vertex_count: vertices,
            emitted_index_count: self.emitted_index_count,
        }
    }

    /// Interleave the emitted vertices for GPU upload
    pub fn to_vertices(&self) -> Vec<MeshVertex> {
        (0..self.emitted_vertex_count)
            .map(|i| MeshVertex {
                position: self.position(i),
                normal: self.normal(i),
                tex_coord: self.tex_coord(i),
            })
            .collect()
    }

    /// Emitted indices as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices[..self.emitted_index_count])
    }

    /// Hand all four buffers to a mesh consumer, full length
    pub fn apply_to(&self, sink: &mut impl MeshSink) {
        sink.set_vertices(&self.positions);
        sink.set_normals(&self.normals);
        sink.set_tex_coords(&self.tex_coords);
        sink.set_triangles(&self.indices);
    }
}

/// Mesh file format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshFormat {
    #[default]
    Obj,
    Stl,
    Unknown,
}

impl MeshFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("obj") => MeshFormat::Obj,
            Some("stl") => MeshFormat::Stl,
            _ => MeshFormat::Unknown,
        }
    }

    /// Get format name
    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "OBJ",
            MeshFormat::Stl => "STL",
            MeshFormat::Unknown => "Unknown",
        }
    }

    /// Preferred file extension
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            MeshFormat::Obj => Some("obj"),
            MeshFormat::Stl => Some("stl"),
            MeshFormat::Unknown => None,
        }
    }
}

/// Save mesh buffers in the given format
pub fn save_mesh(
    buffers: &MeshBuffers,
    path: impl AsRef<Path>,
    format: MeshFormat,
) -> Result<(), MeshError> {
    let path = path.as_ref();
    match format {
        MeshFormat::Obj => save_obj(buffers, path),
        MeshFormat::Stl => save_stl(buffers, path),
        MeshFormat::Unknown => Err(MeshError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        )),
    }
}

/// Mesh-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("stack and slice counts must be > 0 (stacks={stacks}, slices={slices})")]
    InvalidArgument { stacks: u32, slices: u32 },
    #[error("Mesh needs {vertices} vertices, more than 16-bit indices can address")]
    IndexOverflow { vertices: u64 },
    #[error("Invalid mesh buffers: {0}")]
    InvalidBuffers(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Write error: {0}")]
    Write(String),
    #[error("Empty mesh: no geometry found")]
    EmptyMesh,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::generate_sphere;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<&'static str>,
        vertices: usize,
        triangles: usize,
    }

    impl MeshSink for RecordingSink {
        fn set_vertices(&mut self, vertices: &[f32]) {
            self.calls.push("vertices");
            self.vertices = vertices.len();
        }
        fn set_normals(&mut self, _normals: &[f32]) {
            self.calls.push("normals");
        }
        fn set_tex_coords(&mut self, _tex_coords: &[f32]) {
            self.calls.push("tex_coords");
        }
        fn set_triangles(&mut self, triangles: &[u16]) {
            self.calls.push("triangles");
            self.triangles = triangles.len();
        }
    }

    #[test]
    fn test_apply_to_forwards_full_buffers_in_order() {
        let mesh = generate_sphere(4, 6).unwrap();
        let mut sink = RecordingSink::default();
        mesh.apply_to(&mut sink);

        assert_eq!(sink.calls, ["vertices", "normals", "tex_coords", "triangles"]);
        assert_eq!(sink.vertices, mesh.positions.len());
        assert_eq!(sink.triangles, mesh.indices.len());
    }

    #[test]
    fn test_trimmed_drops_slack() {
        let mesh = generate_sphere(5, 4).unwrap();
        let trimmed = mesh.trimmed();
        assert_eq!(trimmed.vertex_count(), mesh.emitted_vertex_count());
        assert_eq!(trimmed.index_count(), mesh.emitted_index_count());
        assert!(trimmed.vertex_count() < mesh.vertex_count());
        assert_eq!(trimmed.triangles().count(), mesh.triangles().count());
    }

    #[test]
    fn test_from_parts_validation() {
        let ok = MeshBuffers::from_parts(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
        .unwrap();
        assert_eq!(ok.emitted_vertex_count(), 3);
        assert_eq!(ok.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);

        let err = MeshBuffers::from_parts(vec![0.0; 9], vec![0.0; 9], vec![0.0; 6], vec![0, 1, 3])
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidBuffers(_)));

        let err = MeshBuffers::from_parts(vec![0.0; 9], vec![0.0; 6], vec![0.0; 6], vec![0, 1, 2])
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidBuffers(_)));
    }

    #[test]
    fn test_ron_roundtrip_keeps_emitted_range() {
        let mesh = generate_sphere(3, 4).unwrap();
        let text = ron::to_string(&mesh).unwrap();
        let back: MeshBuffers = ron::from_str(&text).unwrap();
        assert_eq!(back, mesh);
        assert_eq!(back.emitted_vertex_count(), mesh.emitted_vertex_count());
    }

    #[test]
    fn test_deserialize_rejects_bad_emitted_counts() {
        let text = "(positions: [], normals: [], tex_coords: [], indices: [], \
                    emitted_vertex_count: 5, emitted_index_count: 3)";
        let err = ron::from_str::<MeshBuffers>(text).unwrap_err();
        assert!(err.to_string().contains("emitted"), "{err}");

        let text = "(positions: [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], \
                    normals: [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0], \
                    tex_coords: [0.0, 0.0, 1.0, 0.0, 0.0, 1.0], indices: [0, 1, 2], \
                    emitted_vertex_count: 2, emitted_index_count: 3)";
        let err = ron::from_str::<MeshBuffers>(text).unwrap_err();
        assert!(err.to_string().contains("index 2 out of range"), "{err}");
    }

    #[test]
    fn test_interleaved_vertices() {
        let mesh = generate_sphere(3, 5).unwrap();
        let vertices = mesh.to_vertices();
        assert_eq!(vertices.len(), mesh.emitted_vertex_count());
        assert_eq!(vertices[4].position, mesh.position(4));
        assert_eq!(vertices[4].tex_coord, mesh.tex_coord(4));
        assert_eq!(
            vertex_bytes(&vertices).len(),
            vertices.len() * std::mem::size_of::<MeshVertex>()
        );
        assert_eq!(mesh.index_bytes().len(), 2 * mesh.emitted_index_count());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(MeshFormat::from_path(Path::new("ball.obj")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("ball.STL")), MeshFormat::Stl);
        assert_eq!(MeshFormat::from_path(Path::new("ball.dae")), MeshFormat::Unknown);
        assert_eq!(MeshFormat::from_path(Path::new("ball")), MeshFormat::Unknown);
    }

    #[test]
    fn test_save_mesh_unknown_format() {
        let mesh = generate_sphere(2, 3).unwrap();
        let err = save_mesh(&mesh, "ball.ply", MeshFormat::Unknown).unwrap_err();
        assert_eq!(err, MeshError::UnsupportedFormat("ply".into()));
    }
}
