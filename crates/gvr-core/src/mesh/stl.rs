//! Binary STL export

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::normals::calculate_triangle_normal;
use super::{MeshBuffers, MeshError};

fn to_triangles(buffers: &MeshBuffers) -> Vec<stl_io::Triangle> {
    buffers
        .triangles()
        .map(|[a, b, c]| {
            let v0 = buffers.position(a as usize);
            let v1 = buffers.position(b as usize);
            let v2 = buffers.position(c as usize);
            stl_io::Triangle {
                normal: stl_io::Normal::new(calculate_triangle_normal(v0, v1, v2)),
                vertices: [
                    stl_io::Vertex::new(v0),
                    stl_io::Vertex::new(v1),
                    stl_io::Vertex::new(v2),
                ],
            }
        })
        .collect()
}

/// Write the emitted triangles as binary STL
pub fn write_stl(buffers: &MeshBuffers, writer: &mut impl Write) -> Result<(), MeshError> {
    if buffers.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    let triangles = to_triangles(buffers);
    stl_io::write_stl(writer, triangles.iter()).map_err(|e| MeshError::Write(e.to_string()))
}

/// Save mesh buffers as a binary STL file
pub fn save_stl(buffers: &MeshBuffers, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path).map_err(|e| MeshError::Io(e.to_string()))?;
    write_stl(buffers, &mut file)?;

    info!(
        "Saved STL '{}' ({} triangles)",
        path.display(),
        buffers.emitted_index_count() / 3
    );
    Ok(())
}
