//! Wavefront OBJ export and import

use std::io::{BufRead, BufWriter, Cursor, Write};
use std::path::Path;

use tracing::{info, warn};

use super::{MeshBuffers, MeshError};

/// Write the emitted part of the buffers as OBJ text
///
/// Every vertex gets its own `v`/`vt`/`vn` triple and faces reference all
/// three with the same 1-based index.
pub fn write_obj(buffers: &MeshBuffers, writer: &mut impl Write) -> Result<(), MeshError> {
    let io = |e: std::io::Error| MeshError::Write(e.to_string());
    let vertices = buffers.emitted_vertex_count();

    writeln!(writer, "# gvr-core mesh: {} vertices", vertices).map_err(io)?;
    for i in 0..vertices {
        let [x, y, z] = buffers.position(i);
        writeln!(writer, "v {x} {y} {z}").map_err(io)?;
    }
    for i in 0..vertices {
        let [s, t] = buffers.tex_coord(i);
        writeln!(writer, "vt {s} {t}").map_err(io)?;
    }
    for i in 0..vertices {
        let [x, y, z] = buffers.normal(i);
        writeln!(writer, "vn {x} {y} {z}").map_err(io)?;
    }
    for [a, b, c] in buffers.triangles() {
        let (a, b, c) = (u32::from(a) + 1, u32::from(b) + 1, u32::from(c) + 1);
        writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(io)?;
    }
    Ok(())
}

/// Save mesh buffers as an OBJ file
pub fn save_obj(buffers: &MeshBuffers, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| MeshError::Io(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    write_obj(buffers, &mut writer)?;
    writer.flush().map_err(|e| MeshError::Io(e.to_string()))?;

    info!(
        "Saved OBJ '{}' ({} triangles)",
        path.display(),
        buffers.emitted_index_count() / 3
    );
    Ok(())
}

/// Load an OBJ file into mesh buffers
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshBuffers, MeshError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| MeshError::Io(e.to_string()))?;
    let buffers = load_obj_from_bytes(&data)?;
    info!(
        "Loaded OBJ '{}' ({} vertices)",
        path.display(),
        buffers.emitted_vertex_count()
    );
    Ok(buffers)
}

/// Load an OBJ from bytes into mesh buffers
pub fn load_obj_from_bytes(data: &[u8]) -> Result<MeshBuffers, MeshError> {
    let mut cursor = Cursor::new(data);
    load_obj_from_reader(&mut cursor)
}

fn load_obj_from_reader(reader: &mut impl BufRead) -> Result<MeshBuffers, MeshError> {
    let (models, _materials) = tobj::load_obj_buf(
        reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| MeshError::Parse(e.to_string()))?;

    if models.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Combine all models into one set of buffers
    let mut positions: Vec<f32> = Vec::new();
    let mut normals: Vec<f32> = Vec::new();
    let mut tex_coords: Vec<f32> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let vertex_offset = (positions.len() / 3) as u32;
        let vertex_count = mesh.positions.len() / 3;

        positions.extend_from_slice(&mesh.positions[..3 * vertex_count]);

        if mesh.normals.len() == 3 * vertex_count {
            normals.extend_from_slice(&mesh.normals);
        } else {
            warn!("OBJ model '{}' has no per-vertex normals", model.name);
            normals.extend(std::iter::repeat_n(0.0, 3 * vertex_count));
        }

        if mesh.texcoords.len() == 2 * vertex_count {
            tex_coords.extend_from_slice(&mesh.texcoords);
        } else {
            tex_coords.extend(std::iter::repeat_n(0.0, 2 * vertex_count));
        }

        for &idx in &mesh.indices {
            let index = vertex_offset + idx;
            let index = u16::try_from(index).map_err(|_| MeshError::IndexOverflow {
                vertices: u64::from(index) + 1,
            })?;
            indices.push(index);
        }
    }

    if indices.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    MeshBuffers::from_parts(positions, normals, tex_coords, indices)
}
