//! Sphere mesh generation (unit UV sphere, one private vertex block per face)
//!
//! The sphere is built in three passes: a bottom cap fan, the body quads
//! between the two polar rows, and a top cap fan. No vertex is shared between
//! faces, so every triangle keeps exact texture coordinates and normals.

use std::f64::consts::PI;

use tracing::debug;

use crate::constants::{MAX_INDEXED_VERTICES, SLICE_NUMBER, STACK_NUMBER};
use crate::mesh::{MeshBuffers, MeshError};

/// Buffer sizes for a sphere tessellation
///
/// `vertex_count` and `index_count` are the nominal sizes the buffers are
/// allocated with. They count `stacks` body rows although the body pass only
/// visits `stacks - 2` of them, so the tail of every buffer stays zeroed.
/// The `emitted_*` counts cover what the three passes actually write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereLayout {
    pub stacks: u32,
    pub slices: u32,
    pub vertex_count: usize,
    pub index_count: usize,
    pub emitted_vertex_count: usize,
    pub emitted_index_count: usize,
}

impl SphereLayout {
    /// Validate the tessellation and compute its buffer sizes
    pub fn new(stacks: u32, slices: u32) -> Result<Self, MeshError> {
        if stacks == 0 || slices == 0 {
            return Err(MeshError::InvalidArgument { stacks, slices });
        }

        let slices_n = u64::from(slices);
        let stacks_n = u64::from(stacks);
        let body_stacks = stacks_n.saturating_sub(2);
        let cap_vertex_count = 3 * slices_n;

        let emitted_vertex_count = (4 * slices_n)
            .saturating_mul(body_stacks)
            .saturating_add(2 * cap_vertex_count);
        if emitted_vertex_count > MAX_INDEXED_VERTICES {
            return Err(MeshError::IndexOverflow {
                vertices: emitted_vertex_count,
            });
        }

        // Bounded by the check above: slices * stacks stays well inside usize.
        Ok(Self::sized(stacks, slices))
    }

    fn sized(stacks: u32, slices: u32) -> Self {
        let slices_n = slices as usize;
        let grid = slices_n * stacks as usize;
        let body = slices_n * stacks.saturating_sub(2) as usize;
        let cap = 3 * slices_n;

        Self {
            stacks,
            slices,
            vertex_count: 2 * cap + 4 * grid,
            index_count: 2 * cap + 6 * grid,
            emitted_vertex_count: 2 * cap + 4 * body,
            emitted_index_count: 2 * cap + 6 * body,
        }
    }

    /// Number of triangles written by the generator
    pub fn emitted_triangle_count(&self) -> usize {
        self.emitted_index_count / 3
    }
}

impl Default for SphereLayout {
    fn default() -> Self {
        Self::sized(STACK_NUMBER, SLICE_NUMBER)
    }
}

/// Generate the default unit sphere (18 stacks, 36 slices)
pub fn generate_sphere_mesh() -> MeshBuffers {
    let layout = SphereLayout::default();
    build(&layout)
}

/// Generate a unit sphere with custom tessellation
///
/// # Arguments
/// * `stacks` - Number of latitude bands (> 0)
/// * `slices` - Number of longitude divisions (> 0)
///
/// # Errors
/// [`MeshError::InvalidArgument`] if either count is zero, and
/// [`MeshError::IndexOverflow`] if the sphere needs more vertices than a
/// 16-bit index can reach. Both are reported before anything is allocated.
pub fn generate_sphere(stacks: u32, slices: u32) -> Result<MeshBuffers, MeshError> {
    let layout = SphereLayout::new(stacks, slices)?;
    Ok(build(&layout))
}

fn build(layout: &SphereLayout) -> MeshBuffers {
    let mut buffers = MeshBuffers::zeroed(layout.vertex_count, layout.index_count);
    let mut cursor = Cursor::default();

    write_cap(&mut buffers, &mut cursor, layout, Cap::Bottom);
    write_body(&mut buffers, &mut cursor, layout);
    write_cap(&mut buffers, &mut cursor, layout, Cap::Top);

    debug_assert_eq!(cursor.base_vertex as usize, layout.emitted_vertex_count);
    debug_assert_eq!(cursor.index, layout.emitted_index_count);
    buffers.set_emitted(layout.emitted_vertex_count, layout.emitted_index_count);

    debug!(
        stacks = layout.stacks,
        slices = layout.slices,
        vertices = layout.emitted_vertex_count,
        triangles = layout.emitted_triangle_count(),
        "generated sphere mesh"
    );

    buffers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cap {
    Bottom,
    Top,
}

/// Running write offsets, threaded through the three generation passes
#[derive(Debug, Default)]
struct Cursor {
    /// Scalar offset into positions/normals
    vertex: usize,
    /// Scalar offset into tex_coords
    tex_coord: usize,
    /// Offset into indices
    index: usize,
    /// First vertex of the face being written
    base_vertex: u32,
}

impl Cursor {
    /// Write one face: its private vertices, their texture coordinates, and
    /// its triangle indices relative to the face's first vertex.
    fn emit(
        &mut self,
        buffers: &mut MeshBuffers,
        points: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
        winding: &[u32],
    ) {
        for (i, point) in points.iter().enumerate() {
            let at = self.vertex + 3 * i;
            buffers.positions[at..at + 3].copy_from_slice(point);
            // Unit sphere at the origin: the normal is the position.
            buffers.normals[at..at + 3].copy_from_slice(point);
        }
        for (i, st) in tex_coords.iter().enumerate() {
            let at = self.tex_coord + 2 * i;
            buffers.tex_coords[at..at + 2].copy_from_slice(st);
        }
        for (i, offset) in winding.iter().enumerate() {
            // In range: the layout rejected anything past the 16-bit limit.
            buffers.indices[self.index + i] = (self.base_vertex + offset) as u16;
        }

        self.vertex += 3 * points.len();
        self.tex_coord += 2 * tex_coords.len();
        self.index += winding.len();
        self.base_vertex += points.len() as u32;
    }
}

/// A row of constant polar angle
#[derive(Debug, Clone, Copy)]
struct Ring {
    sin_theta: f64,
    cos_theta: f64,
}

impl Ring {
    fn at(fraction: f32) -> Self {
        let theta = f64::from(fraction) * PI;
        Self {
            sin_theta: theta.sin(),
            cos_theta: theta.cos(),
        }
    }

    fn point(&self, phi: f64) -> [f32; 3] {
        [
            (self.sin_theta * phi.cos()) as f32,
            (self.sin_theta * phi.sin()) as f32,
            self.cos_theta as f32,
        ]
    }
}

fn fraction(numerator: u32, denominator: u32) -> f32 {
    numerator as f32 / denominator as f32
}

fn azimuth(v: f32) -> f64 {
    f64::from(v) * 2.0 * PI
}

fn write_cap(buffers: &mut MeshBuffers, cursor: &mut Cursor, layout: &SphereLayout, cap: Cap) {
    let stacks = layout.stacks;
    let (t0, t1) = match cap {
        Cap::Bottom => (fraction(1, stacks), 0.0),
        Cap::Top => (fraction(stacks - 1, stacks), 1.0),
    };
    let winding: [u32; 3] = match cap {
        Cap::Bottom => [0, 1, 2],
        Cap::Top => [1, 0, 2],
    };
    let ring1 = Ring::at(t0);
    let ring2 = Ring::at(t1);

    for slice in 0..layout.slices {
        let s0 = fraction(slice, layout.slices);
        let s1 = fraction(slice + 1, layout.slices);
        let s2 = (s0 + s1) / 2.0;
        let phi1 = azimuth(s0);
        let phi2 = azimuth(s1);

        cursor.emit(
            buffers,
            &[ring1.point(phi1), ring1.point(phi2), ring2.point(phi1)],
            &[[s0, t0], [s1, t0], [s2, t1]],
            &winding,
        );
    }
}

fn write_body(buffers: &mut MeshBuffers, cursor: &mut Cursor, layout: &SphereLayout) {
    // The polar rows belong to the caps.
    for stack in 1..layout.stacks.saturating_sub(1) {
        let t0 = fraction(stack, layout.stacks);
        let t1 = fraction(stack + 1, layout.stacks);
        let ring1 = Ring::at(t0);
        let ring2 = Ring::at(t1);

        for slice in 0..layout.slices {
            let s0 = fraction(slice, layout.slices);
            let s1 = fraction(slice + 1, layout.slices);
            let phi1 = azimuth(s0);
            let phi2 = azimuth(s1);

            cursor.emit(
                buffers,
                &[
                    ring1.point(phi1),
                    ring1.point(phi2),
                    ring2.point(phi1),
                    ring2.point(phi2),
                ],
                &[[s0, t0], [s1, t0], [s0, t1], [s1, t1]],
                &[0, 2, 1, 2, 3, 1],
            );
        }
    }
}
