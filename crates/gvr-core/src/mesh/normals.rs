//! Face normal utilities for mesh data

use glam::Vec3;

/// Calculate the unit normal of a counter-clockwise triangle
///
/// Degenerate triangles get `+Z`.
pub fn calculate_triangle_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let (a, b, c) = (Vec3::from(v0), Vec3::from(v1), Vec3::from(v2));
    (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Z).to_array()
}

/// Calculate one face normal per triangle
///
/// Returns `None` if any index is out of range for `positions`.
pub fn calculate_face_normals(positions: &[[f32; 3]], indices: &[u16]) -> Option<Vec<[f32; 3]>> {
    indices
        .chunks_exact(3)
        .map(|t| {
            let corner = |i: u16| positions.get(i as usize).copied();
            Some(calculate_triangle_normal(
                corner(t[0])?,
                corner(t[1])?,
                corner(t[2])?,
            ))
        })
        .collect()
}

/// Whether a triangle's winding points away from the origin
pub fn is_outward_facing(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> bool {
    let (a, b, c) = (Vec3::from(v0), Vec3::from(v1), Vec3::from(v2));
    let centroid = (a + b + c) / 3.0;
    (b - a).cross(c - a).dot(centroid) > 0.0
}
