//! Primitive mesh generation
//!
//! Generates positions, normals, texture coordinates, and 16-bit triangle
//! indices for procedural shapes:
//! - Sphere (unit UV sphere with per-face vertices)

mod sphere;

pub use sphere::{SphereLayout, generate_sphere, generate_sphere_mesh};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_mesh() {
        let mesh = generate_sphere_mesh();
        assert!(mesh.emitted_vertex_count() > 0);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert!(mesh.emitted_index_count() % 3 == 0);
    }

    #[test]
    fn test_sphere_bounds() {
        let mesh = generate_sphere(12, 24).unwrap();
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in mesh.positions_iter() {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        for i in 0..3 {
            assert!((max[i] - min[i] - 2.0).abs() < 0.01, "axis {i}: {min:?} {max:?}");
        }
    }
}
