//! Scene object and its components

use std::fmt;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_LOD_RANGE;
use crate::mesh::Mesh;

use super::SceneError;

/// Local transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local-to-parent matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        let r = self.rotation;
        let s = self.scale;
        write!(
            f,
            "position=({}, {}, {}) rotation=({}, {}, {}, {}) scale=({}, {}, {})",
            p.x, p.y, p.z, r.w, r.x, r.y, r.z, s.x, s.y, s.z
        )
    }
}

/// Rendering data attached to a scene object
///
/// An object without render data is not drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderData {
    mesh: Option<Mesh>,
}

impl RenderData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh(mesh: Mesh) -> Self {
        Self { mesh: Some(mesh) }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = Some(mesh);
    }
}

impl fmt::Display for RenderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mesh {
            Some(mesh) => write!(
                f,
                "RenderData [mesh: {} vertices, {} triangles]",
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
            None => write!(f, "RenderData [mesh: none]"),
        }
    }
}

/// Camera distance range in which an object is shown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodRange {
    pub min: f32,
    pub max: f32,
}

impl Default for LodRange {
    fn default() -> Self {
        let (min, max) = DEFAULT_LOD_RANGE;
        Self { min, max }
    }
}

impl LodRange {
    pub fn new(min: f32, max: f32) -> Result<Self, SceneError> {
        if !(min >= 0.0 && max >= 0.0) {
            return Err(SceneError::InvalidLodRange(format!(
                "bounds must be between 0 and f32::MAX (min={min}, max={max})"
            )));
        }
        if min > max {
            return Err(SceneError::InvalidLodRange(format!(
                "min ({min}) is greater than max ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, distance: f32) -> bool {
        (self.min..=self.max).contains(&distance)
    }
}

/// A node in the scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: Uuid,
    pub name: String,
    pub transform: Transform,
    /// Whether eye picking should consider this object
    pub picking_enabled: bool,
    render_data: Option<RenderData>,
    lod_range: LodRange,
}

impl SceneObject {
    /// Create an empty, invisible object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            transform: Transform::default(),
            picking_enabled: false,
            render_data: None,
            lod_range: LodRange::default(),
        }
    }

    /// Create an object that renders the given mesh
    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let mut object = Self::new(name);
        object.attach_render_data(RenderData::with_mesh(mesh));
        object
    }

    /// Attach render data, returning whatever was attached before
    pub fn attach_render_data(&mut self, render_data: RenderData) -> Option<RenderData> {
        self.render_data.replace(render_data)
    }

    pub fn detach_render_data(&mut self) -> Option<RenderData> {
        self.render_data.take()
    }

    pub fn render_data(&self) -> Option<&RenderData> {
        self.render_data.as_ref()
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.render_data.as_ref().and_then(RenderData::mesh)
    }

    pub fn lod_range(&self) -> LodRange {
        self.lod_range
    }

    /// Set the camera distance range in which this object is shown
    pub fn set_lod_range(&mut self, min: f32, max: f32) -> Result<(), SceneError> {
        self.lod_range = LodRange::new(min, max)?;
        Ok(())
    }
}
