//! Scene graph bookkeeping for scene objects
//!
//! Objects live in an arena keyed by id; parent/child links are kept in two
//! maps so there are no reference cycles between objects.

mod object;

use std::collections::HashMap;
use std::fmt::Write;

use glam::Mat4;
use tracing::debug;
use uuid::Uuid;

use crate::mesh::{Mesh, MeshError};
use crate::primitive::{generate_sphere, generate_sphere_mesh};

pub use object::{LodRange, RenderData, SceneObject, Transform};

/// A set of scene objects and the hierarchy between them
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: HashMap<Uuid, SceneObject>,
    /// Children mapping: parent -> ordered children
    children: HashMap<Uuid, Vec<Uuid>>,
    /// Parent mapping: child -> parent
    parent: HashMap<Uuid, Uuid>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root object, returns its ID
    pub fn add_object(&mut self, object: SceneObject) -> Uuid {
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    /// Generate a unit sphere and add it as a root object
    pub fn add_sphere(
        &mut self,
        name: impl Into<String>,
        stacks: u32,
        slices: u32,
    ) -> Result<Uuid, SceneError> {
        let buffers = generate_sphere(stacks, slices)?;
        let object = SceneObject::with_mesh(name, Mesh::from_buffers(buffers));
        debug!(name = %object.name, stacks, slices, "added sphere object");
        Ok(self.add_object(object))
    }

    /// Add a sphere with the default tessellation (18 stacks, 36 slices)
    pub fn add_default_sphere(&mut self, name: impl Into<String>) -> Uuid {
        let buffers = generate_sphere_mesh();
        self.add_object(SceneObject::with_mesh(name, Mesh::from_buffers(buffers)))
    }

    /// Remove an object and its whole subtree, returns the removed object
    pub fn remove_object(&mut self, id: Uuid) -> Result<SceneObject, SceneError> {
        if !self.objects.contains_key(&id) {
            return Err(SceneError::ObjectNotFound(id));
        }
        if let Some(parent) = self.parent.remove(&id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&c| c != id);
            }
        }

        let mut subtree = Vec::new();
        self.collect_depth_first(id, &mut subtree);
        let mut removed = None;
        for node in subtree {
            self.children.remove(&node);
            self.parent.remove(&node);
            let object = self.objects.remove(&node);
            if node == id {
                removed = object;
            }
        }
        removed.ok_or(SceneError::ObjectNotFound(id))
    }

    pub fn get(&self, id: Uuid) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Objects without a parent
    pub fn roots(&self) -> Vec<Uuid> {
        let mut roots: Vec<Uuid> = self
            .objects
            .keys()
            .filter(|id| !self.parent.contains_key(id))
            .copied()
            .collect();
        roots.sort();
        roots
    }

    pub fn set_name(&mut self, id: Uuid, name: impl Into<String>) -> Result<(), SceneError> {
        self.object_mut(id)?.name = name.into();
        Ok(())
    }

    /// Attach render data, replacing (and returning) any existing one
    pub fn attach_render_data(
        &mut self,
        id: Uuid,
        render_data: RenderData,
    ) -> Result<Option<RenderData>, SceneError> {
        Ok(self.object_mut(id)?.attach_render_data(render_data))
    }

    pub fn detach_render_data(&mut self, id: Uuid) -> Result<Option<RenderData>, SceneError> {
        Ok(self.object_mut(id)?.detach_render_data())
    }

    pub fn set_lod_range(&mut self, id: Uuid, min: f32, max: f32) -> Result<(), SceneError> {
        self.object_mut(id)?.set_lod_range(min, max)
    }

    // ============== Hierarchy ==============

    /// Make `child` the last child of `parent`
    ///
    /// A child that already has a parent is moved.
    pub fn add_child(&mut self, parent: Uuid, child: Uuid) -> Result<(), SceneError> {
        self.object(parent)?;
        self.object(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected);
        }

        if let Some(old_parent) = self.parent.insert(child, parent) {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|&c| c != child);
            }
        }
        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    /// Detach `child` from `parent`; the child becomes a root
    pub fn remove_child(&mut self, parent: Uuid, child: Uuid) -> Result<(), SceneError> {
        if self.parent.get(&child) != Some(&parent) {
            return Err(SceneError::NotAChild { parent, child });
        }
        self.parent.remove(&child);
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&c| c != child);
        }
        Ok(())
    }

    pub fn parent(&self, id: Uuid) -> Option<Uuid> {
        self.parent.get(&id).copied()
    }

    pub fn children(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_count(&self, id: Uuid) -> usize {
        self.children(id).len()
    }

    pub fn child_by_index(&self, id: Uuid, index: usize) -> Option<Uuid> {
        self.children(id).get(index).copied()
    }

    /// Whether `ancestor` is on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: Uuid, id: Uuid) -> bool {
        let mut current = self.parent.get(&id);
        while let Some(&p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent.get(&p);
        }
        false
    }

    /// Local-to-world matrix, composing parent transforms
    pub fn world_matrix(&self, id: Uuid) -> Result<Mat4, SceneError> {
        let mut matrix = self.object(id)?.transform.matrix();
        let mut current = self.parent.get(&id);
        while let Some(&p) = current {
            matrix = self.object(p)?.transform.matrix() * matrix;
            current = self.parent.get(&p);
        }
        Ok(matrix)
    }

    /// All objects in the subtree rooted at `id`, in depth-first order
    pub fn depth_first(&self, id: Uuid) -> Vec<Uuid> {
        let mut result = Vec::new();
        if self.objects.contains_key(&id) {
            self.collect_depth_first(id, &mut result);
        }
        result
    }

    fn collect_depth_first(&self, id: Uuid, result: &mut Vec<Uuid>) {
        result.push(id);
        for &child in self.children(id) {
            self.collect_depth_first(child, result);
        }
    }

    // ============== Queries ==============

    /// Case-sensitive search of the subtree rooted at `root`
    ///
    /// Returns every match, the root first if it matches. An empty name
    /// matches nothing.
    pub fn objects_by_name(&self, root: Uuid, name: &str) -> Vec<Uuid> {
        if name.is_empty() {
            return Vec::new();
        }
        self.depth_first(root)
            .into_iter()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.name == name))
            .collect()
    }

    /// Case-sensitive depth-first search for the first match
    ///
    /// Descendants are searched before `root` itself.
    pub fn object_by_name(&self, root: Uuid, name: &str) -> Option<Uuid> {
        if name.is_empty() {
            return None;
        }
        self.children(root)
            .iter()
            .find_map(|&child| self.find_in_subtree(child, name))
            .or_else(|| {
                self.objects
                    .get(&root)
                    .filter(|o| o.name == name)
                    .map(|o| o.id)
            })
    }

    fn find_in_subtree(&self, id: Uuid, name: &str) -> Option<Uuid> {
        if self.objects.get(&id).is_some_and(|o| o.name == name) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|&child| self.find_in_subtree(child, name))
    }

    /// Indented dump of the subtree rooted at `id`
    pub fn pretty_print(&self, id: Uuid) -> Result<String, SceneError> {
        let mut out = String::new();
        self.pretty_print_into(id, 0, &mut out)?;
        Ok(out)
    }

    fn pretty_print_into(&self, id: Uuid, indent: usize, out: &mut String) -> Result<(), SceneError> {
        let object = self.object(id)?;
        let pad = " ".repeat(indent);
        let inner = " ".repeat(indent + 2);
        writeln!(out, "{pad}SceneObject [name={}]", object.name)?;
        match object.render_data() {
            Some(render_data) => writeln!(out, "{inner}{render_data}")?,
            None => writeln!(out, "{inner}RenderData: none")?,
        }
        writeln!(out, "{inner}Transform: {}", object.transform)?;
        for &child in self.children(id) {
            self.pretty_print_into(child, indent + 2, out)?;
        }
        Ok(())
    }

    fn object(&self, id: Uuid) -> Result<&SceneObject, SceneError> {
        self.objects.get(&id).ok_or(SceneError::ObjectNotFound(id))
    }

    fn object_mut(&mut self, id: Uuid) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .get_mut(&id)
            .ok_or(SceneError::ObjectNotFound(id))
    }
}

/// Scene-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Scene object not found: {0}")]
    ObjectNotFound(Uuid),
    #[error("Invalid LOD range: {0}")]
    InvalidLodRange(String),
    #[error("Connection would create a cycle")]
    CycleDetected,
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: Uuid, child: Uuid },
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("Formatting error")]
    Format(#[from] std::fmt::Error),
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::constants::DEFAULT_SPHERE_NAME;

    use super::*;

    fn named(scene: &mut Scene, name: &str) -> Uuid {
        scene.add_object(SceneObject::new(name))
    }

    #[test]
    fn test_add_sphere() {
        let mut scene = Scene::new();
        let id = scene.add_sphere("globe", 3, 3).unwrap();
        let mesh = scene.get(id).unwrap().mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 9 + 4 * 3 * 3);
        assert_eq!(mesh.triangles().len(), 2 * 9 + 6 * 3 * 3);

        let err = scene.add_sphere("bad", 0, 3).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Mesh(MeshError::InvalidArgument { stacks: 0, slices: 3 })
        ));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_default_sphere() {
        let mut scene = Scene::new();
        let id = scene.add_default_sphere(DEFAULT_SPHERE_NAME);
        let object = scene.get(id).unwrap();
        assert_eq!(object.name, DEFAULT_SPHERE_NAME);
        let expected = Mesh::from_buffers(generate_sphere(18, 36).unwrap());
        assert_eq!(object.mesh(), Some(&expected));
    }

    #[test]
    fn test_children_bookkeeping() {
        let mut scene = Scene::new();
        let root = named(&mut scene, "root");
        let a = named(&mut scene, "a");
        let b = named(&mut scene, "b");

        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        assert_eq!(scene.children_count(root), 2);
        assert_eq!(scene.child_by_index(root, 1), Some(b));
        assert_eq!(scene.child_by_index(root, 2), None);
        assert_eq!(scene.parent(a), Some(root));
        assert_eq!(scene.roots(), vec![root]);

        scene.remove_child(root, a).unwrap();
        assert_eq!(scene.children(root), &[b]);
        assert_eq!(scene.parent(a), None);
        assert!(matches!(
            scene.remove_child(root, a),
            Err(SceneError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_reparent_moves_child() {
        let mut scene = Scene::new();
        let first = named(&mut scene, "first");
        let second = named(&mut scene, "second");
        let child = named(&mut scene, "child");

        scene.add_child(first, child).unwrap();
        scene.add_child(second, child).unwrap();
        assert_eq!(scene.children_count(first), 0);
        assert_eq!(scene.children(second), &[child]);
        assert_eq!(scene.parent(child), Some(second));
    }

    #[test]
    fn test_rejects_cycles() {
        let mut scene = Scene::new();
        let a = named(&mut scene, "a");
        let b = named(&mut scene, "b");
        let c = named(&mut scene, "c");
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        assert!(matches!(scene.add_child(c, a), Err(SceneError::CycleDetected)));
        assert!(matches!(scene.add_child(a, a), Err(SceneError::CycleDetected)));
        assert!(matches!(
            scene.add_child(a, Uuid::new_v4()),
            Err(SceneError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_remove_object_drops_subtree() {
        let mut scene = Scene::new();
        let root = named(&mut scene, "root");
        let mid = named(&mut scene, "mid");
        let leaf = named(&mut scene, "leaf");
        scene.add_child(root, mid).unwrap();
        scene.add_child(mid, leaf).unwrap();

        let removed = scene.remove_object(mid).unwrap();
        assert_eq!(removed.name, "mid");
        assert_eq!(scene.len(), 1);
        assert!(scene.get(leaf).is_none());
        assert_eq!(scene.children_count(root), 0);
    }

    #[test]
    fn test_name_queries() {
        let mut scene = Scene::new();
        let root = named(&mut scene, "ball");
        let a = named(&mut scene, "arm");
        let b = named(&mut scene, "ball");
        let c = named(&mut scene, "Ball");
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(root, c).unwrap();

        assert_eq!(scene.objects_by_name(root, "ball"), vec![root, b]);
        assert!(scene.objects_by_name(root, "").is_empty());
        assert!(scene.objects_by_name(root, "missing").is_empty());

        // descendants win over the root
        assert_eq!(scene.object_by_name(root, "ball"), Some(b));
        assert_eq!(scene.object_by_name(root, "Ball"), Some(c));
        assert_eq!(scene.object_by_name(a, "arm"), Some(a));
        assert_eq!(scene.object_by_name(root, ""), None);
    }

    #[test]
    fn test_world_matrix() {
        let mut scene = Scene::new();
        let parent = named(&mut scene, "parent");
        let child = named(&mut scene, "child");
        scene.get_mut(parent).unwrap().transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        scene.get_mut(child).unwrap().transform = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        scene.add_child(parent, child).unwrap();

        let world = scene.world_matrix(child).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_scene_level_component_ops() {
        let mut scene = Scene::new();
        let id = scene.add_sphere("ball", 2, 4).unwrap();
        scene.set_name(id, "renamed").unwrap();
        scene.set_lod_range(id, 0.5, 20.0).unwrap();
        assert!(scene.set_lod_range(id, 30.0, 20.0).is_err());

        let object = scene.get(id).unwrap();
        assert_eq!(object.name, "renamed");
        assert_eq!(object.lod_range(), LodRange { min: 0.5, max: 20.0 });

        assert!(scene.detach_render_data(id).unwrap().is_some());
        assert!(scene.get(id).unwrap().render_data().is_none());
        assert!(scene.attach_render_data(id, RenderData::new()).unwrap().is_none());
        assert!(matches!(
            scene.set_name(Uuid::new_v4(), "x"),
            Err(SceneError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_pretty_print() {
        let mut scene = Scene::new();
        let root = scene.add_sphere("globe", 1, 4).unwrap();
        let child = named(&mut scene, "marker");
        scene.add_child(root, child).unwrap();

        let dump = scene.pretty_print(root).unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "SceneObject [name=globe]");
        assert_eq!(lines[1], "  RenderData [mesh: 40 vertices, 16 triangles]");
        assert!(lines[2].starts_with("  Transform: position=(0, 0, 0)"));
        assert_eq!(lines[3], "  SceneObject [name=marker]");
        assert_eq!(lines[4], "    RenderData: none");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_pretty_print_unknown_object() {
        let scene = Scene::new();
        let id = Uuid::new_v4();
        let err = scene.pretty_print(id).unwrap_err();
        assert!(matches!(err, SceneError::ObjectNotFound(missing) if missing == id));
    }
}
