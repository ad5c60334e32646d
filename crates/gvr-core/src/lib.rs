//! GVR procedural geometry core
//!
//! This crate contains the geometry side of the framework's scene objects:
//! - Primitive: deterministic unit sphere generation
//! - Mesh: flat mesh buffers, the mesh consumer trait, OBJ/STL export
//! - Scene: scene objects owning render data, and their hierarchy
//! - Config: RON config for sphere generation runs

pub mod config;
pub mod constants;
pub mod mesh;
pub mod primitive;
pub mod scene;

pub use config::*;
pub use constants::*;
pub use mesh::*;
pub use primitive::*;
pub use scene::*;
