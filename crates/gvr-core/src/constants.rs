//! Global constants for gvr-core

/// Default number of stacks (latitude bands) for sphere generation
pub const STACK_NUMBER: u32 = 18;

/// Default number of slices (longitude divisions) for sphere generation
pub const SLICE_NUMBER: u32 = 36;

/// Number of distinct vertices a 16-bit index buffer can address
pub const MAX_INDEXED_VERTICES: u64 = u16::MAX as u64 + 1;

/// Default name given to sphere scene objects
pub const DEFAULT_SPHERE_NAME: &str = "sphere";

/// Default LOD range (minimum, maximum) distance from the camera
pub const DEFAULT_LOD_RANGE: (f32, f32) = (0.0, f32::MAX);
