//! Sphere generation config file (RON)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SPHERE_NAME, SLICE_NUMBER, STACK_NUMBER};
use crate::mesh::{MeshBuffers, MeshError, MeshFormat};
use crate::primitive::{SphereLayout, generate_sphere};

/// Parameters for one sphere generation run
///
/// Omitted fields fall back to the defaults (18 stacks, 36 slices, OBJ).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Name given to the generated object
    pub name: String,
    /// Latitude bands
    pub stacks: u32,
    /// Longitude divisions
    pub slices: u32,
    /// Where to write the mesh, if anywhere
    pub output: Option<PathBuf>,
    /// Format used when `output` has no recognized extension
    pub format: MeshFormat,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SPHERE_NAME.to_string(),
            stacks: STACK_NUMBER,
            slices: SLICE_NUMBER,
            output: None,
            format: MeshFormat::default(),
        }
    }
}

impl SphereConfig {
    /// Check the tessellation without generating anything
    pub fn validate(&self) -> Result<SphereLayout, ConfigError> {
        Ok(SphereLayout::new(self.stacks, self.slices)?)
    }

    /// Generate the sphere described by this config
    pub fn generate(&self) -> Result<MeshBuffers, ConfigError> {
        Ok(generate_sphere(self.stacks, self.slices)?)
    }

    /// Output format: the output file extension wins over `format`
    pub fn resolved_format(&self) -> MeshFormat {
        match self.output.as_deref().map(MeshFormat::from_path) {
            Some(MeshFormat::Unknown) | None => self.format,
            Some(format) => format,
        }
    }

    /// Save config to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize config to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load config from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: SphereConfig =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        Ok(config)
    }

    /// Load config from bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        let content =
            std::str::from_utf8(data).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        let config: SphereConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        Ok(config)
    }
}

/// Config-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid config: {0}")]
    Invalid(#[from] MeshError),
}
