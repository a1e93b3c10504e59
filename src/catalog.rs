//! The list of systems offered in the sidebar.
//!
//! Built-in procedural assemblies are always available; a JSON catalog file can
//! replace them and add model files:
//!
//! ```json
//! { "systems": [
//!     { "id": "engine-main", "name": "Main Engine Assembly",
//!       "content": { "type": "procedural", "kind": "engine" } },
//!     { "id": "turbine", "name": "Turbine", "description": "Scanned rotor",
//!       "content": { "type": "asset", "path": "models/turbine.glb" } }
//! ] }
//! ```
//!
//! Relative asset paths resolve against the catalog file's directory.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::loader::AssetFormat;
use crate::model::{SystemContent, SystemDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub systems: Vec<SystemDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The three demo assemblies.
    pub fn builtin() -> Self {
        Self {
            systems: vec![
                SystemDescriptor::procedural(
                    "engine-main",
                    "Main Engine Assembly",
                    "Four-cylinder block with drive gear and output shaft",
                    "engine",
                ),
                SystemDescriptor::procedural(
                    "hydraulic-pump",
                    "Hydraulic Pump System",
                    "Centrifugal pump with motor, piping and relief valve",
                    "pump",
                ),
                SystemDescriptor::procedural(
                    "control-unit",
                    "Electronic Control Unit",
                    "Controller board with processor, capacitors and heat sink",
                    "control",
                ),
            ],
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text).context("Failed to parse catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file, resolving relative asset paths against its directory.
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let mut catalog =
            Self::from_json_str(&text).with_context(|| format!("Invalid catalog {}", path))?;
        if let Some(dir) = path.parent() {
            catalog.resolve_relative_to(dir);
        }
        Ok(catalog)
    }

    pub fn resolve_relative_to(&mut self, dir: &Utf8Path) {
        for system in &mut self.systems {
            if let SystemContent::Asset { path } = &mut system.content {
                if path.is_relative() {
                    *path = dir.join(&*path);
                }
            }
        }
    }

    /// Reject empty catalogs, duplicate ids and asset paths no loader handles.
    pub fn validate(&self) -> Result<()> {
        if self.systems.is_empty() {
            bail!("Catalog lists no systems");
        }
        let mut seen = HashSet::new();
        for system in &self.systems {
            if system.id.trim().is_empty() {
                bail!("System '{}' has an empty id", system.name);
            }
            if !seen.insert(system.id.as_str()) {
                bail!("Duplicate system id '{}'", system.id);
            }
            if let SystemContent::Asset { path } = &system.content {
                AssetFormat::from_path(path)
                    .with_context(|| format!("System '{}'", system.id))?;
            }
        }
        Ok(())
    }

    /// Append a system for a model file given on the command line.
    pub fn push_asset(&mut self, path: impl Into<Utf8PathBuf>) -> Result<&SystemDescriptor> {
        let path = path.into();
        AssetFormat::from_path(&path)?;
        let stem = path.file_stem().unwrap_or("model").to_string();
        let mut id = stem.clone();
        let mut n = 2;
        while self.position(&id).is_some() {
            id = format!("{}-{}", stem, n);
            n += 1;
        }
        let name = path.file_name().unwrap_or(stem.as_str()).to_string();
        self.systems.push(SystemDescriptor::asset(
            id,
            name,
            format!("Loaded from {}", path),
            path,
        ));
        Ok(&self.systems[self.systems.len() - 1])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.systems.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&SystemDescriptor> {
        self.systems.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
