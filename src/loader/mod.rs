//! Model file loading.
//!
//! - [`source`] – byte sources, cancellation and progress
//! - `gltf_scene` – `.glb` / `.gltf` decoding
//! - `obj_scene` – Wavefront `.obj` decoding
//! - [`task`] – background loading with progress events

mod gltf_scene;
mod obj_scene;
pub mod source;
pub mod task;

pub use source::*;
pub use task::{AssetLoad, LoadEvent, LoadPoll};

use camino::Utf8Path;
use thiserror::Error;

use crate::scene::SceneGraph;

/// Errors that can occur while loading a model file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unsupported model format: {path} (expected .glb, .gltf or .obj)")]
    UnsupportedFormat { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Invalid OBJ: {message}")]
    Obj { message: String },

    #[error("{path} contains no triangle meshes")]
    Empty { path: String },

    #[error("Load cancelled")]
    Cancelled,

    #[error("Loader stopped before finishing")]
    Interrupted,
}

/// Decoder chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// glTF 2.0, binary container (`.glb`) or JSON (`.gltf`).
    Gltf,
    /// Wavefront OBJ.
    Obj,
}

impl AssetFormat {
    pub fn from_path(path: &Utf8Path) -> Result<Self, LoadError> {
        let ext = path.extension().map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("glb") | Some("gltf") => Ok(AssetFormat::Gltf),
            Some("obj") => Ok(AssetFormat::Obj),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetFormat::Gltf => "glTF",
            AssetFormat::Obj => "OBJ",
        }
    }
}

/// Read and decode `path` from `source`, reporting read progress.
pub fn load_scene<S: AssetSource + ?Sized>(
    source: &mut S,
    path: &Utf8Path,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(Progress),
) -> Result<SceneGraph, LoadError> {
    let format = AssetFormat::from_path(path)?;
    let io_err = |e| LoadError::Io {
        path: path.to_string(),
        source: e,
    };
    let (mut reader, total) = source.open(path).map_err(io_err)?;
    on_progress(Progress { loaded: 0, total });
    let bytes = read_with_progress(reader.as_mut(), total, cancel, &mut on_progress)
        .map_err(io_err)?
        .ok_or(LoadError::Cancelled)?;
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }

    let scene = match format {
        AssetFormat::Gltf => {
            let base = source.base_dir(path);
            gltf_scene::decode(&bytes, base.as_deref().map(Utf8Path::as_std_path))?
        }
        AssetFormat::Obj => obj_scene::decode(&bytes, path.file_stem().unwrap_or("Model"))?,
    };
    if scene.mesh_nodes().is_empty() {
        return Err(LoadError::Empty {
            path: path.to_string(),
        });
    }
    log::info!(
        "decoded {} ({}, {} bytes, {} nodes)",
        path,
        format.name(),
        bytes.len(),
        scene.len()
    );
    Ok(scene)
}
