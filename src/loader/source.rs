//! Byte source abstraction for model files, with chunked progress reporting.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};

/// Trait for abstracting where model bytes come from (filesystem, memory, ...).
pub trait AssetSource: Send {
    /// Open the file at `path`, returning a reader and its size when known.
    fn open(&mut self, path: &Utf8Path) -> io::Result<(Box<dyn Read + Send>, Option<u64>)>;

    /// Directory external references (e.g. `.bin` buffers of a `.gltf`) resolve against.
    fn base_dir(&self, _path: &Utf8Path) -> Option<Utf8PathBuf> {
        None
    }
}

impl<T: AssetSource + ?Sized> AssetSource for Box<T> {
    fn open(&mut self, path: &Utf8Path) -> io::Result<(Box<dyn Read + Send>, Option<u64>)> {
        (**self).open(path)
    }

    fn base_dir(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        (**self).base_dir(path)
    }
}

/// Reads files directly from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl AssetSource for FsSource {
    fn open(&mut self, path: &Utf8Path) -> io::Result<(Box<dyn Read + Send>, Option<u64>)> {
        let file = std::fs::File::open(path.as_std_path())?;
        let len = file.metadata().ok().map(|m| m.len());
        Ok((Box::new(io::BufReader::new(file)), len))
    }

    fn base_dir(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        path.parent().map(Utf8Path::to_path_buf)
    }
}

/// Shared flag telling a running load to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bytes read so far out of the expected total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    /// Fraction in `0.0..=1.0`, `None` when the size is unknown.
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(0) => Some(1.0),
            Some(t) => Some((self.loaded as f64 / t as f64).min(1.0) as f32),
            None => None,
        }
    }
}

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Read `reader` to the end in [`CHUNK_SIZE`] pieces, reporting progress after
/// each piece. Returns `Ok(None)` when cancelled midway.
pub fn read_with_progress(
    reader: &mut dyn Read,
    total: Option<u64>,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(Progress),
) -> io::Result<Option<Vec<u8>>> {
    let mut out = Vec::with_capacity(total.unwrap_or(0).min(256 * 1024 * 1024) as usize);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.extend_from_slice(&buf[..n]);
        on_progress(Progress {
            loaded: out.len() as u64,
            total,
        });
    }
    Ok(Some(out))
}
