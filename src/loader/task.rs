//! Background loading of a model file.
//!
//! The worker thread streams [`LoadEvent`]s through a channel; the UI thread
//! calls [`AssetLoad::poll`] once per frame. Dropping an [`AssetLoad`] cancels
//! the worker and discards whatever it still sends.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use super::{AssetSource, CancelToken, LoadError, Progress, load_scene};
use crate::scene::SceneGraph;

/// Called from the worker thread after each event, e.g. to request a repaint.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug)]
pub enum LoadEvent {
    Progress(Progress),
    Finished(Result<SceneGraph, LoadError>),
}

/// Result of draining pending events.
#[derive(Debug)]
pub enum LoadPoll {
    Pending(Progress),
    Done(Result<SceneGraph, LoadError>),
}

pub struct AssetLoad {
    path: Utf8PathBuf,
    rx: flume::Receiver<LoadEvent>,
    cancel: CancelToken,
    progress: Progress,
    done: bool,
}

impl AssetLoad {
    /// Start loading `path` from `source` on a new thread.
    pub fn spawn<S: AssetSource + 'static>(
        path: impl Into<Utf8PathBuf>,
        mut source: S,
        waker: Option<Waker>,
    ) -> Self {
        let path = path.into();
        let (tx, rx) = flume::unbounded();
        let cancel = CancelToken::new();

        let worker_path = path.clone();
        let worker_cancel = cancel.clone();
        let worker_tx = tx.clone();
        let worker_waker = waker.clone();
        let spawned = std::thread::Builder::new()
            .name("asset-load".to_string())
            .spawn(move || {
                let notify = |event: LoadEvent| {
                    // The receiver is gone once the load was dropped; nothing to report.
                    let _ = worker_tx.send(event);
                    if let Some(w) = &worker_waker {
                        w();
                    }
                };
                let result = load_scene(&mut source, &worker_path, &worker_cancel, |p| {
                    notify(LoadEvent::Progress(p))
                });
                if let Err(e) = &result {
                    log::warn!("loading {} failed: {}", worker_path, e);
                }
                notify(LoadEvent::Finished(result));
            });
        if let Err(e) = spawned {
            let _ = tx.send(LoadEvent::Finished(Err(LoadError::Io {
                path: path.to_string(),
                source: e,
            })));
        }
        log::info!("loading {}", path);

        Self {
            path,
            rx,
            cancel,
            progress: Progress::default(),
            done: false,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drain pending events without blocking.
    ///
    /// Returns `Done` exactly once; later calls keep reporting the last progress.
    pub fn poll(&mut self) -> LoadPoll {
        if self.done {
            return LoadPoll::Pending(self.progress);
        }
        loop {
            match self.rx.try_recv() {
                Ok(LoadEvent::Progress(p)) => self.progress = p,
                Ok(LoadEvent::Finished(result)) => {
                    self.done = true;
                    return LoadPoll::Done(result);
                }
                Err(flume::TryRecvError::Empty) => return LoadPoll::Pending(self.progress),
                Err(flume::TryRecvError::Disconnected) => {
                    self.done = true;
                    return LoadPoll::Done(Err(LoadError::Interrupted));
                }
            }
        }
    }
}

impl Drop for AssetLoad {
    fn drop(&mut self) {
        if !self.done {
            self.cancel.cancel();
        }
    }
}
