//! Background model loading.
//!
//! [`ModelLoader`] reads and parses a model on a worker thread so the window
//! keeps rendering while a large file loads. The render loop calls
//! [`ModelLoader::poll`] once per frame; the worker reports progress while the
//! file is read and then exactly one terminal event.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::geometry::{GeometryError, LoadOptions, ModelData, ModelFormat, parse_model};

const CHUNK_SIZE: usize = 64 * 1024;

/// Messages sent from the loader thread.
#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the file read so far, in `0.0..=1.0`.
    Progress(f32),
    Loaded(ModelData),
    Failed(GeometryError),
}

impl LoadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadEvent::Progress(_))
    }
}

/// Handle to a model being loaded on a background thread.
///
/// Dropping the handle detaches the worker; its remaining events are discarded.
#[derive(Debug)]
pub struct ModelLoader {
    path: PathBuf,
    events: mpsc::Receiver<LoadEvent>,
    finished: bool,
}

impl ModelLoader {
    /// Start loading `path` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the thread fails to spawn.
    pub fn spawn(path: impl Into<PathBuf>, options: LoadOptions) -> Result<Self, std::io::Error> {
        let path = path.into();
        let (tx, events) = mpsc::channel();

        let worker_path = path.clone();
        std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let event = match load_with_progress(&worker_path, &options, &tx) {
                    Ok(model) => LoadEvent::Loaded(model),
                    Err(e) => LoadEvent::Failed(e),
                };
                // The receiver is gone if the viewer closed mid-load
                let _ = tx.send(event);
            })?;

        Ok(Self {
            path,
            events,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the terminal event has been handed out by [`poll`](Self::poll).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain every event that arrived since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        if self.finished {
            return Vec::new();
        }

        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.finished = true;
                    events.push(LoadEvent::Failed(GeometryError::Io(std::io::Error::other(
                        "loader thread exited without a result",
                    ))));
                    break;
                }
            }
        }
        events
    }
}

fn load_with_progress(
    path: &Path,
    options: &LoadOptions,
    progress: &mpsc::Sender<LoadEvent>,
) -> Result<ModelData, GeometryError> {
    let format = ModelFormat::from_path(path)?;

    let mut file = File::open(path)?;
    let total = file.metadata()?.len() as usize;
    let mut bytes = Vec::with_capacity(total);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        if total > 0 {
            let ratio = (bytes.len() as f32 / total as f32).min(1.0);
            let _ = progress.send(LoadEvent::Progress(ratio));
        }
    }
    if total == 0 {
        let _ = progress.send(LoadEvent::Progress(1.0));
    }

    let mut model = parse_model(format, path, &bytes)?;
    model.apply(options);
    log::debug!(
        "parsed {} ({} parts, {} triangles)",
        path.display(),
        model.parts.len(),
        model.triangle_count()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::TRIANGLE_STL;
    use std::time::{Duration, Instant};

    fn wait_for_terminal(loader: &mut ModelLoader) -> Vec<LoadEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while !loader.is_finished() {
            assert!(Instant::now() < deadline, "loader timed out");
            all.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        all
    }

    fn temp_model(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cubeview-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reports_progress_then_loaded() {
        let path = temp_model("triangle.stl", TRIANGLE_STL.as_bytes());
        let mut loader = ModelLoader::spawn(&path, LoadOptions::new().centered()).unwrap();
        let events = wait_for_terminal(&mut loader);
        std::fs::remove_file(&path).ok();

        let (last, rest) = events.split_last().unwrap();
        assert!(!rest.is_empty());
        assert!(rest.iter().all(|e| matches!(e, LoadEvent::Progress(_))));
        assert!(matches!(rest.last(), Some(LoadEvent::Progress(p)) if *p == 1.0));

        match last {
            LoadEvent::Loaded(model) => {
                assert_eq!(model.triangle_count(), 1);
                let (min, max) = model.bounds();
                assert_eq!(min + max, glam::Vec3::ZERO);
            }
            other => panic!("expected Loaded, got {other:?}"),
        }

        assert!(loader.poll().is_empty());
    }

    #[test]
    fn missing_file_fails_once() {
        let path = std::env::temp_dir().join("cubeview-no-such-model.glb");
        let mut loader = ModelLoader::spawn(&path, LoadOptions::new()).unwrap();
        let events = wait_for_terminal(&mut loader);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Failed(GeometryError::Io(_))));
        assert_eq!(loader.path(), path.as_path());
    }

    #[test]
    fn unknown_extension_fails() {
        let path = temp_model("model.obj", b"o cube");
        let mut loader = ModelLoader::spawn(&path, LoadOptions::new()).unwrap();
        let events = wait_for_terminal(&mut loader);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            events.as_slice(),
            [LoadEvent::Failed(GeometryError::UnknownFormat(_))]
        ));
    }
}
