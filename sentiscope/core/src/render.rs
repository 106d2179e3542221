//! Replaceable chart surfaces.
//!
//! A [`ChartRenderer`] owns at most one attached handle per surface and
//! always disposes it before attaching the next payload.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{charts::ChartPayload, error::RenderError};

/// Something that can display a chart and later tear it down.
pub trait ChartSurface {
    /// Token identifying one attached chart.
    type Handle;

    /// Displays `payload`.
    fn attach(&mut self, payload: &ChartPayload) -> Result<Self::Handle, RenderError>;

    /// Removes a previously attached chart.
    fn dispose(&mut self, handle: Self::Handle) -> Result<(), RenderError>;
}

/// Stateful renderer holding the currently attached handle.
pub struct ChartRenderer<S: ChartSurface> {
    surface: S,
    current: Option<S::Handle>,
}

impl<S> fmt::Debug for ChartRenderer<S>
where
    S: ChartSurface + fmt::Debug,
    S::Handle: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartRenderer")
            .field("surface", &self.surface)
            .field("current", &self.current)
            .finish()
    }
}

impl<S: ChartSurface> ChartRenderer<S> {
    /// Renderer with nothing attached.
    pub const fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    /// Disposes the current chart, then attaches `payload`.
    ///
    /// If disposal fails the stale handle is dropped and the error returned
    /// without attaching.
    pub fn update(&mut self, payload: &ChartPayload) -> Result<&S::Handle, RenderError> {
        self.clear()?;
        let handle = self.surface.attach(payload)?;
        Ok(self.current.insert(handle))
    }

    /// Disposes the current chart, if any.
    pub fn clear(&mut self) -> Result<(), RenderError> {
        match self.current.take() {
            Some(handle) => self.surface.dispose(handle),
            None => Ok(()),
        }
    }

    /// Currently attached handle.
    pub const fn current(&self) -> Option<&S::Handle> {
        self.current.as_ref()
    }

    /// Underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }
}

/// Surface that writes each chart as a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileSurface {
    dir: PathBuf,
    prefix: String,
}

impl JsonFileSurface {
    /// Writes into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        Self::with_prefix(dir, "chart")
    }

    /// Like [`Self::new`] with a custom file-name prefix.
    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self, RenderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| RenderError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
        })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartSurface for JsonFileSurface {
    type Handle = PathBuf;

    fn attach(&mut self, payload: &ChartPayload) -> Result<PathBuf, RenderError> {
        let path = self.dir.join(format!(
            "{}-{}-{}.json",
            self.prefix,
            payload.kind(),
            Uuid::new_v4().simple()
        ));
        let body = serde_json::to_vec_pretty(payload)?;
        fs::write(&path, body).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn dispose(&mut self, handle: PathBuf) -> Result<(), RenderError> {
        match fs::remove_file(&handle) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(RenderError::Io {
                path: handle,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BarChart, LineChart};
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingSurface {
        next: u32,
        events: Vec<String>,
    }

    impl ChartSurface for RecordingSurface {
        type Handle = u32;

        fn attach(&mut self, payload: &ChartPayload) -> Result<u32, RenderError> {
            self.next += 1;
            self.events.push(format!("attach {} {}", payload.kind(), self.next));
            Ok(self.next)
        }

        fn dispose(&mut self, handle: u32) -> Result<(), RenderError> {
            self.events.push(format!("dispose {handle}"));
            Ok(())
        }
    }

    fn line() -> ChartPayload {
        ChartPayload::Line(LineChart {
            raw: vec![0.1],
            smoothed: vec![0.1],
            highlight: None,
            gaps: vec![],
        })
    }

    fn bar() -> ChartPayload {
        ChartPayload::Bar(BarChart {
            labels: vec!["joy".into()],
            values: vec![1.0],
            colors: vec!["#FFD700".into()],
            caption: "hi".into(),
        })
    }

    #[test]
    fn update_disposes_before_attaching() {
        let mut renderer = ChartRenderer::new(RecordingSurface::default());
        renderer.update(&line()).unwrap();
        renderer.update(&bar()).unwrap();
        renderer.clear().unwrap();
        renderer.clear().unwrap();
        assert_eq!(
            renderer.surface().events,
            vec!["attach line 1", "dispose 1", "attach bar 2", "dispose 2"]
        );
        assert!(renderer.current().is_none());
    }

    #[test]
    fn json_surface_replaces_files() {
        let tmp = tempdir().unwrap();
        let mut renderer = ChartRenderer::new(JsonFileSurface::new(tmp.path().join("charts")).unwrap());

        let first = renderer.update(&bar()).unwrap().clone();
        assert!(first.exists());
        let written: ChartPayload =
            serde_json::from_slice(&std::fs::read(&first).unwrap()).unwrap();
        assert_eq!(written, bar());

        let second = renderer.update(&line()).unwrap().clone();
        assert!(!first.exists());
        assert!(second.exists());

        renderer.clear().unwrap();
        assert!(!second.exists());
    }
}
