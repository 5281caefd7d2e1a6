//! Completion markers decide whether a document's output is already in place.
//!
//! The directory driver consults a [`CompletionMarker`] before running OCR on a document and
//! notifies it after the output has been written. [`OutputExists`] is the production strategy:
//! the output file itself is the marker. [`MemoryMarker`] keeps the state in memory so callers
//! can pre-seed partial-completion states without a filesystem.

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub trait CompletionMarker {
    /// Whether the document whose output lives at `target` is already processed.
    fn is_complete(&self, target: &Path) -> Result<bool>;

    /// Called once the output at `target` has been written.
    fn mark_complete(&self, target: &Path) -> Result<()> {
        let _ = target;
        Ok(())
    }
}

impl<M: CompletionMarker + ?Sized> CompletionMarker for &M {
    fn is_complete(&self, target: &Path) -> Result<bool> {
        (**self).is_complete(target)
    }

    fn mark_complete(&self, target: &Path) -> Result<()> {
        (**self).mark_complete(target)
    }
}

/// Path-addressed marker: a document is complete when its output file exists.
///
/// The content is never inspected, so a stale or truncated file still counts as done.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputExists;

impl CompletionMarker for OutputExists {
    fn is_complete(&self, target: &Path) -> Result<bool> {
        Ok(target.try_exists()?)
    }
}

/// In-memory marker keyed by output path.
#[derive(Debug, Default)]
pub struct MemoryMarker {
    completed: Mutex<HashSet<PathBuf>>,
}

impl MemoryMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given targets already marked complete.
    pub fn with_completed<I, P>(targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            completed: Mutex::new(targets.into_iter().map(Into::into).collect()),
        }
    }

    pub fn completed(&self) -> Vec<PathBuf> {
        let mut completed: Vec<_> = self.completed.lock().iter().cloned().collect();
        completed.sort();
        completed
    }
}

impl CompletionMarker for MemoryMarker {
    fn is_complete(&self, target: &Path) -> Result<bool> {
        Ok(self.completed.lock().contains(target))
    }

    fn mark_complete(&self, target: &Path) -> Result<()> {
        self.completed.lock().insert(target.to_path_buf());
        Ok(())
    }
}
