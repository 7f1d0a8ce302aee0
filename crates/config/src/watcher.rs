//! Detection of files changed on disk since they were last read or written
//!
//! The engine never spawns threads. A host that wants hot reloading calls
//! [`Registry::reload_modified`](crate::Registry::reload_modified) from its
//! own event loop (e.g. on a timer or a signal); only files whose stamp
//! changed are reloaded.

use crate::file::ConfigFile;
use std::path::Path;
use std::time::SystemTime;

/// Modification time and size of a file at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationStamp {
    modified: SystemTime,
    len: u64,
}

impl ModificationStamp {
    /// Stamp of the file at `path`, `None` if it cannot be read
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok()?,
            len: metadata.len(),
        })
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

impl ConfigFile {
    /// Whether the file on disk differs from the last read or write
    pub fn modified_on_disk(&self) -> bool {
        ModificationStamp::of(&self.path()) != self.stamp()
    }

    pub(crate) fn record_stamp(&mut self) {
        let stamp = ModificationStamp::of(&self.path());
        self.set_stamp(stamp);
    }
}
