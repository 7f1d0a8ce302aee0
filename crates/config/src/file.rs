//! Configuration files: named, versioned sets of sections
//!
//! A [`ConfigFile`] maps to `<config_dir>/<name>.conf`. Reading lives in
//! [`parser`](crate::parser), writing in [`writer`](crate::writer).

use crate::context::EngineContext;
use crate::migration::Migration;
use crate::parser::ReadReport;
use crate::section::{Section, SectionSpec};
use crate::validation::Validator;
use crate::watcher::ModificationStamp;
use crate::{ConfigError, ConfigResult, PRIORITY_DEFAULT};
use std::path::PathBuf;
use std::sync::Arc;

/// Replaces the built-in reload of a file
pub type ReloadCallback = Arc<dyn Fn(&mut ConfigFile) -> ConfigResult<ReadReport> + Send + Sync>;

/// Splits an optional `"priority|"` prefix off a file name.
///
/// `"120|irc"` gives `(120, "irc")`. Without a prefix, or when the prefix is
/// not an integer, the whole text is the name and the priority is
/// [`PRIORITY_DEFAULT`].
pub fn split_priority(name: &str) -> (i32, &str) {
    match name.split_once('|') {
        Some((prefix, rest)) => match prefix.parse::<i32>() {
            Ok(priority) => (priority, rest),
            Err(_) => (PRIORITY_DEFAULT, name),
        },
        None => (PRIORITY_DEFAULT, name),
    }
}

/// A configuration file and its sections
pub struct ConfigFile {
    name: String,
    filename: String,
    priority: i32,
    version: u32,
    version_read: u32,
    migration: Option<Arc<dyn Migration>>,
    reload: Option<ReloadCallback>,
    sections: Vec<Section>,
    context: Arc<EngineContext>,
    stamp: Option<ModificationStamp>,
}

impl ConfigFile {
    /// Creates a file named `name`, optionally prefixed with `"priority|"`
    pub fn new(name: &str, context: Arc<EngineContext>) -> ConfigResult<Self> {
        let (priority, name) = split_priority(name);
        Validator::not_empty(name, "file.name")
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            filename: format!("{}.conf", name),
            priority,
            version: 1,
            version_read: 1,
            migration: None,
            reload: None,
            sections: Vec::new(),
            context,
            stamp: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name on disk, `<name>.conf`
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the file in the configuration directory
    pub fn path(&self) -> PathBuf {
        self.context.config_dir().join(&self.filename)
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Current schema version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Version found in the file by the last read
    pub fn version_read(&self) -> u32 {
        self.version_read
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// Sets the schema version; must be at least 1
    pub fn set_version(&mut self, version: u32) -> ConfigResult<()> {
        Validator::in_range(version, 1, u32::MAX, &format!("{}.version", self.name))
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.version = version;
        Ok(())
    }

    /// Sets the migration applied to lines of files with an older version
    pub fn set_migration<M>(&mut self, migration: M)
    where
        M: Migration + 'static,
    {
        self.migration = Some(Arc::new(migration));
    }

    /// Sets the callback replacing the built-in reload
    pub fn set_reload_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut ConfigFile) -> ConfigResult<ReadReport> + Send + Sync + 'static,
    {
        self.reload = Some(Arc::new(callback));
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.sections
            .binary_search_by(|section| section.name().cmp(name))
    }

    /// Creates a section, keeping sections sorted by name
    pub fn new_section(&mut self, spec: SectionSpec) -> ConfigResult<&mut Section> {
        let index = match self.position(spec.name()) {
            Ok(_) => {
                return Err(ConfigError::DuplicateName {
                    kind: "section",
                    name: format!("{}.{}", self.name, spec.name()),
                })
            }
            Err(index) => index,
        };

        let section = Section::build(spec, &self.name, Arc::clone(&self.context))?;
        self.sections.insert(index, section);
        Ok(&mut self.sections[index])
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.position(name).ok().map(|index| &self.sections[index])
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        match self.position(name) {
            Ok(index) => Some(&mut self.sections[index]),
            Err(_) => None,
        }
    }

    /// Sections in name order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub(crate) fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.iter_mut()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub(crate) fn section_index(&self, name: &str) -> Option<usize> {
        self.position(name).ok()
    }

    pub(crate) fn section_at(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub(crate) fn section_at_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Destroys a section and every option in it
    pub fn remove_section(&mut self, name: &str) -> ConfigResult<()> {
        let index = self
            .position(name)
            .map_err(|_| ConfigError::not_found("section", format!("{}.{}", self.name, name)))?;
        let mut section = self.sections.remove(index);
        section.clear_options();
        Ok(())
    }

    /// Destroys every section
    pub(crate) fn clear_sections(&mut self) {
        for mut section in self.sections.drain(..) {
            section.clear_options();
        }
    }

    pub(crate) fn set_version_read(&mut self, version: u32) {
        self.version_read = version;
    }

    pub(crate) fn migration(&self) -> Option<Arc<dyn Migration>> {
        self.migration.clone()
    }

    pub(crate) fn reload_callback(&self) -> Option<ReloadCallback> {
        self.reload.clone()
    }

    pub(crate) fn stamp(&self) -> Option<ModificationStamp> {
        self.stamp
    }

    pub(crate) fn set_stamp(&mut self, stamp: Option<ModificationStamp>) {
        self.stamp = stamp;
    }
}

impl std::fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFile")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("version", &self.version)
            .field("version_read", &self.version_read)
            .field("sections", &self.sections)
            .finish_non_exhaustive()
    }
}
