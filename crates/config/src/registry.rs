//! The set of all configuration files
//!
//! Files are kept sorted by name; [`Registry::files_by_priority`] gives the
//! order in which they are reloaded. Options are addressed by dotted path
//! `file.section.option`, where only the first two dots separate levels.

use crate::context::EngineContext;
use crate::file::{split_priority, ConfigFile};
use crate::option::{ConfigOption, SetOutcome, UnsetOutcome};
use crate::parser::ReadReport;
use crate::section::Section;
use crate::settings::EngineSettings;
use crate::value::Value;
use crate::{ConfigError, ConfigResult};
use std::cmp::Reverse;
use std::sync::Arc;

/// Position of an option in the registry, used to cache parent lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OptionLocation {
    file: usize,
    section: usize,
    option: usize,
}

/// Splits `file.section.option` on its first two dots
pub fn split_path(path: &str) -> Option<(&str, &str, &str)> {
    let (file, rest) = path.split_once('.')?;
    let (section, option) = rest.split_once('.')?;
    Some((file, section, option))
}

#[derive(Clone, Copy)]
enum Slot {
    Value,
    Default,
}

/// Every configuration file of the application
#[derive(Debug)]
pub struct Registry {
    context: Arc<EngineContext>,
    files: Vec<ConfigFile>,
}

impl Registry {
    pub fn new(context: EngineContext) -> Self {
        Self {
            context: Arc::new(context),
            files: Vec::new(),
        }
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// Replaces the engine settings; they apply from the next write
    pub fn set_settings(&self, settings: EngineSettings) -> ConfigResult<()> {
        settings.validate()?;
        self.context.replace_settings(settings);
        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.files.binary_search_by(|file| file.name().cmp(name))
    }

    /// Creates a file; the name may carry a `"priority|"` prefix
    pub fn new_file(&mut self, name: &str) -> ConfigResult<&mut ConfigFile> {
        let (_, plain_name) = split_priority(name);
        let index = match self.position(plain_name) {
            Ok(_) => {
                return Err(ConfigError::DuplicateName {
                    kind: "file",
                    name: plain_name.to_string(),
                })
            }
            Err(index) => index,
        };

        let file = ConfigFile::new(name, Arc::clone(&self.context))?;
        self.files.insert(index, file);
        Ok(&mut self.files[index])
    }

    pub fn file(&self, name: &str) -> Option<&ConfigFile> {
        self.position(name).ok().map(|index| &self.files[index])
    }

    pub fn file_mut(&mut self, name: &str) -> Option<&mut ConfigFile> {
        match self.position(name) {
            Ok(index) => Some(&mut self.files[index]),
            Err(_) => None,
        }
    }

    /// Files in name order
    pub fn files(&self) -> impl Iterator<Item = &ConfigFile> {
        self.files.iter()
    }

    /// Files by descending priority; equal priorities keep name order
    pub fn files_by_priority(&self) -> Vec<&ConfigFile> {
        let mut files: Vec<&ConfigFile> = self.files.iter().collect();
        files.sort_by_key(|file| Reverse(file.priority()));
        files
    }

    /// Destroys a file and every option in it
    pub fn remove_file(&mut self, name: &str) -> ConfigResult<()> {
        let index = self
            .position(name)
            .map_err(|_| ConfigError::not_found("file", name))?;
        let mut file = self.files.remove(index);
        file.clear_sections();
        log::debug!("Removed configuration file {}", name);
        Ok(())
    }

    /// Destroys every file
    pub fn free_all(&mut self) {
        for mut file in self.files.drain(..) {
            file.clear_sections();
        }
    }

    pub fn section(&self, file: &str, section: &str) -> Option<&Section> {
        self.file(file)?.section(section)
    }

    pub fn section_mut(&mut self, file: &str, section: &str) -> Option<&mut Section> {
        self.file_mut(file)?.section_mut(section)
    }

    /// Looks up an option by dotted path
    pub fn option(&self, path: &str) -> Option<&ConfigOption> {
        let (file, section, option) = split_path(path)?;
        self.section(file, section)?.option(option)
    }

    pub fn option_mut(&mut self, path: &str) -> Option<&mut ConfigOption> {
        let (file, section, option) = split_path(path)?;
        self.section_mut(file, section)?.option_mut(option)
    }

    fn locate(&self, path: &str) -> Option<OptionLocation> {
        let (file_name, section_name, option_name) = split_path(path)?;
        let file = self.position(file_name).ok()?;
        let section = self.files[file].section_index(section_name)?;
        let option = self.files[file]
            .section_at(section)?
            .option_index(option_name)?;
        Some(OptionLocation {
            file,
            section,
            option,
        })
    }

    fn option_at(&self, location: OptionLocation) -> Option<&ConfigOption> {
        self.files
            .get(location.file)?
            .section_at(location.section)?
            .option_at(location.option)
    }

    /// Sets an option by path, creating it if its section allows that.
    ///
    /// A `None` value sets the option to null.
    pub fn set_option_with_string(
        &mut self,
        path: &str,
        value: Option<&str>,
    ) -> ConfigResult<SetOutcome> {
        let (file, section, option) =
            split_path(path).ok_or_else(|| ConfigError::not_found("option", path))?;
        let section = self
            .section_mut(file, section)
            .ok_or_else(|| ConfigError::not_found("section", format!("{}.{}", file, section)))?;

        if let Some(existing) = section.option_mut(option) {
            return existing.set(value);
        }

        match section.create_option(option, value) {
            Err(ConfigError::UnknownOption { .. }) => Err(ConfigError::not_found("option", path)),
            result => result,
        }
    }

    /// Removes or resets an option by path
    pub fn unset_option(&mut self, path: &str) -> ConfigResult<UnsetOutcome> {
        let (file, section, option) =
            split_path(path).ok_or_else(|| ConfigError::not_found("option", path))?;
        self.section_mut(file, section)
            .ok_or_else(|| ConfigError::not_found("option", path))?
            .unset_option(option)
    }

    /// Renames an option and repoints every option inheriting from it.
    ///
    /// Returns `false` without changing anything when the new name is empty
    /// or already used in the section.
    pub fn rename_option(&mut self, path: &str, new_name: &str) -> ConfigResult<bool> {
        let location = self
            .locate(path)
            .ok_or_else(|| ConfigError::not_found("option", path))?;

        let file = &mut self.files[location.file];
        let section = file
            .section_at_mut(location.section)
            .ok_or_else(|| ConfigError::not_found("option", path))?;
        let (old_path, old_name) = match section.option_at(location.option) {
            Some(option) => (option.full_name(), option.name().to_string()),
            None => return Err(ConfigError::not_found("option", path)),
        };
        let Some(new_index) = section.rename_option(&old_name, new_name) else {
            return Ok(false);
        };
        let new_path = format!("{}.{}.{}", section.config_name(), section.name(), new_name);

        for file in self.files.iter_mut() {
            for section in file.sections_mut() {
                for option in section.options_mut() {
                    if option.parent_name() == Some(old_path.as_str()) {
                        option.set_parent_name(&new_path);
                    } else {
                        option.cache_parent(None);
                    }
                }
            }
        }

        if let Some(option) = self.option_at(OptionLocation {
            option: new_index,
            ..location
        }) {
            option.notify();
        }
        log::debug!("Renamed option {} to {}", old_path, new_path);

        Ok(true)
    }

    /// Resolves the parent of an option, if it declares one that exists
    pub fn parent_of(&self, option: &ConfigOption) -> Option<&ConfigOption> {
        let parent_name = option.parent_name()?;

        if let Some(location) = option.cached_parent() {
            if let Some(parent) = self.option_at(location) {
                if parent.full_name() == parent_name {
                    return Some(parent);
                }
            }
        }

        log::debug!("Resolving parent {} of {}", parent_name, option.full_name());
        let location = self.locate(parent_name);
        option.cache_parent(location);
        self.option_at(location?)
    }

    /// Option and slot holding the value an inherited read returns
    fn inherited_slot<'a>(&'a self, option: &'a ConfigOption) -> (&'a ConfigOption, Slot) {
        if !option.is_null() {
            return (option, Slot::Value);
        }
        match self.parent_of(option) {
            Some(parent) if !parent.is_null() => (parent, Slot::Value),
            Some(parent) => (parent, Slot::Default),
            None => (option, Slot::Default),
        }
    }

    /// Own value, else the parent's value, else the parent's default
    /// (or the option's own default when the parent is missing)
    pub fn value_inherited<'a>(&'a self, option: &'a ConfigOption) -> Option<&'a Value> {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.value(),
            (owner, Slot::Default) => owner.default_value(),
        }
    }

    pub fn boolean_inherited(&self, option: &ConfigOption) -> bool {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.boolean(),
            (owner, Slot::Default) => owner.boolean_default(),
        }
    }

    pub fn integer_inherited(&self, option: &ConfigOption) -> i64 {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.integer(),
            (owner, Slot::Default) => owner.integer_default(),
        }
    }

    pub fn string_inherited<'a>(&'a self, option: &'a ConfigOption) -> Option<&'a str> {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.string(),
            (owner, Slot::Default) => owner.string_default(),
        }
    }

    pub fn color_inherited(&self, option: &ConfigOption) -> i32 {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.color(),
            (owner, Slot::Default) => owner.color_default(),
        }
    }

    pub fn enum_inherited(&self, option: &ConfigOption) -> usize {
        match self.inherited_slot(option) {
            (owner, Slot::Value) => owner.enum_index(),
            (owner, Slot::Default) => owner.enum_index_default(),
        }
    }

    /// Reads every file, highest priority first
    pub fn read_all(&mut self) -> Vec<(String, ConfigResult<ReadReport>)> {
        self.names_by_priority(|_| true)
            .into_iter()
            .map(|name| {
                let result = match self.file_mut(&name) {
                    Some(file) => file.read(),
                    None => Err(ConfigError::not_found("file", name.as_str())),
                };
                (name, result)
            })
            .collect()
    }

    /// Reloads a file, through its reload callback if it has one
    pub fn reload(&mut self, name: &str) -> ConfigResult<ReadReport> {
        let file = self
            .file_mut(name)
            .ok_or_else(|| ConfigError::not_found("file", name))?;
        match file.reload_callback() {
            Some(reload) => reload(file),
            None => file.reload(),
        }
    }

    /// Reloads every file, highest priority first
    pub fn reload_all(&mut self) -> Vec<(String, ConfigResult<ReadReport>)> {
        let names = self.names_by_priority(|_| true);
        self.reload_each(names)
    }

    /// Reloads the files changed on disk since they were last read or written
    pub fn reload_modified(&mut self) -> Vec<(String, ConfigResult<ReadReport>)> {
        let names = self.names_by_priority(ConfigFile::modified_on_disk);
        if !names.is_empty() {
            log::info!("Configuration files changed on disk: {}", names.join(", "));
        }
        self.reload_each(names)
    }

    fn names_by_priority(&self, filter: impl Fn(&ConfigFile) -> bool) -> Vec<String> {
        self.files_by_priority()
            .into_iter()
            .filter(|file| filter(*file))
            .map(|file| file.name().to_string())
            .collect()
    }

    fn reload_each(&mut self, names: Vec<String>) -> Vec<(String, ConfigResult<ReadReport>)> {
        names
            .into_iter()
            .map(|name| {
                let result = self.reload(&name);
                if let Err(e) = &result {
                    log::error!("Failed to reload {}: {}", name, e);
                }
                (name, result)
            })
            .collect()
    }

    /// Writes one file
    pub fn write(&mut self, name: &str) -> ConfigResult<()> {
        self.file_mut(name)
            .ok_or_else(|| ConfigError::not_found("file", name))?
            .write()
    }

    /// Writes every file; returns the first failure after trying them all
    pub fn write_all(&mut self) -> ConfigResult<()> {
        let mut first_error = None;
        for file in self.files.iter_mut() {
            if let Err(e) = file.write() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
