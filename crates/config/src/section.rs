//! Sections: name-sorted groups of options inside a configuration file
//!
//! A section either owns a static list of options, or presents dynamic
//! options through its callbacks (`read`, `write`, `write_default`,
//! `create_option`, `delete_option`), e.g. one entry per configured server.

use crate::context::EngineContext;
use crate::option::{ConfigOption, OptionSpec, SetOutcome, UnsetOutcome};
use crate::validation::Validator;
use crate::writer::ConfigWriter;
use crate::{ConfigError, ConfigResult};
use std::sync::Arc;

/// Handles one `name = value` line read for the section
pub type SectionReadCallback =
    Arc<dyn Fn(&mut Section, &str, Option<&str>) -> ConfigResult<SetOutcome> + Send + Sync>;

/// Writes the section (header included) to a file being saved
pub type SectionWriteCallback =
    Arc<dyn Fn(&Section, &mut ConfigWriter<'_>) -> ConfigResult<()> + Send + Sync>;

/// Creates an option the section does not know yet
pub type CreateOptionCallback =
    Arc<dyn Fn(&mut Section, &str, Option<&str>) -> ConfigResult<SetOutcome> + Send + Sync>;

/// Removes an option at the user's request
///
/// The callback is responsible for calling [`Section::remove_option`].
pub type DeleteOptionCallback =
    Arc<dyn Fn(&mut Section, &str) -> ConfigResult<UnsetOutcome> + Send + Sync>;

#[derive(Clone, Default)]
struct SectionCallbacks {
    read: Option<SectionReadCallback>,
    write: Option<SectionWriteCallback>,
    write_default: Option<SectionWriteCallback>,
    create_option: Option<CreateOptionCallback>,
    delete_option: Option<DeleteOptionCallback>,
}

/// Definition of a section, consumed by [`ConfigFile::new_section`](crate::ConfigFile::new_section)
#[derive(Clone)]
pub struct SectionSpec {
    name: String,
    user_can_add_options: bool,
    user_can_delete_options: bool,
    callbacks: SectionCallbacks,
}

impl SectionSpec {
    /// Starts a section definition with no callbacks
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_can_add_options: false,
            user_can_delete_options: false,
            callbacks: SectionCallbacks::default(),
        }
    }

    /// Sets whether users may create options in the section
    pub fn user_can_add_options(mut self, allowed: bool) -> Self {
        self.user_can_add_options = allowed;
        self
    }

    /// Sets whether users may delete options from the section
    pub fn user_can_delete_options(mut self, allowed: bool) -> Self {
        self.user_can_delete_options = allowed;
        self
    }

    /// Sets the callback that handles every line read in the section
    pub fn on_read<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Section, &str, Option<&str>) -> ConfigResult<SetOutcome> + Send + Sync + 'static,
    {
        self.callbacks.read = Some(Arc::new(callback));
        self
    }

    /// Sets the callback that writes the section instead of its options
    pub fn on_write<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Section, &mut ConfigWriter<'_>) -> ConfigResult<()> + Send + Sync + 'static,
    {
        self.callbacks.write = Some(Arc::new(callback));
        self
    }

    /// Sets the callback used when writing default options
    pub fn on_write_default<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Section, &mut ConfigWriter<'_>) -> ConfigResult<()> + Send + Sync + 'static,
    {
        self.callbacks.write_default = Some(Arc::new(callback));
        self
    }

    /// Sets the callback that creates options users set but that do not exist
    pub fn on_create_option<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Section, &str, Option<&str>) -> ConfigResult<SetOutcome> + Send + Sync + 'static,
    {
        self.callbacks.create_option = Some(Arc::new(callback));
        self
    }

    /// Sets the callback that decides how an option is unset
    pub fn on_delete_option<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Section, &str) -> ConfigResult<UnsetOutcome> + Send + Sync + 'static,
    {
        self.callbacks.delete_option = Some(Arc::new(callback));
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// A section of a configuration file
pub struct Section {
    name: String,
    config_name: String,
    user_can_add_options: bool,
    user_can_delete_options: bool,
    callbacks: SectionCallbacks,
    options: Vec<ConfigOption>,
    context: Arc<EngineContext>,
}

impl Section {
    pub(crate) fn build(
        spec: SectionSpec,
        config_name: &str,
        context: Arc<EngineContext>,
    ) -> ConfigResult<Self> {
        Validator::not_empty(&spec.name, &format!("{}.<section>", config_name))
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(Self {
            name: spec.name,
            config_name: config_name.to_string(),
            user_can_add_options: spec.user_can_add_options,
            user_can_delete_options: spec.user_can_delete_options,
            callbacks: spec.callbacks,
            options: Vec::new(),
            context,
        })
    }

    /// Returns the section name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the file owning this section
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Returns true if users may create options here
    pub fn user_can_add_options(&self) -> bool {
        self.user_can_add_options
    }

    /// Returns true if users may delete options here
    pub fn user_can_delete_options(&self) -> bool {
        self.user_can_delete_options
    }

    /// Shared engine context, for callbacks creating options
    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.options
            .binary_search_by(|option| option.name().cmp(name))
    }

    /// Creates an option in this section, keeping options sorted by name
    pub fn new_option(&mut self, spec: OptionSpec) -> ConfigResult<&mut ConfigOption> {
        let index = match self.position(spec.option_name()) {
            Ok(_) => {
                return Err(ConfigError::DuplicateName {
                    kind: "option",
                    name: format!("{}.{}.{}", self.config_name, self.name, spec.option_name()),
                })
            }
            Err(index) => index,
        };

        let option = ConfigOption::build(spec, &self.config_name, &self.name, Arc::clone(&self.context))?;
        option.notify();
        self.options.insert(index, option);

        Ok(&mut self.options[index])
    }

    /// Returns the option with this name
    pub fn option(&self, name: &str) -> Option<&ConfigOption> {
        self.position(name).ok().map(|index| &self.options[index])
    }

    /// Returns the option with this name, mutably
    pub fn option_mut(&mut self, name: &str) -> Option<&mut ConfigOption> {
        match self.position(name) {
            Ok(index) => Some(&mut self.options[index]),
            Err(_) => None,
        }
    }

    /// Options in name order
    pub fn options(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.iter()
    }

    pub(crate) fn options_mut(&mut self) -> impl Iterator<Item = &mut ConfigOption> {
        self.options.iter_mut()
    }

    /// Returns the number of options
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub(crate) fn option_index(&self, name: &str) -> Option<usize> {
        self.position(name).ok()
    }

    pub(crate) fn option_at(&self, index: usize) -> Option<&ConfigOption> {
        self.options.get(index)
    }

    /// Destroys an option: delete callback, then a null notification
    pub fn remove_option(&mut self, name: &str) -> ConfigResult<()> {
        let index = self.position(name).map_err(|_| {
            ConfigError::not_found("option", format!("{}.{}.{}", self.config_name, self.name, name))
        })?;
        let option = self.options.remove(index);
        option.notify_removed();
        log::debug!("Removed option {}", option.full_name());
        Ok(())
    }

    /// Destroys every option of the section
    pub fn clear_options(&mut self) {
        for option in self.options.drain(..) {
            option.notify_removed();
        }
    }

    /// Removes a user-deletable option, or resets it to its default
    pub fn unset_option(&mut self, name: &str) -> ConfigResult<UnsetOutcome> {
        if self.position(name).is_err() {
            return Err(ConfigError::not_found(
                "option",
                format!("{}.{}.{}", self.config_name, self.name, name),
            ));
        }

        if self.user_can_delete_options {
            if let Some(delete) = self.callbacks.delete_option.clone() {
                return delete(self, name);
            }
            self.remove_option(name)?;
            return Ok(UnsetOutcome::Removed);
        }

        let option = self
            .option_mut(name)
            .ok_or_else(|| ConfigError::not_found("option", name))?;
        Ok(match option.reset()? {
            SetOutcome::Changed => UnsetOutcome::Reset,
            SetOutcome::SameValue => UnsetOutcome::NoReset,
        })
    }

    /// Creates or updates an option the user typed, if the section allows it
    pub fn create_option(&mut self, name: &str, value: Option<&str>) -> ConfigResult<SetOutcome> {
        match self.callbacks.create_option.clone() {
            Some(create) if self.user_can_add_options => create(self, name, value),
            _ => Err(ConfigError::UnknownOption {
                section: self.name.clone(),
                option: name.to_string(),
            }),
        }
    }

    /// Renames an option and re-sorts it; returns the new index.
    ///
    /// Does nothing (returns `None`) when the new name is empty or taken.
    pub(crate) fn rename_option(&mut self, name: &str, new_name: &str) -> Option<usize> {
        if new_name.is_empty() || self.position(new_name).is_ok() {
            return None;
        }
        let index = self.position(name).ok()?;
        let mut option = self.options.remove(index);
        option.set_name(new_name);
        let index = self.position(new_name).unwrap_or_else(|i| i);
        self.options.insert(index, option);
        Some(index)
    }

    pub(crate) fn read_callback(&self) -> Option<SectionReadCallback> {
        self.callbacks.read.clone()
    }

    pub(crate) fn has_read_callback(&self) -> bool {
        self.callbacks.read.is_some()
    }

    pub(crate) fn write_callback(&self) -> Option<SectionWriteCallback> {
        self.callbacks.write.clone()
    }

    pub(crate) fn write_default_callback(&self) -> Option<SectionWriteCallback> {
        self.callbacks.write_default.clone()
    }

    pub(crate) fn create_option_callback(&self) -> Option<CreateOptionCallback> {
        self.callbacks.create_option.clone()
    }
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("config_name", &self.config_name)
            .field("user_can_add_options", &self.user_can_add_options)
            .field("user_can_delete_options", &self.user_can_delete_options)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OptionType;

    fn section(spec: SectionSpec) -> Section {
        let context = Arc::new(EngineContext::new("/tmp/termconf-test"));
        Section::build(spec, "test", context).expect("Should build section")
    }

    #[test]
    fn test_options_are_sorted() {
        let mut look = section(SectionSpec::new("look"));
        for name in ["zeta", "alpha", "mid"] {
            look.new_option(OptionSpec::boolean(name).default_value("on"))
                .expect("Should create option");
        }
        let names: Vec<&str> = look.options().map(|o| o.name()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_duplicate_option_is_rejected() {
        let mut look = section(SectionSpec::new("look"));
        look.new_option(OptionSpec::boolean("flag").default_value("on"))
            .expect("Should create option");
        let result = look.new_option(OptionSpec::boolean("flag").default_value("off"));
        assert!(matches!(result, Err(ConfigError::DuplicateName { .. })));
    }

    #[test]
    fn test_unset_resets_static_option() {
        let mut look = section(SectionSpec::new("look"));
        look.new_option(OptionSpec::integer("width", 0, 10).default_value("5"))
            .expect("Should create option");

        assert_eq!(look.unset_option("width").expect("Should unset"), UnsetOutcome::NoReset);
        look.option_mut("width")
            .expect("Should exist")
            .set(Some("8"))
            .expect("Should set");
        assert_eq!(look.unset_option("width").expect("Should unset"), UnsetOutcome::Reset);
        assert_eq!(look.option("width").map(|o| o.integer()), Some(5));
    }

    #[test]
    fn test_unset_removes_deletable_option() {
        let mut servers = section(SectionSpec::new("server").user_can_delete_options(true));
        servers
            .new_option(OptionSpec::string("libera.address").default_value("irc.libera.chat"))
            .expect("Should create option");

        assert_eq!(
            servers.unset_option("libera.address").expect("Should unset"),
            UnsetOutcome::Removed
        );
        assert!(servers.option("libera.address").is_none());
    }

    #[test]
    fn test_create_option_requires_permission() {
        let create = |section: &mut Section, name: &str, value: Option<&str>| -> ConfigResult<SetOutcome> {
            let mut spec = OptionSpec::new(name, OptionType::String).null_allowed(true);
            if let Some(value) = value {
                spec = spec.value(value);
            }
            section.new_option(spec)?;
            Ok(SetOutcome::Changed)
        };

        let mut closed = section(SectionSpec::new("alias").on_create_option(create));
        assert!(matches!(
            closed.create_option("ll", Some("ls -l")),
            Err(ConfigError::UnknownOption { .. })
        ));

        let mut open = section(
            SectionSpec::new("alias")
                .user_can_add_options(true)
                .on_create_option(create),
        );
        open.create_option("ll", Some("ls -l")).expect("Should create");
        assert_eq!(open.option("ll").and_then(|o| o.string()), Some("ls -l"));
    }

    #[test]
    fn test_rename_keeps_order_and_rejects_collisions() {
        let mut look = section(SectionSpec::new("look"));
        for name in ["a", "b", "c"] {
            look.new_option(OptionSpec::boolean(name).default_value("on"))
                .expect("Should create option");
        }
        assert_eq!(look.rename_option("a", "d"), Some(2));
        assert_eq!(look.rename_option("b", "c"), None);
        assert_eq!(look.rename_option("b", ""), None);
        let names: Vec<&str> = look.options().map(|o| o.name()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(look.option("d").map(|o| o.full_name()).as_deref(), Some("test.look.d"));
    }
}
