//! Collaborators the engine talks to, and the context that carries them
//!
//! The engine never prints, resolves colors or dispatches events itself.
//! It goes through the traits below; the host plugs its own implementations
//! into an [`EngineContext`] once, and every file, section and option shares
//! that context.

use crate::settings::EngineSettings;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Receives an event after every committed option change
///
/// `path` is the dotted `file.section.option` name; `value` is the canonical
/// string of the new value, `None` for a null or removed option.
pub trait ChangeNotifier: Send + Sync {
    fn option_changed(&self, path: &str, value: Option<&str>);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn option_changed(&self, path: &str, value: Option<&str>) {
        log::debug!("Option changed: {} = {}", path, value.unwrap_or(crate::NULL_VALUE));
    }
}

/// Resolves between color names and integer color ids
pub trait ColorPalette: Send + Sync {
    /// Number of known colors; valid ids are `0..count()`
    fn count(&self) -> i32;

    /// Resolves a color name (or id written as a number) to an id
    fn assign(&self, name: &str) -> Option<i32>;

    /// Returns the name of a color id
    fn name(&self, color: i32) -> Option<String>;

    /// Moves `diff` steps from `color` in the palette's name order
    fn assign_by_diff(&self, color: i32, diff: i64) -> Option<i32>;
}

/// The basic terminal colors, in palette order
pub const BASIC_COLORS: [&str; 17] = [
    "default",
    "black",
    "darkgray",
    "red",
    "lightred",
    "green",
    "lightgreen",
    "brown",
    "yellow",
    "blue",
    "lightblue",
    "magenta",
    "lightmagenta",
    "cyan",
    "lightcyan",
    "gray",
    "white",
];

/// Palette over a fixed list of names; ids are list indexes
#[derive(Debug, Clone)]
pub struct BasicPalette {
    names: Vec<String>,
}

impl BasicPalette {
    /// Creates a palette over custom names, in the given order
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for BasicPalette {
    fn default() -> Self {
        Self::with_names(BASIC_COLORS)
    }
}

impl ColorPalette for BasicPalette {
    fn count(&self) -> i32 {
        self.names.len() as i32
    }

    fn assign(&self, name: &str) -> Option<i32> {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            return Some(index as i32);
        }
        match name.parse::<i32>() {
            Ok(id) if id >= 0 && id < self.count() => Some(id),
            _ => None,
        }
    }

    fn name(&self, color: i32) -> Option<String> {
        usize::try_from(color)
            .ok()
            .and_then(|index| self.names.get(index))
            .cloned()
    }

    fn assign_by_diff(&self, color: i32, diff: i64) -> Option<i32> {
        let size = i64::from(self.count());
        if size == 0 {
            return None;
        }
        let start = if (0..size).contains(&i64::from(color)) {
            i64::from(color)
        } else {
            0
        };
        Some((start + diff).rem_euclid(size) as i32)
    }
}

/// Receives user-facing messages (the interactive console of the host)
pub trait Console: Send + Sync {
    fn print_warning(&self, message: &str);
    fn print_error(&self, message: &str);
}

/// Console that forwards to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConsole;

impl Console for LogConsole {
    fn print_warning(&self, message: &str) {
        log::warn!(target: "termconf::console", "{}", message);
    }

    fn print_error(&self, message: &str) {
        log::error!(target: "termconf::console", "{}", message);
    }
}

/// Shared state every file, section and option points back to
pub struct EngineContext {
    config_dir: PathBuf,
    notifier: Arc<dyn ChangeNotifier>,
    palette: Arc<dyn ColorPalette>,
    console: Arc<dyn Console>,
    settings: RwLock<EngineSettings>,
}

impl EngineContext {
    /// Creates a context rooted at `config_dir` with default collaborators
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            notifier: Arc::new(LogNotifier),
            palette: Arc::new(BasicPalette::default()),
            console: Arc::new(LogConsole),
            settings: RwLock::new(EngineSettings::default()),
        }
    }

    /// Sets the receiver of change notifications
    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the color palette used by color options
    pub fn with_palette(mut self, palette: Arc<dyn ColorPalette>) -> Self {
        self.palette = palette;
        self
    }

    /// Sets the console that receives warnings and errors
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Replaces the engine settings
    pub fn with_settings(self, settings: EngineSettings) -> Self {
        self.replace_settings(settings);
        self
    }

    /// Directory holding every configuration file
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the change notifier
    pub fn notifier(&self) -> &dyn ChangeNotifier {
        self.notifier.as_ref()
    }

    /// Returns the color palette
    pub fn palette(&self) -> &dyn ColorPalette {
        self.palette.as_ref()
    }

    /// Returns the console
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Returns the current settings
    ///
    /// A poisoned lock still yields the last written settings.
    pub fn settings(&self) -> RwLockReadGuard<'_, EngineSettings> {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn replace_settings(&self, settings: EngineSettings) {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = settings;
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("config_dir", &self.config_dir)
            .field("settings", &*self.settings())
            .finish_non_exhaustive()
    }
}
