//! Typed configuration engine
//!
//! Configuration is organised as a [`Registry`] of [`ConfigFile`]s, each
//! holding name-sorted [`Section`]s of typed [`ConfigOption`]s. Options have
//! a default, bounds, an optional parent they inherit from, and callbacks.
//! Files are stored as line-based `.conf` text and written atomically.
//!
//! # Architecture
//!
//! - **Typed values**: booleans, integers, strings, colors and enums, each
//!   with its own mutation grammar (`++N`/`--N` increments, `toggle`)
//! - **Tolerant reading**: bad lines are reported and skipped, never fatal
//! - **Versioned files**: older files go through a [`Migration`]; newer
//!   ones are backed up and ignored
//! - **Atomic writes**: files are written to a temp file, then renamed
//! - **Pluggable collaborators**: change notifications, colors and user
//!   messages go through traits held in an [`EngineContext`]
//!
//! # Example
//!
//! ```rust,no_run
//! use termconf_config::{EngineContext, OptionSpec, Registry, SectionSpec};
//!
//! let mut registry = Registry::new(EngineContext::new("/home/user/.config/app"));
//! let file = registry.new_file("app").expect("Failed to create file");
//! let look = file.new_section(SectionSpec::new("look")).expect("Failed to create section");
//! look.new_option(OptionSpec::integer("width", 0, 200).default_value("80"))
//!     .expect("Failed to create option");
//!
//! file.read().expect("Failed to read config");
//! registry
//!     .set_option_with_string("app.look.width", Some("++10"))
//!     .expect("Failed to set option");
//! registry.write_all().expect("Failed to write config");
//! ```

mod error;
mod file;
mod option;
mod registry;
mod section;
mod validation;

pub mod backup;
pub mod context;
pub mod migration;
pub mod parser;
pub mod settings;
pub mod value;
pub mod watcher;
pub mod writer;

pub use context::{
    BasicPalette, ChangeNotifier, ColorPalette, Console, EngineContext, LogConsole, LogNotifier,
};
pub use error::{ConfigError, ConfigResult, ValidationError};
pub use file::{split_priority, ConfigFile, ReloadCallback};
pub use migration::{Migration, MigrationChain, MigrationData};
pub use option::{
    CheckValueCallback, ConfigOption, OptionCallback, OptionSpec, SetOutcome, UnsetOutcome,
    PARENT_SEPARATOR,
};
pub use parser::{ParseWarning, ReadReport, WarningKind};
pub use registry::{split_path, Registry};
pub use section::{
    CreateOptionCallback, DeleteOptionCallback, Section, SectionReadCallback, SectionSpec,
    SectionWriteCallback,
};
pub use settings::EngineSettings;
pub use validation::Validator;
pub use value::{OptionType, Value};
pub use watcher::ModificationStamp;
pub use writer::ConfigWriter;

/// Name of the line holding a file's schema version
pub const CONFIG_VERSION_OPTION: &str = "config_version";

/// Literal standing for a null value in files and toggle lists
pub const NULL_VALUE: &str = "null";

/// Priority of files created without a `"priority|"` prefix
pub const PRIORITY_DEFAULT: i32 = 1000;

/// Suffix of the temp file written before the atomic rename
pub const TEMP_SUFFIX: &str = ".weechattmp";
