//! Writing configuration files
//!
//! Files are written atomically: everything goes to
//! `<file>.weechattmp` first, which is flushed (and synced if the settings
//! ask for it), given the configured permissions, then persisted over the
//! target with [`NamedTempFile::persist`]. A failure at any step drops the
//! temp file, which deletes it, and leaves the target untouched.

use crate::file::ConfigFile;
use crate::option::ConfigOption;
use crate::settings::EngineSettings;
use crate::{ConfigError, ConfigResult, TEMP_SUFFIX};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Line writer handed to section write callbacks
pub struct ConfigWriter<'a> {
    out: &'a mut dyn Write,
    path: &'a Path,
}

/// Returns `"\\"` when a name would otherwise read as a comment or a section
fn escape(name: &str) -> &'static str {
    if name.starts_with('#') || name.starts_with('[') || name.starts_with('\\') {
        "\\"
    } else {
        ""
    }
}

impl<'a> ConfigWriter<'a> {
    pub fn new(out: &'a mut dyn Write, path: &'a Path) -> Self {
        Self { out, path }
    }

    fn emit(&mut self, text: &str) -> ConfigResult<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: self.path.to_path_buf(),
                source: e,
            })
    }

    /// Writes a `[name]` section header, preceded by an empty line
    pub fn write_section(&mut self, name: &str) -> ConfigResult<()> {
        self.emit(&format!("\n[{}]\n", name))
    }

    /// Writes `name = value`, or the bare name for a null value.
    ///
    /// The value is written as given; strings must carry their own quotes.
    pub fn write_line(&mut self, name: &str, value: Option<&str>) -> ConfigResult<()> {
        match value {
            Some(value) => self.emit(&format!("{}{} = {}\n", escape(name), name, value)),
            None => self.emit(&format!("{}{}\n", escape(name), name)),
        }
    }

    /// Writes an option with its current value in file form
    pub fn write_option(&mut self, option: &ConfigOption) -> ConfigResult<()> {
        let value = option.file_value();
        self.write_line(option.name(), value.as_deref())
    }

    pub(crate) fn write_header(
        &mut self,
        filename: &str,
        settings: &EngineSettings,
    ) -> ConfigResult<()> {
        self.emit(&format!(
            "#\n\
             # {label} -- {filename}\n\
             #\n\
             # WARNING: It is NOT recommended to edit this file by hand,\n\
             # especially if {app} is running.\n\
             #\n\
             # Use commands like /set or /fset to change settings in {app}.\n\
             #\n\
             # For more info, see: {url}\n\
             #\n",
            label = settings.product_label(),
            filename = filename,
            app = settings.product_name,
            url = settings.help_url,
        ))
    }
}

/// Path of the temp file written before the rename
pub fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Real path to replace: the target of a symlink, or the path itself
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

impl ConfigFile {
    /// Saves every section to disk
    pub fn write(&mut self) -> ConfigResult<()> {
        self.write_internal(false)
    }

    /// Saves the file in "default options" mode, used to create a missing file
    pub fn write_default(&mut self) -> ConfigResult<()> {
        self.write_internal(true)
    }

    fn write_internal(&mut self, default_options: bool) -> ConfigResult<()> {
        let dir = self.context().config_dir().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| ConfigError::DirectoryCreationError {
                path: dir.clone(),
                source: e,
            })?;
            log::info!("Created config directory: {}", dir.display());
        }

        let path = self.path();
        let target = resolve_target(&path);
        let settings = self.context().settings().clone();

        log::info!(
            "Writing configuration file {}{}",
            self.filename(),
            if default_options { " (default options)" } else { "" }
        );

        let result = self
            .create_temp_file(&dir)
            .and_then(|temp| self.write_atomic(temp, &target, &settings, default_options));

        if let Err(e) = result {
            self.context().console().print_error(&format!(
                "Error writing configuration file \"{}\"",
                path.display()
            ));
            log::error!("Error writing configuration file \"{}\": {}", self.filename(), e);
            return Err(e);
        }

        self.record_stamp();
        Ok(())
    }

    /// Creates `<file>.weechattmp` in the configuration directory
    ///
    /// A temp file left behind by an interrupted write is replaced.
    fn create_temp_file(&self, dir: &Path) -> ConfigResult<NamedTempFile> {
        let stale = temp_path(&self.path());
        if stale.exists() {
            log::warn!("Removing stale temp file {}", stale.display());
            fs::remove_file(&stale).map_err(|e| ConfigError::WriteError {
                path: stale.clone(),
                source: e,
            })?;
        }

        tempfile::Builder::new()
            .prefix(self.filename())
            .suffix(TEMP_SUFFIX)
            .rand_bytes(0)
            .tempfile_in(dir)
            .map_err(|e| {
                self.context()
                    .console()
                    .print_error(&format!("Cannot create file \"{}\"", stale.display()));
                ConfigError::WriteError {
                    path: stale,
                    source: e,
                }
            })
    }

    /// Writes the content to the temp file, then renames it over `target`.
    ///
    /// Dropping the temp file on any error path deletes it.
    fn write_atomic(
        &self,
        mut temp: NamedTempFile,
        target: &Path,
        settings: &EngineSettings,
        default_options: bool,
    ) -> ConfigResult<()> {
        let temp_name = temp.path().to_path_buf();
        let write_error = |e| ConfigError::WriteError {
            path: temp_name.clone(),
            source: e,
        };

        {
            let mut out = BufWriter::new(temp.as_file_mut());
            self.write_content(&mut out, &temp_name, default_options, settings)?;
            out.flush().map_err(write_error)?;
        }

        if settings.save_with_fsync {
            temp.as_file().sync_all().map_err(write_error)?;
        }
        self.apply_permissions(temp.as_file(), &temp_name, settings);

        temp.persist(target).map_err(|e| ConfigError::WriteError {
            path: target.to_path_buf(),
            source: e.error,
        })?;

        Ok(())
    }

    fn write_content(
        &self,
        out: &mut dyn Write,
        temp_name: &Path,
        default_options: bool,
        settings: &EngineSettings,
    ) -> ConfigResult<()> {
        let mut writer = ConfigWriter::new(out, temp_name);
        writer.write_header(self.filename(), settings)?;

        if self.version() > 1 {
            writer.emit(&format!(
                "\n{} = {}\n",
                crate::CONFIG_VERSION_OPTION,
                self.version()
            ))?;
        }

        for section in self.sections() {
            let callback = match default_options {
                true => section
                    .write_default_callback()
                    .or_else(|| section.write_callback()),
                false => section.write_callback(),
            };

            match callback {
                Some(write) => write(section, &mut writer)?,
                None => {
                    writer.write_section(section.name())?;
                    for option in section.options() {
                        writer.write_option(option)?;
                    }
                }
            }
        }

        Ok(())
    }

    #[cfg(unix)]
    fn apply_permissions(&self, file: &File, temp_name: &Path, settings: &EngineSettings) {
        use std::os::unix::fs::PermissionsExt;

        let mode = settings.permissions_mode();
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(mode)) {
            self.context().console().print_warning(&format!(
                "WARNING: failed to set permissions on configuration file \"{}\" ({})",
                temp_name.display(),
                e
            ));
        }
    }

    #[cfg(not(unix))]
    fn apply_permissions(&self, _file: &File, _temp_name: &Path, _settings: &EngineSettings) {}
}
