//! Reading configuration files
//!
//! The on-disk format is line based:
//!
//! ```text
//! # comment
//! config_version = 2
//!
//! [look]
//! color = red
//! prefix = ">>"
//! \#hash = on
//! nick
//! ```
//!
//! Leading spaces are ignored, `#` starts a comment, and `[name]` opens a
//! section. An option line is `name = value`, split on the first `" ="`.
//! Quotes around a value are removed, `null` is a null value, and a bare
//! name is an option set to null. A leading `\` escapes a name starting
//! with `#`, `[` or `\`. A `config_version` line is only read before the
//! first section.
//!
//! Bad lines never abort a read: each one is reported as a [`ParseWarning`]
//! and dropped. Only an invalid or too new `config_version` stops the read;
//! the file is then backed up and every option keeps its default value.

use crate::backup;
use crate::file::ConfigFile;
use crate::migration::MigrationData;
use crate::option::SetOutcome;
use crate::{ConfigError, ConfigResult, CONFIG_VERSION_OPTION, NULL_VALUE};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Initial size of the line buffer
const LINE_BUFFER_SIZE: usize = 16 * 1024;

/// Kind of problem found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// `[section` without the closing bracket
    MissingBracket,
    /// `[section]` naming a section the file does not have
    UnknownSection,
    /// Option line before the first section
    OptionOutsideSection,
    /// Option the section neither knows nor creates
    UnknownOption,
    /// Value rejected by the option
    InvalidValue,
}

/// A dropped line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Line number, starting at 1
    pub line: usize,
    pub kind: WarningKind,
    /// The line, without leading spaces and line ending
    pub text: String,
}

/// Result of reading a file
#[derive(Debug, Default)]
pub struct ReadReport {
    /// Number of lines read
    pub lines_read: usize,
    /// Lines that were dropped
    pub warnings: Vec<ParseWarning>,
    /// Why the rest of the file was ignored, if it was
    pub rejected: Option<ConfigError>,
    /// Backup made when the file was rejected
    pub backup: Option<PathBuf>,
    /// The file did not exist and was created with default values
    pub bootstrapped: bool,
}

impl ReadReport {
    /// Number of dropped lines of one kind
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentSection {
    /// No section header seen yet
    None,
    /// Last header named an unknown section
    Unknown,
    Known(usize),
}

struct ReadState<'a> {
    origin: &'a Path,
    section: CurrentSection,
    update_warned: bool,
}

/// Splits `name = value` into the name and the decoded value.
///
/// A line without `" ="` is a bare name with a null value.
pub(crate) fn split_option_line(line: &str) -> (&str, Option<String>) {
    match line.find(" =") {
        Some(pos) => {
            let name = line[..pos].trim_end_matches(' ');
            let raw = line[pos + 2..].trim_start_matches(' ');
            (name, decode_value(raw))
        }
        None => (line, None),
    }
}

fn decode_value(raw: &str) -> Option<String> {
    if raw == NULL_VALUE {
        return None;
    }
    if raw.len() <= 1 {
        return Some(raw.to_string());
    }
    let value = raw.trim_end_matches(' ');
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        Some(value[1..value.len() - 1].to_string())
    } else {
        Some(value.to_string())
    }
}

fn parse_version(raw: Option<&str>) -> Option<u32> {
    raw?.trim_start().parse::<u32>().ok().filter(|version| *version >= 1)
}

impl ConfigFile {
    /// Reads the file from the configuration directory.
    ///
    /// A missing file is first created with default values.
    pub fn read(&mut self) -> ConfigResult<ReadReport> {
        self.read_from_disk(false)
    }

    /// Reads the file again.
    ///
    /// Options handled by the section itself are left alone; every other
    /// option missing from the file is reset to its default value.
    pub fn reload(&mut self) -> ConfigResult<ReadReport> {
        log::info!("Reloading configuration file {}", self.filename());

        for section in self.sections_mut().filter(|s| !s.has_read_callback()) {
            for option in section.options_mut() {
                option.set_loaded(false);
            }
        }

        let result = self.read_from_disk(true);

        for section in self.sections_mut().filter(|s| !s.has_read_callback()) {
            for option in section.options_mut().filter(|o| !o.is_loaded()) {
                if let Err(e) = option.reset() {
                    log::warn!("Could not reset {}: {}", option.full_name(), e);
                }
            }
        }

        result
    }

    fn read_from_disk(&mut self, reload: bool) -> ConfigResult<ReadReport> {
        let path = self.path();
        let mut bootstrapped = false;

        if !path.exists() {
            match self.write_default() {
                Ok(()) => bootstrapped = true,
                Err(e) => log::warn!("Could not create {}: {}", path.display(), e),
            }
        }

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                let console = self.context().console();
                console.print_warning(&format!(
                    "WARNING: failed to read configuration file \"{}\" ({})",
                    path.display(),
                    e
                ));
                console.print_warning(&format!(
                    "WARNING: file \"{}\" will be overwritten on exit with default values \
                     (it is HIGHLY recommended to backup this file now)",
                    path.display()
                ));
                return Err(ConfigError::ReadError { path, source: e });
            }
        };

        if !reload {
            log::info!("Reading configuration file {}", self.filename());
        }

        let mut report = self.parse_from(BufReader::new(file), &path)?;
        report.bootstrapped = bootstrapped;
        self.record_stamp();

        Ok(report)
    }

    /// Applies configuration text to the file's sections and options.
    ///
    /// `origin` names the source in messages and is the file backed up when
    /// the version is rejected.
    pub fn parse_from<R: BufRead>(&mut self, mut reader: R, origin: &Path) -> ConfigResult<ReadReport> {
        self.set_version_read(1);

        let mut report = ReadReport::default();
        let mut state = ReadState {
            origin,
            section: CurrentSection::None,
            update_warned: false,
        };

        let mut buffer: Vec<u8> = Vec::new();
        buffer.try_reserve(LINE_BUFFER_SIZE)?;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| ConfigError::ReadError {
                    path: origin.to_path_buf(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            report.lines_read += 1;

            let text = String::from_utf8_lossy(&buffer);
            if self
                .parse_line(&text, report.lines_read, &mut state, &mut report)
                .is_break()
            {
                break;
            }
        }

        Ok(report)
    }

    fn parse_line(
        &mut self,
        text: &str,
        number: usize,
        state: &mut ReadState<'_>,
        report: &mut ReadReport,
    ) -> ControlFlow<()> {
        let line = text.trim_start_matches(' ');
        let line = match line.find(|c: char| c == '\r' || c == '\n') {
            Some(pos) => &line[..pos],
            None => line,
        };

        if line.is_empty() || line.starts_with('#') {
            return ControlFlow::Continue(());
        }

        if line.starts_with('[') && !line.contains('=') {
            self.open_section(line, number, state, report);
            return ControlFlow::Continue(());
        }

        let unescaped = line.strip_prefix('\\').unwrap_or(line);
        let (name, value) = split_option_line(unescaped);

        if state.section == CurrentSection::None && name == CONFIG_VERSION_OPTION {
            let raw = unescaped
                .find(" =")
                .map(|pos| unescaped[pos + 2..].trim_start_matches(' '));
            return self.read_version(raw, line, number, state, report);
        }

        let index = match state.section {
            CurrentSection::Known(index) => index,
            CurrentSection::Unknown => {
                log::debug!(
                    "{}, line {}: dropped, unknown section",
                    state.origin.display(),
                    number
                );
                return ControlFlow::Continue(());
            }
            CurrentSection::None => {
                self.warn(
                    state,
                    report,
                    number,
                    WarningKind::OptionOutsideSection,
                    line,
                    format!("ignoring option outside section: {}", line),
                );
                return ControlFlow::Continue(());
            }
        };

        let section_name = match self.section_at(index) {
            Some(section) => section.name().to_string(),
            None => return ControlFlow::Continue(()),
        };
        let data = self.migrate(
            state,
            MigrationData {
                config: self.name().to_string(),
                version_read: self.version_read(),
                section: section_name.clone(),
                option: Some(name.to_string()),
                value,
            },
        );
        let option_name = data.option.unwrap_or_default();
        if option_name.is_empty() {
            return ControlFlow::Continue(());
        }

        match self.apply_line(index, &option_name, data.value.as_deref()) {
            Ok(_) => {}
            Err(ConfigError::UnknownOption { .. }) => self.warn(
                state,
                report,
                number,
                WarningKind::UnknownOption,
                line,
                format!("ignoring unknown option for section \"{}\": {}", section_name, line),
            ),
            Err(e) => {
                log::debug!("{}: {}", state.origin.display(), e);
                self.warn(
                    state,
                    report,
                    number,
                    WarningKind::InvalidValue,
                    line,
                    format!(
                        "ignoring invalid value for option in section \"{}\": {}",
                        section_name, line
                    ),
                )
            }
        }

        ControlFlow::Continue(())
    }

    fn open_section(
        &mut self,
        line: &str,
        number: usize,
        state: &mut ReadState<'_>,
        report: &mut ReadReport,
    ) {
        let Some(end) = line.find(']') else {
            self.warn(
                state,
                report,
                number,
                WarningKind::MissingBracket,
                line,
                "invalid syntax, missing \"]\"".to_string(),
            );
            return;
        };

        let mut name = line[1..end].to_string();
        let data = self.migrate(
            state,
            MigrationData {
                config: self.name().to_string(),
                version_read: self.version_read(),
                section: name.clone(),
                option: None,
                value: None,
            },
        );
        if !data.section.is_empty() {
            name = data.section;
        }

        state.section = match self.section_index(&name) {
            Some(index) => CurrentSection::Known(index),
            None => {
                self.warn(
                    state,
                    report,
                    number,
                    WarningKind::UnknownSection,
                    line,
                    format!("ignoring unknown section identifier (\"{}\")", name),
                );
                CurrentSection::Unknown
            }
        };
    }

    fn read_version(
        &mut self,
        raw: Option<&str>,
        line: &str,
        number: usize,
        state: &mut ReadState<'_>,
        report: &mut ReadReport,
    ) -> ControlFlow<()> {
        let context = Arc::clone(self.context());
        let console = context.console();

        let Some(version) = parse_version(raw) else {
            console.print_error(&format!(
                "Error: {}, line {}: invalid config version: \"{}\" => \
                 rest of file is IGNORED, default options are used",
                state.origin.display(),
                number,
                line
            ));
            report.rejected = Some(ConfigError::InvalidVersion {
                path: state.origin.to_path_buf(),
                text: raw.unwrap_or_default().to_string(),
            });
            report.backup = backup::backup_file(state.origin, console).ok();
            return ControlFlow::Break(());
        };

        self.set_version_read(version);
        if version > self.version() {
            console.print_error(&format!(
                "Error: {}, version read ({}) is newer than supported version ({}) => \
                 rest of file is IGNORED, default options are used",
                state.origin.display(),
                version,
                self.version()
            ));
            report.rejected = Some(ConfigError::VersionTooNew {
                path: state.origin.to_path_buf(),
                found: version,
                supported: self.version(),
            });
            report.backup = backup::backup_file(state.origin, console).ok();
            return ControlFlow::Break(());
        }

        ControlFlow::Continue(())
    }

    /// Runs the migration on a line of a file older than the schema
    fn migrate(&self, state: &mut ReadState<'_>, mut data: MigrationData) -> MigrationData {
        if self.version_read() >= self.version() {
            return data;
        }

        if !state.update_warned {
            self.context().console().print_warning(&format!(
                "Important: file {} has been updated from version {} to {}, it is not \
                 compatible and can not be loaded any more with any older version",
                state.origin.display(),
                self.version_read(),
                self.version()
            ));
            state.update_warned = true;
        }

        if let Some(migration) = self.migration() {
            migration.migrate(&mut data);
        }
        data
    }

    /// Hands an option line to the section
    fn apply_line(
        &mut self,
        index: usize,
        name: &str,
        value: Option<&str>,
    ) -> ConfigResult<SetOutcome> {
        let section = self
            .section_at_mut(index)
            .ok_or_else(|| ConfigError::not_found("section", index.to_string()))?;

        if let Some(read) = section.read_callback() {
            return read(section, name, value);
        }

        if let Some(option) = section.option_mut(name) {
            let result = option.set(value);
            option.set_loaded(true);
            return result;
        }

        match section.create_option_callback() {
            Some(create) => create(section, name, value),
            None => Err(ConfigError::UnknownOption {
                section: section.name().to_string(),
                option: name.to_string(),
            }),
        }
    }

    fn warn(
        &self,
        state: &ReadState<'_>,
        report: &mut ReadReport,
        number: usize,
        kind: WarningKind,
        line: &str,
        message: String,
    ) {
        self.context().console().print_warning(&format!(
            "Warning: {}, line {}: {}",
            state.origin.display(),
            number,
            message
        ));
        report.warnings.push(ParseWarning {
            line: number,
            kind,
            text: line.to_string(),
        });
    }
}
