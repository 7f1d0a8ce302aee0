//! Migration of files written with an older schema version
//!
//! When a file declares a `config_version` lower than the version of its
//! [`ConfigFile`](crate::ConfigFile), every section header and option line
//! read from it goes through the file's [`Migration`] before it is applied.
//! A migration rewrites the [`MigrationData`] in place: it can rename the
//! section or option, change the value, or turn the value into a null.
//! Setting the option name to an empty string drops the line.

/// One line of a legacy file, as seen by a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationData {
    /// Name of the file being read
    pub config: String,
    /// Version found in the file
    pub version_read: u32,
    /// Section of the line (or the section being opened)
    pub section: String,
    /// Option name; `None` for a section header
    pub option: Option<String>,
    /// Option value; `None` for a null value or a section header
    pub value: Option<String>,
}

impl MigrationData {
    /// Whether the migration asked for the line to be dropped
    pub fn is_dropped(&self) -> bool {
        matches!(self.option.as_deref(), Some(""))
    }
}

/// Rewrites legacy lines
pub trait Migration: Send + Sync {
    fn migrate(&self, data: &mut MigrationData);
}

impl<F> Migration for F
where
    F: Fn(&mut MigrationData) + Send + Sync,
{
    fn migrate(&self, data: &mut MigrationData) {
        self(data)
    }
}

struct MigrationStep {
    target_version: u32,
    migration: Box<dyn Migration>,
}

/// Migrations applied one schema version at a time
///
/// Each step upgrades data to its target version and runs only for files
/// read with an older version, so a file several versions behind goes
/// through every step it skipped, in ascending order.
#[derive(Default)]
pub struct MigrationChain {
    steps: Vec<MigrationStep>,
}

impl MigrationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the step upgrading data to `target_version`
    pub fn step<M>(mut self, target_version: u32, migration: M) -> Self
    where
        M: Migration + 'static,
    {
        let index = self
            .steps
            .partition_point(|step| step.target_version <= target_version);
        self.steps.insert(
            index,
            MigrationStep {
                target_version,
                migration: Box::new(migration),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Migration for MigrationChain {
    fn migrate(&self, data: &mut MigrationData) {
        for step in &self.steps {
            if data.version_read >= step.target_version {
                continue;
            }
            step.migration.migrate(data);
            if data.is_dropped() {
                log::debug!(
                    "Migration to version {} dropped {}.{}",
                    step.target_version,
                    data.config,
                    data.section
                );
                break;
            }
        }
    }
}

impl std::fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.target_version))
            .finish()
    }
}
