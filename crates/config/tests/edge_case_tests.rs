//! Edge case and error scenario tests

use std::fs;
use std::sync::{Arc, Mutex};
use termconf_config::{
    backup, writer, ConfigError, ConfigResult, Console, EngineContext, EngineSettings, OptionSpec,
    Registry, SectionSpec, UnsetOutcome, WarningKind,
};
use tempfile::TempDir;

#[derive(Default)]
struct CapturingConsole {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl Console for CapturingConsole {
    fn print_warning(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }

    fn print_error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }
}

fn registry_in(dir: &std::path::Path) -> Result<Registry, Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = Registry::new(EngineContext::new(dir));
    let file = registry.new_file("test")?;
    let look = file.new_section(SectionSpec::new("look"))?;
    look.new_option(OptionSpec::integer("width", 0, 100).default_value("10"))?;
    look.new_option(OptionSpec::string("nick").null_allowed(true).default_value("bob"))?;
    look.new_option(OptionSpec::string("#hash").null_allowed(true))?;
    look.new_option(OptionSpec::string("[box").default_value("inside"))?;
    Ok(registry)
}

#[test]
fn test_read_with_unusable_directory_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let not_a_dir = temp_dir.path().join("plain-file");
    fs::write(&not_a_dir, "")?;

    let console = Arc::new(CapturingConsole::default());
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = Registry::new(EngineContext::new(&not_a_dir).with_console(console.clone()));
    registry.new_file("test")?;

    let result = registry.file_mut("test").ok_or("missing file")?.read();
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));

    let warnings = console.warnings.lock().map_err(|_| "poisoned")?;
    assert_eq!(warnings.len(), 2);
    assert!(warnings[1].contains("will be overwritten on exit"));

    Ok(())
}

#[test]
fn test_failed_write_leaves_target_and_removes_temp() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    let target = temp_dir.path().join("test.conf");
    fs::create_dir(&target)?;
    fs::write(target.join("keep"), "untouched")?;

    let result = registry.write("test");
    assert!(matches!(result, Err(ConfigError::WriteError { .. })));
    assert!(target.is_dir());
    assert_eq!(fs::read_to_string(target.join("keep"))?, "untouched");
    assert!(!writer::temp_path(&target).exists());

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_write_through_symlink_keeps_link() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().join("config");
    let real_dir = temp_dir.path().join("dotfiles");
    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&real_dir)?;

    let real = real_dir.join("test.conf");
    fs::write(&real, "[look]\nwidth = 3\n")?;
    let link = config_dir.join("test.conf");
    std::os::unix::fs::symlink(&real, &link)?;

    let mut registry = registry_in(&config_dir)?;
    registry.file_mut("test").ok_or("missing file")?.read()?;
    assert_eq!(registry.option("test.look.width").map(|o| o.integer()), Some(3));

    registry.set_option_with_string("test.look.width", Some("42"))?;
    registry.write("test")?;

    assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
    assert!(fs::read_to_string(&real)?.contains("\nwidth = 42\n"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_configured_permissions_are_applied() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    registry.set_settings(EngineSettings {
        file_permissions: "644".to_string(),
        save_with_fsync: true,
        ..Default::default()
    })?;

    registry.write("test")?;
    let mode = fs::metadata(temp_dir.path().join("test.conf"))?.permissions().mode();
    assert_eq!(mode & 0o777, 0o644);

    Ok(())
}

#[test]
fn test_escaped_names_survive_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    registry.set_option_with_string("test.look.#hash", Some("tag"))?;
    registry.set_option_with_string("test.look.[box", Some("moved"))?;
    registry.write("test")?;

    let written = fs::read_to_string(temp_dir.path().join("test.conf"))?;
    assert!(written.contains("\n\\#hash = \"tag\"\n"));
    assert!(written.contains("\n\\[box = \"moved\"\n"));

    let mut registry = registry_in(temp_dir.path())?;
    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert!(report.warnings.is_empty());
    assert_eq!(registry.option("test.look.#hash").and_then(|o| o.string()), Some("tag"));
    assert_eq!(registry.option("test.look.[box").and_then(|o| o.string()), Some("moved"));

    Ok(())
}

#[test]
fn test_null_lines() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("test.conf"),
        "[look]\nnick\nwidth = null\n[box = null\n",
    )?;

    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert!(registry.option("test.look.nick").map(|o| o.is_null()).unwrap_or(false));
    assert_eq!(registry.option("test.look.width").map(|o| o.integer()), Some(10));
    assert_eq!(report.count(WarningKind::InvalidValue), 2);
    let lines: Vec<usize> = report.warnings.iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![3, 4]);
    assert_eq!(registry.option("test.look.[box").and_then(|o| o.string()), Some("inside"));

    Ok(())
}

#[test]
fn test_unknown_section_lines_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("test.conf"),
        "[retired]\nwidth = 99\nanything = goes\n[look]\nwidth = 20\n",
    )?;

    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::UnknownSection);
    assert_eq!(registry.option("test.look.width").map(|o| o.integer()), Some(20));

    Ok(())
}

#[test]
fn test_missing_bracket_keeps_current_section() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("test.conf"),
        "[look]\n[broken\nwidth = 30\n",
    )?;

    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert_eq!(report.count(WarningKind::MissingBracket), 1);
    assert_eq!(registry.option("test.look.width").map(|o| o.integer()), Some(30));

    Ok(())
}

#[test]
fn test_invalid_version_backs_up_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    let path = temp_dir.path().join("test.conf");
    fs::write(&path, "config_version = two\n[look]\nwidth = 50\n")?;

    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert!(matches!(report.rejected, Some(ConfigError::InvalidVersion { .. })));
    assert!(report.backup.is_some());
    assert_eq!(registry.option("test.look.width").map(|o| o.integer()), Some(10));

    let second = registry.file_mut("test").ok_or("missing file")?.read()?;
    let first_backup = report.backup.ok_or("missing backup")?;
    let second_backup = second.backup.ok_or("missing backup")?;
    assert_ne!(first_backup, second_backup);
    assert_eq!(backup::list_backups(&path)?.len(), 2);

    Ok(())
}

#[test]
fn test_huge_line_is_read() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    let long = "x".repeat(100_000);
    fs::write(
        temp_dir.path().join("test.conf"),
        format!("[look]\nnick = \"{}\"\n", long),
    )?;

    registry.file_mut("test").ok_or("missing file")?.read()?;
    assert_eq!(
        registry.option("test.look.nick").and_then(|o| o.string()).map(str::len),
        Some(100_000)
    );

    Ok(())
}

#[test]
fn test_delete_callback_decides_unset() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    let file = registry.file_mut("test").ok_or("missing file")?;
    let keys = file.new_section(
        SectionSpec::new("keys")
            .user_can_delete_options(true)
            .on_delete_option(|section, name| -> ConfigResult<UnsetOutcome> {
                if name.starts_with("meta-") {
                    section.remove_option(name)?;
                    Ok(UnsetOutcome::Removed)
                } else {
                    Ok(UnsetOutcome::NoReset)
                }
            }),
    )?;
    keys.new_option(OptionSpec::string("meta-a").default_value("/help"))?;
    keys.new_option(OptionSpec::string("ctrl-a").default_value("/home"))?;

    assert_eq!(registry.unset_option("test.keys.meta-a")?, UnsetOutcome::Removed);
    assert_eq!(registry.unset_option("test.keys.ctrl-a")?, UnsetOutcome::NoReset);
    assert!(registry.option("test.keys.meta-a").is_none());
    assert!(registry.option("test.keys.ctrl-a").is_some());

    Ok(())
}

#[test]
fn test_empty_file_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut registry = registry_in(temp_dir.path())?;
    fs::write(temp_dir.path().join("test.conf"), "")?;

    let report = registry.file_mut("test").ok_or("missing file")?.read()?;
    assert_eq!(report.lines_read, 0);
    assert!(!report.bootstrapped);
    let nick = registry.option("test.look.nick").ok_or("missing option")?;
    assert!(nick.is_null());
    assert_eq!(nick.string_default(), Some("bob"));
    assert_eq!(registry.string_inherited(nick), Some("bob"));

    Ok(())
}
