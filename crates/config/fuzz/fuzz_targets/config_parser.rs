//! Fuzzing harness for the configuration file reader
//!
//! Arbitrary input must never panic the reader, only produce warnings.
//! Run with: cargo fuzz run config_parser

#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use termconf_config::{ConfigFile, EngineContext, MigrationData, OptionSpec, SectionSpec};

fn fuzz_file() -> Option<ConfigFile> {
    let context = Arc::new(EngineContext::new("/nonexistent/termconf-fuzz"));
    let mut file = ConfigFile::new("fuzz", context).ok()?;
    file.set_version(2).ok()?;
    file.set_migration(|data: &mut MigrationData| {
        if data.option.as_deref() == Some("drop") {
            data.option = Some(String::new());
        }
    });

    let look = file.new_section(SectionSpec::new("look")).ok()?;
    look.new_option(OptionSpec::boolean("flag").default_value("off")).ok()?;
    look.new_option(OptionSpec::integer("width", -10, 10).default_value("0")).ok()?;
    look.new_option(OptionSpec::string("text").null_allowed(true)).ok()?;
    look.new_option(OptionSpec::color("tint").default_value("default")).ok()?;
    look.new_option(OptionSpec::enumeration("mode", "a|b|c").default_value("a")).ok()?;
    Some(file)
}

fuzz_target!(|data: &[u8]| {
    if let Some(mut file) = fuzz_file() {
        let _ = file.parse_from(Cursor::new(data), Path::new("fuzz.conf"));
    }
});
