//! Options: named, typed cells with a default, bounds and callbacks
//!
//! Options are created through [`Section::new_option`](crate::Section::new_option)
//! from an [`OptionSpec`]. Every mutation returns a [`SetOutcome`] or an
//! error; a `Changed` outcome runs the option's change callback and then
//! publishes the new canonical value to the [`ChangeNotifier`](crate::ChangeNotifier).

use crate::context::EngineContext;
use crate::registry::OptionLocation;
use crate::validation::{ValidationError, Validator};
use crate::value::{Codec, OptionType, Value};
use crate::{ConfigError, ConfigResult, NULL_VALUE};
use std::cell::Cell;
use std::sync::Arc;

/// Separator declaring a parent in an option name: `"child << file.section.parent"`
pub const PARENT_SEPARATOR: &str = " << ";

/// Successful result of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The stored value changed; callbacks and notification ran
    Changed,
    /// The stored value was already the requested one
    SameValue,
}

/// Successful result of an unset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsetOutcome {
    /// The option already had its default value
    NoReset,
    /// The option was reset to its default value
    Reset,
    /// The option was removed from its section
    Removed,
}

/// Veto callback run before a value is set; `false` rejects the value
pub type CheckValueCallback = Arc<dyn Fn(&ConfigOption, Option<&str>) -> bool + Send + Sync>;

/// Callback run after a committed change, or before removal
pub type OptionCallback = Arc<dyn Fn(&ConfigOption) + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct OptionCallbacks {
    check_value: Option<CheckValueCallback>,
    change: Option<OptionCallback>,
    delete: Option<OptionCallback>,
}

/// Definition of an option, consumed by [`Section::new_option`](crate::Section::new_option)
#[derive(Clone)]
pub struct OptionSpec {
    name: String,
    option_type: OptionType,
    description: String,
    string_values: Vec<String>,
    min: i64,
    max: i64,
    default_value: Option<String>,
    value: Option<String>,
    null_value_allowed: bool,
    callbacks: OptionCallbacks,
}

impl OptionSpec {
    /// Starts a definition; the name may declare a parent with `" << "`
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            option_type,
            description: String::new(),
            string_values: Vec::new(),
            min: 0,
            max: 0,
            default_value: None,
            value: None,
            null_value_allowed: false,
            callbacks: OptionCallbacks::default(),
        }
    }

    /// Starts a boolean definition
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::Boolean)
    }

    /// Starts an integer definition bounded by `min..=max`
    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(name, OptionType::Integer).range(min, max)
    }

    /// Starts a string definition
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::String)
    }

    /// Starts a color definition; its bounds come from the palette
    pub fn color(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::Color)
    }

    /// Enum over `"a|b|c"` variants
    pub fn enumeration(name: impl Into<String>, variants: &str) -> Self {
        Self::new(name, OptionType::Enum).string_values(variants)
    }

    /// Sets the help text shown to users
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the variant list from a `|`-separated string
    ///
    /// Entries keep their text as given; empty entries are dropped. A
    /// non-empty list on an integer option turns it into an enum.
    pub fn string_values(mut self, variants: &str) -> Self {
        self.string_values = variants
            .split('|')
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        self
    }

    /// Sets the integer bounds
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the default value, in text form
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the initial value, in text form
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets whether the value and default value may be null
    pub fn null_allowed(mut self, allowed: bool) -> Self {
        self.null_value_allowed = allowed;
        self
    }

    /// Sets the callback that may veto a new value
    pub fn on_check_value<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ConfigOption, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.callbacks.check_value = Some(Arc::new(callback));
        self
    }

    /// Sets the callback run after the value changed
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ConfigOption) + Send + Sync + 'static,
    {
        self.callbacks.change = Some(Arc::new(callback));
        self
    }

    /// Sets the callback run before the option is removed
    pub fn on_delete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ConfigOption) + Send + Sync + 'static,
    {
        self.callbacks.delete = Some(Arc::new(callback));
        self
    }

    /// Name of the option, without any parent declaration
    pub(crate) fn option_name(&self) -> &str {
        match self.name.find(PARENT_SEPARATOR) {
            Some(pos) => &self.name[..pos],
            None => &self.name,
        }
    }
}

/// A configuration option owned by a section
pub struct ConfigOption {
    name: String,
    config_name: String,
    section_name: String,
    parent_name: Option<String>,
    parent_cache: Cell<Option<OptionLocation>>,
    option_type: OptionType,
    description: String,
    string_values: Vec<String>,
    min: i64,
    max: i64,
    default_value: Option<Value>,
    value: Option<Value>,
    null_value_allowed: bool,
    callbacks: OptionCallbacks,
    loaded: bool,
    context: Arc<EngineContext>,
}

impl ConfigOption {
    /// Builds an option from its definition, validating it first
    pub(crate) fn build(
        spec: OptionSpec,
        config_name: &str,
        section_name: &str,
        context: Arc<EngineContext>,
    ) -> ConfigResult<Self> {
        let (name, parent_name) = match spec.name.split_once(PARENT_SEPARATOR) {
            Some((name, parent)) => (name.to_string(), Some(parent.to_string())),
            None => (spec.name.clone(), None),
        };
        let field = format!("{}.{}.{}", config_name, section_name, name);

        let option_type = match spec.option_type {
            OptionType::Integer if !spec.string_values.is_empty() => OptionType::Enum,
            other => other,
        };

        let mut default_value = spec.default_value;
        let mut value = spec.value;
        if !spec.null_value_allowed {
            if value.is_none() {
                value = default_value.clone();
            } else if default_value.is_none() {
                default_value = value.clone();
            }
        }

        let (min, max) = match option_type {
            OptionType::Boolean => (0, 1),
            OptionType::Color => (spec.min, i64::from(context.palette().count()) - 1),
            OptionType::Enum => (0, spec.string_values.len() as i64 - 1),
            OptionType::Integer | OptionType::String => (spec.min, spec.max),
        };

        let mut checks = vec![Validator::not_empty(&name, &field)];
        if option_type == OptionType::Enum {
            checks.push(Validator::has_entries(&spec.string_values, &field));
        } else {
            checks.push(Validator::ordered(min, max, &field));
        }
        if !spec.null_value_allowed && default_value.is_none() {
            checks.push(Err(ValidationError::new(
                &field,
                "needs a default value or a value when null is not allowed",
            )));
        }
        Validator::collect_errors(checks)?;

        let mut option = Self {
            name,
            config_name: config_name.to_string(),
            section_name: section_name.to_string(),
            parent_name,
            parent_cache: Cell::new(None),
            option_type,
            description: spec.description,
            string_values: spec.string_values,
            min,
            max,
            default_value: None,
            value: None,
            null_value_allowed: spec.null_value_allowed,
            callbacks: spec.callbacks,
            loaded: true,
            context,
        };
        option.default_value = default_value.as_deref().map(|text| option.codec().convert(text));
        option.value = value.as_deref().map(|text| option.codec().convert(text));

        Ok(option)
    }

    fn codec(&self) -> Codec<'_> {
        Codec {
            kind: self.option_type,
            min: self.min,
            max: self.max,
            variants: &self.string_values,
            palette: self.context.palette(),
        }
    }

    fn invalid(&self, value: Option<&str>) -> ConfigError {
        ConfigError::invalid_value(self.full_name(), value)
    }

    /// Returns the option name, without file and section
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path `file.section.option`
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.config_name, self.section_name, self.name)
    }

    /// Returns the name of the owning file
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Returns the name of the owning section
    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    /// Returns the full path of the parent option, if one was declared
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Returns the type of the option
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Returns the help text
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the enum variants, empty for other types
    pub fn string_values(&self) -> &[String] {
        &self.string_values
    }

    /// Returns the lower bound
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Returns the upper bound
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Returns true if null may be stored
    pub fn null_value_allowed(&self) -> bool {
        self.null_value_allowed
    }

    /// Returns the current value, `None` when null
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns the default value, `None` when null
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Returns true if the current value is null
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Returns true if the default value is null
    pub fn default_is_null(&self) -> bool {
        self.default_value.is_none()
    }

    /// True when the current value differs from the default value
    pub fn has_changed(&self) -> bool {
        self.value != self.default_value
    }

    /// Canonical string of the value (or default value), `None` when null
    pub fn value_to_string(&self, default: bool) -> Option<String> {
        let slot = if default {
            self.default_value.as_ref()
        } else {
            self.value.as_ref()
        };
        slot.map(|value| self.codec().format(value))
    }

    /// Right-hand side of the `name = value` line written to disk
    pub(crate) fn file_value(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(|value| self.codec().format_for_file(value))
    }

    // Typed getters. Each returns a neutral value (false, 0, None) when the
    // slot is null or the type does not carry that kind of value.

    /// Returns the boolean value
    pub fn boolean(&self) -> bool {
        matches!(self.value, Some(Value::Boolean(true)))
    }

    /// Returns the boolean default value
    pub fn boolean_default(&self) -> bool {
        matches!(self.default_value, Some(Value::Boolean(true)))
    }

    /// Returns the value as an integer; booleans and colors convert
    pub fn integer(&self) -> i64 {
        Self::integer_of(self.value.as_ref())
    }

    /// Returns the default value as an integer
    pub fn integer_default(&self) -> i64 {
        Self::integer_of(self.default_value.as_ref())
    }

    /// Returns the value as text; enums give their variant name
    pub fn string(&self) -> Option<&str> {
        self.string_of(self.value.as_ref())
    }

    /// Returns the default value as text
    pub fn string_default(&self) -> Option<&str> {
        self.string_of(self.default_value.as_ref())
    }

    /// Returns the color id
    pub fn color(&self) -> i32 {
        match self.value {
            Some(Value::Color(color)) => color,
            _ => 0,
        }
    }

    /// Returns the default color id
    pub fn color_default(&self) -> i32 {
        match self.default_value {
            Some(Value::Color(color)) => color,
            _ => 0,
        }
    }

    /// Returns the enum index
    pub fn enum_index(&self) -> usize {
        match self.value {
            Some(Value::Enum(index)) => index,
            _ => 0,
        }
    }

    /// Returns the default enum index
    pub fn enum_index_default(&self) -> usize {
        match self.default_value {
            Some(Value::Enum(index)) => index,
            _ => 0,
        }
    }

    fn integer_of(value: Option<&Value>) -> i64 {
        match value {
            Some(Value::Boolean(flag)) => i64::from(*flag),
            Some(Value::Integer(number)) => *number,
            Some(Value::Color(color)) => i64::from(*color),
            Some(Value::Enum(index)) => *index as i64,
            Some(Value::String(_)) | None => 0,
        }
    }

    fn string_of<'a>(&'a self, value: Option<&'a Value>) -> Option<&'a str> {
        match value {
            Some(Value::String(text)) => Some(text),
            Some(Value::Enum(index)) => self.string_values.get(*index).map(String::as_str),
            Some(Value::Boolean(true)) => Some("on"),
            Some(Value::Boolean(false)) => Some("off"),
            _ => None,
        }
    }

    /// Sets the value through the type's grammar; `None` sets null
    pub fn set(&mut self, value: Option<&str>) -> ConfigResult<SetOutcome> {
        if let Some(check) = &self.callbacks.check_value {
            if !check(self, value) {
                return Err(self.invalid(value));
            }
        }

        let outcome = match value {
            None => {
                if !self.null_value_allowed {
                    return Err(self.invalid(None));
                }
                Self::commit_null(&mut self.value)
            }
            Some(text) => {
                let new_value = self
                    .codec()
                    .apply(self.value.as_ref(), text)
                    .ok_or_else(|| self.invalid(Some(text)))?;
                Self::commit(&mut self.value, new_value)
            }
        };

        self.after_mutation(outcome);
        Ok(outcome)
    }

    /// Copies the default value into the value
    pub fn reset(&mut self) -> ConfigResult<SetOutcome> {
        let outcome = match self.default_value.clone() {
            Some(default) => Self::commit(&mut self.value, default),
            None if self.null_value_allowed => Self::commit_null(&mut self.value),
            None => return Err(self.invalid(None)),
        };

        self.after_mutation(outcome);
        Ok(outcome)
    }

    /// Sets the default value through the type's grammar; `None` sets null
    pub fn set_default(&mut self, value: Option<&str>) -> ConfigResult<SetOutcome> {
        let outcome = match value {
            None => {
                if !self.null_value_allowed {
                    return Err(self.invalid(None));
                }
                Self::commit_null(&mut self.default_value)
            }
            Some(text) => {
                let new_value = self
                    .codec()
                    .apply(self.default_value.as_ref(), text)
                    .ok_or_else(|| self.invalid(Some(text)))?;
                Self::commit(&mut self.default_value, new_value)
            }
        };

        self.after_mutation(outcome);
        Ok(outcome)
    }

    /// Sets the value to null, if null is allowed
    pub fn set_null(&mut self) -> ConfigResult<SetOutcome> {
        if !self.null_value_allowed {
            return Err(self.invalid(None));
        }
        let outcome = Self::commit_null(&mut self.value);

        self.after_mutation(outcome);
        Ok(outcome)
    }

    /// Toggles the value.
    ///
    /// Without candidates, booleans flip and strings alternate between empty
    /// and their default; other types are rejected. With candidates, the
    /// entry after the current value is applied (the literal `null` stands
    /// for a null value). The last entry wraps to the first, unless there is
    /// only one candidate, in which case the option is reset.
    pub fn toggle(&mut self, candidates: Option<&[&str]>) -> ConfigResult<SetOutcome> {
        let target: Option<String> = match candidates {
            None => match (self.option_type, &self.value) {
                (OptionType::Boolean, Some(Value::Boolean(true))) => Some("off".to_string()),
                (OptionType::Boolean, _) => Some("on".to_string()),
                (OptionType::String, Some(Value::String(text))) if text.is_empty() => {
                    self.string_default().map(String::from)
                }
                (OptionType::String, _) => Some(String::new()),
                _ => return Err(self.invalid(Some("toggle"))),
            },
            Some([]) => return Err(self.invalid(Some("toggle"))),
            Some(values) => {
                let current = self.value_to_string(false);
                let found = values.iter().position(|candidate| match &current {
                    None => *candidate == NULL_VALUE,
                    Some(text) => candidate == text,
                });
                let next = match found {
                    Some(index) if index + 1 < values.len() => values[index + 1],
                    Some(_) if values.len() < 2 => return self.reset(),
                    _ => values[0],
                };
                (next != NULL_VALUE).then(|| next.to_string())
            }
        };

        self.set(target.as_deref())
    }

    fn commit(slot: &mut Option<Value>, new_value: Value) -> SetOutcome {
        if slot.as_ref() == Some(&new_value) {
            SetOutcome::SameValue
        } else {
            *slot = Some(new_value);
            SetOutcome::Changed
        }
    }

    fn commit_null(slot: &mut Option<Value>) -> SetOutcome {
        if slot.take().is_some() {
            SetOutcome::Changed
        } else {
            SetOutcome::SameValue
        }
    }

    fn after_mutation(&self, outcome: SetOutcome) {
        if outcome == SetOutcome::Changed {
            if let Some(change) = &self.callbacks.change {
                change(self);
            }
            self.notify();
        }
    }

    /// Publishes the current value to the change notifier
    pub(crate) fn notify(&self) {
        let value = self.value_to_string(false);
        self.context
            .notifier()
            .option_changed(&self.full_name(), value.as_deref());
    }

    /// Runs the delete callback, then publishes a null value
    pub(crate) fn notify_removed(&self) {
        if let Some(delete) = &self.callbacks.delete {
            delete(self);
        }
        self.context
            .notifier()
            .option_changed(&self.full_name(), None);
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_parent_name(&mut self, parent_name: &str) {
        self.parent_name = Some(parent_name.to_string());
        self.parent_cache.set(None);
    }

    pub(crate) fn cached_parent(&self) -> Option<OptionLocation> {
        self.parent_cache.get()
    }

    pub(crate) fn cache_parent(&self, location: Option<OptionLocation>) {
        self.parent_cache.set(location);
    }
}

impl std::fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOption")
            .field("name", &self.full_name())
            .field("type", &self.option_type)
            .field("parent_name", &self.parent_name)
            .field("default_value", &self.default_value)
            .field("value", &self.value)
            .field("null_value_allowed", &self.null_value_allowed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> Arc<EngineContext> {
        Arc::new(EngineContext::new("/tmp/termconf-test"))
    }

    fn build(spec: OptionSpec) -> ConfigResult<ConfigOption> {
        ConfigOption::build(spec, "test", "look", context())
    }

    #[test]
    fn test_integer_set_then_same_value() {
        let mut option = build(OptionSpec::integer("width", 0, 10).default_value("5"))
            .expect("Should build");
        assert_eq!(option.set(Some("7")).expect("Should set"), SetOutcome::Changed);
        assert_eq!(option.set(Some("7")).expect("Should set"), SetOutcome::SameValue);
        assert_eq!(option.integer(), 7);
    }

    #[test]
    fn test_integer_increment_clamps_to_max() {
        let mut option = build(OptionSpec::integer("width", 0, 10).default_value("5"))
            .expect("Should build");
        assert_eq!(option.set(Some("++100")).expect("Should set"), SetOutcome::Changed);
        assert_eq!(option.integer(), 10);
    }

    #[test]
    fn test_out_of_range_increment_keeps_null_value() {
        let mut option = build(OptionSpec::integer("width", 0, 10).null_allowed(true))
            .expect("Should build");
        assert!(option.is_null());
        assert!(matches!(option.set(Some("++100")), Err(ConfigError::InvalidValue { .. })));
        assert!(option.is_null());
        assert!(option.set_default(Some("--1")).is_err());
        assert!(option.default_is_null());

        assert_eq!(option.set(Some("++4")).expect("Should set"), SetOutcome::Changed);
        assert_eq!(option.integer(), 4);
    }

    #[test]
    fn test_enum_increments() {
        let mut option = build(OptionSpec::enumeration("level", "low|medium|high").default_value("low"))
            .expect("Should build");
        option.set(Some("++1")).expect("Should set");
        assert_eq!(option.string(), Some("medium"));
        option.set(Some("++2")).expect("Should set");
        assert_eq!(option.string(), Some("low"));
    }

    #[test]
    fn test_integer_with_values_becomes_enum() {
        let option = build(OptionSpec::integer("level", 0, 0).string_values("a|b").default_value("b"))
            .expect("Should build");
        assert_eq!(option.option_type(), OptionType::Enum);
        assert_eq!(option.max(), 1);
        assert_eq!(option.enum_index(), 1);
    }

    #[test]
    fn test_enum_without_values_is_rejected() {
        let result = build(OptionSpec::new("level", OptionType::Enum).default_value("x"));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_non_null_needs_a_value() {
        assert!(build(OptionSpec::boolean("flag")).is_err());

        let only_default = build(OptionSpec::boolean("flag").default_value("on")).expect("Should build");
        assert!(only_default.boolean());

        let only_value = build(OptionSpec::boolean("flag").value("on")).expect("Should build");
        assert!(only_value.boolean_default());
    }

    #[test]
    fn test_nullable_slots_are_independent() {
        let option = build(OptionSpec::string("nick").null_allowed(true).default_value("bob"))
            .expect("Should build");
        assert!(option.is_null());
        assert!(!option.default_is_null());
        assert!(option.has_changed());
    }

    #[test]
    fn test_set_null_rules() {
        let mut strict = build(OptionSpec::string("nick").default_value("bob")).expect("Should build");
        assert!(strict.set(None).is_err());
        assert!(strict.set_null().is_err());

        let mut loose = build(OptionSpec::string("nick").null_allowed(true).value("bob"))
            .expect("Should build");
        assert_eq!(loose.set_null().expect("Should set"), SetOutcome::Changed);
        assert_eq!(loose.set(None).expect("Should set"), SetOutcome::SameValue);
    }

    #[test]
    fn test_check_value_vetoes_before_change() {
        let mut option = build(
            OptionSpec::string("nick")
                .default_value("bob")
                .on_check_value(|_, value| value != Some("root")),
        )
        .expect("Should build");
        assert!(option.set(Some("root")).is_err());
        assert_eq!(option.string(), Some("bob"));
        assert!(option.set(Some("alice")).is_ok());
    }

    #[test]
    fn test_change_callback_runs_only_on_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut option = build(
            OptionSpec::boolean("flag")
                .default_value("off")
                .on_change(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .expect("Should build");

        option.set(Some("on")).expect("Should set");
        option.set(Some("yes")).expect("Should set");
        option.reset().expect("Should reset");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_boolean_double_toggle_restores() {
        let mut option = build(OptionSpec::boolean("flag").default_value("on")).expect("Should build");
        option.toggle(None).expect("Should toggle");
        assert!(!option.boolean());
        option.toggle(None).expect("Should toggle");
        assert!(option.boolean());
    }

    #[test]
    fn test_string_toggle_alternates_with_default() {
        let mut option = build(OptionSpec::string("prefix").default_value(">>")).expect("Should build");
        option.toggle(None).expect("Should toggle");
        assert_eq!(option.string(), Some(""));
        option.toggle(None).expect("Should toggle");
        assert_eq!(option.string(), Some(">>"));
    }

    #[test]
    fn test_toggle_rejected_for_integer_without_candidates() {
        let mut option = build(OptionSpec::integer("width", 0, 10).default_value("5"))
            .expect("Should build");
        assert!(option.toggle(None).is_err());
    }

    #[test]
    fn test_toggle_with_candidates() {
        let mut option = build(OptionSpec::integer("width", 0, 100).default_value("10"))
            .expect("Should build");
        let candidates = ["10", "20", "30"];
        option.toggle(Some(&candidates)).expect("Should toggle");
        assert_eq!(option.integer(), 20);
        option.toggle(Some(&candidates)).expect("Should toggle");
        option.toggle(Some(&candidates)).expect("Should toggle");
        assert_eq!(option.integer(), 10);

        option.set(Some("55")).expect("Should set");
        option.toggle(Some(&candidates)).expect("Should toggle");
        assert_eq!(option.integer(), 10);
    }

    #[test]
    fn test_toggle_single_candidate_resets() {
        let mut option = build(OptionSpec::integer("width", 0, 100).default_value("10"))
            .expect("Should build");
        option.set(Some("42")).expect("Should set");
        option.toggle(Some(&["42"])).expect("Should toggle");
        assert_eq!(option.integer(), 10);
    }

    #[test]
    fn test_set_default_keeps_value() {
        let mut option = build(OptionSpec::integer("width", 0, 10).default_value("5"))
            .expect("Should build");
        assert_eq!(option.set_default(Some("8")).expect("Should set"), SetOutcome::Changed);
        assert_eq!(option.integer(), 5);
        assert_eq!(option.integer_default(), 8);
        option.reset().expect("Should reset");
        assert_eq!(option.integer(), 8);
    }

    #[test]
    fn test_parent_declared_in_name() {
        let option = build(
            OptionSpec::string("nick << test.defaults.nick").null_allowed(true),
        )
        .expect("Should build");
        assert_eq!(option.name(), "nick");
        assert_eq!(option.parent_name(), Some("test.defaults.nick"));
    }

    #[test]
    fn test_value_to_string_forms() {
        let option = build(OptionSpec::color("fg").default_value("red")).expect("Should build");
        assert_eq!(option.value_to_string(false).as_deref(), Some("red"));
        assert_eq!(option.max(), 16);

        let text = build(OptionSpec::string("nick").default_value("bob")).expect("Should build");
        assert_eq!(text.file_value().as_deref(), Some("\"bob\""));
    }
}
