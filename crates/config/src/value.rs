//! Value codec: storage, canonical strings and the mutation grammar
//!
//! Every option stores its value as a [`Value`] whose variant matches the
//! option's [`OptionType`]. Incoming text is turned into a new value by
//! [`Codec::apply`], which understands the per-type grammar:
//!
//! | Type    | Direct value          | `++N` / `--N`                  |
//! |---------|-----------------------|--------------------------------|
//! | boolean | true/false words      | n/a (`toggle` flips)           |
//! | integer | decimal, clamped      | offset, clamped (unset: in range) |
//! | string  | any text              | n/a                            |
//! | color   | palette name or id    | offset in palette order        |
//! | enum    | exact variant name    | offset, wraps around           |

use crate::context::ColorPalette;
use std::fmt;

/// Words accepted as boolean true (case-sensitive)
pub const BOOLEAN_TRUE: [&str; 6] = ["on", "yes", "y", "true", "t", "1"];

/// Words accepted as boolean false (case-sensitive)
pub const BOOLEAN_FALSE: [&str; 6] = ["off", "no", "n", "false", "f", "0"];

/// Special boolean input that flips the current value
pub const TOGGLE: &str = "toggle";

/// The five option types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Boolean,
    Integer,
    String,
    Color,
    Enum,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Boolean => "boolean",
            OptionType::Integer => "integer",
            OptionType::String => "string",
            OptionType::Color => "color",
            OptionType::Enum => "enum",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
    /// Color id as resolved by the palette
    Color(i32),
    /// Index into the option's variant list
    Enum(usize),
}

impl Value {
    pub fn option_type(&self) -> OptionType {
        match self {
            Value::Boolean(_) => OptionType::Boolean,
            Value::Integer(_) => OptionType::Integer,
            Value::String(_) => OptionType::String,
            Value::Color(_) => OptionType::Color,
            Value::Enum(_) => OptionType::Enum,
        }
    }
}

/// Parses a boolean word, `None` if the word is not in either set
pub fn parse_boolean(text: &str) -> Option<bool> {
    if BOOLEAN_TRUE.contains(&text) {
        Some(true)
    } else if BOOLEAN_FALSE.contains(&text) {
        Some(false)
    } else {
        None
    }
}

/// Converts text to a boolean: true words are true, anything else false
pub fn string_to_boolean(text: &str) -> bool {
    BOOLEAN_TRUE.contains(&text)
}

/// Parses `++N` / `--N` into a signed offset.
///
/// Returns `None` when the input has no increment prefix and `Some(None)`
/// when the prefix is present but the number is not.
fn parse_increment(input: &str) -> Option<Option<i64>> {
    if let Some(rest) = input.strip_prefix("++") {
        Some(rest.parse::<i64>().ok())
    } else if let Some(rest) = input.strip_prefix("--") {
        Some(rest.parse::<i64>().ok().and_then(i64::checked_neg))
    } else {
        None
    }
}

/// Type information needed to parse and format values of one option
pub(crate) struct Codec<'a> {
    pub(crate) kind: OptionType,
    pub(crate) min: i64,
    pub(crate) max: i64,
    pub(crate) variants: &'a [String],
    pub(crate) palette: &'a dyn ColorPalette,
}

impl Codec<'_> {
    fn clamp(&self, number: i64) -> i64 {
        number.clamp(self.min, self.max)
    }

    /// Lenient conversion used for values given at construction time
    pub(crate) fn convert(&self, text: &str) -> Value {
        match self.kind {
            OptionType::Boolean => Value::Boolean(string_to_boolean(text)),
            OptionType::Integer => Value::Integer(self.clamp(text.parse::<i64>().unwrap_or(0))),
            OptionType::String => Value::String(text.to_string()),
            OptionType::Color => Value::Color(self.palette.assign(text).unwrap_or(0)),
            OptionType::Enum => Value::Enum(
                self.variants
                    .iter()
                    .position(|variant| variant == text)
                    .unwrap_or(0),
            ),
        }
    }

    /// Applies the mutation grammar of the type to `input`.
    ///
    /// `current` is the value being mutated (increments start from it, or
    /// from zero when it is unset). Returns `None` if the input is rejected.
    pub(crate) fn apply(&self, current: Option<&Value>, input: &str) -> Option<Value> {
        match self.kind {
            OptionType::Boolean => {
                if input == TOGGLE {
                    let flipped = !matches!(current, Some(Value::Boolean(true)));
                    Some(Value::Boolean(flipped))
                } else {
                    parse_boolean(input).map(Value::Boolean)
                }
            }
            OptionType::Integer => {
                let number = match (parse_increment(input), current) {
                    (Some(delta), Some(Value::Integer(base))) => base.saturating_add(delta?),
                    // An unset value only accepts increments that land in range
                    (Some(delta), _) => {
                        let number = delta?;
                        if number < self.min || number > self.max {
                            return None;
                        }
                        number
                    }
                    (None, _) => input.parse::<i64>().ok()?,
                };
                Some(Value::Integer(self.clamp(number)))
            }
            OptionType::String => Some(Value::String(input.to_string())),
            OptionType::Color => {
                let base = match current {
                    Some(Value::Color(color)) => *color,
                    _ => 0,
                };
                let color = match parse_increment(input) {
                    Some(delta) => self.palette.assign_by_diff(base, delta?)?,
                    None => self.palette.assign(input)?,
                };
                (i64::from(color) >= self.min && i64::from(color) <= self.max)
                    .then_some(Value::Color(color))
            }
            OptionType::Enum => {
                let size = self.variants.len() as i64;
                if size == 0 {
                    return None;
                }
                let base = match current {
                    Some(Value::Enum(index)) => *index as i64,
                    _ => 0,
                };
                match parse_increment(input) {
                    Some(delta) => {
                        let index = (base + delta?.rem_euclid(size)) % size;
                        Some(Value::Enum(index as usize))
                    }
                    None => self
                        .variants
                        .iter()
                        .position(|variant| variant == input)
                        .map(Value::Enum),
                }
            }
        }
    }

    /// Canonical string form of a value
    pub(crate) fn format(&self, value: &Value) -> String {
        match value {
            Value::Boolean(true) => "on".to_string(),
            Value::Boolean(false) => "off".to_string(),
            Value::Integer(number) => number.to_string(),
            Value::String(text) => text.clone(),
            Value::Color(color) => self
                .palette
                .name(*color)
                .unwrap_or_else(|| color.to_string()),
            Value::Enum(index) => self.variants.get(*index).cloned().unwrap_or_default(),
        }
    }

    /// Form written to disk: strings are double-quoted
    pub(crate) fn format_for_file(&self, value: &Value) -> String {
        match value {
            Value::String(text) => format!("\"{}\"", text),
            other => self.format(other),
        }
    }
}
