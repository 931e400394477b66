//! Local form validation -- pure logic, no network access.
//!
//! Checks presence of required fields, kind constraints (number, date,
//! enum) and fixed format patterns. Runs before any request is issued.

use std::collections::{BTreeMap, HashMap};
use std::sync::{LazyLock, Mutex, PoisonError};

use chrono::NaiveDate;
use regex::Regex;

use crate::form::{FieldValue, FormValues};
use crate::schema::{EntitySchema, FieldDef, FieldKind, FieldValidator};

/// Field name to error message. Empty when the form is valid.
pub type FieldErrors = BTreeMap<String, String>;

/// Date format accepted by [`FieldKind::Date`] fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]{5,19}$").expect("valid regex"));

/// Compiled schema patterns keyed by source; `None` when it does not compile.
static PATTERNS: LazyLock<Mutex<HashMap<&'static str, Option<Regex>>>> =
    LazyLock::new(Default::default);

/// Validate every field of `schema` against `values`.
pub fn validate(schema: &EntitySchema, values: &FormValues) -> FieldErrors {
    schema
        .fields
        .iter()
        .filter_map(|def| {
            validate_field(def, values.get(def.name)).map(|msg| (def.name.to_string(), msg))
        })
        .collect()
}

/// Validate a single field value. Returns the error message, if any.
pub fn validate_field(def: &FieldDef, value: Option<&FieldValue>) -> Option<String> {
    let text = match value {
        // Booleans are always present and carry no format.
        Some(FieldValue::Bool(_)) => return None,
        Some(FieldValue::Text(s)) => s.trim(),
        None => "",
    };

    if text.is_empty() {
        return def.required.then(|| format!("{} is required", def.label));
    }

    if let Some(msg) = check_kind(def, text) {
        return Some(msg);
    }

    def.validator.and_then(|v| check_format(def, v, text))
}

fn check_kind(def: &FieldDef, text: &str) -> Option<String> {
    match def.kind {
        FieldKind::Text | FieldKind::Boolean => None,
        FieldKind::Number => match text.parse::<f64>() {
            Ok(n) if n.is_finite() => None,
            _ => Some(format!("{} must be a number", def.label)),
        },
        FieldKind::Date => match NaiveDate::parse_from_str(text, DATE_FORMAT) {
            Ok(_) => None,
            Err(_) => Some(format!("{} must be a date (YYYY-MM-DD)", def.label)),
        },
        FieldKind::Enum(options) => {
            if options.contains(&text) {
                None
            } else {
                Some(format!("{} must be one of: {}", def.label, options.join(", ")))
            }
        }
    }
}

fn check_format(def: &FieldDef, validator: FieldValidator, text: &str) -> Option<String> {
    let ok = match validator {
        FieldValidator::Email => EMAIL_RE.is_match(text),
        FieldValidator::Url => URL_RE.is_match(text),
        FieldValidator::Phone => PHONE_RE.is_match(text),
        FieldValidator::Pattern(pattern) => pattern_matches(pattern, text),
    };

    if ok {
        return None;
    }

    let what = match validator {
        FieldValidator::Email => "a valid email address",
        FieldValidator::Url => "a valid URL",
        FieldValidator::Phone => "a valid phone number",
        FieldValidator::Pattern(_) => return Some(format!("{} has an invalid format", def.label)),
    };
    Some(format!("{} must be {what}", def.label))
}

/// Match `text` against a schema pattern, compiling it on first use.
/// A pattern that does not compile never blocks the user.
fn pattern_matches(pattern: &'static str, text: &str) -> bool {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    match cache
        .entry(pattern)
        .or_insert_with(|| Regex::new(pattern).ok())
    {
        Some(re) => re.is_match(text),
        None => true,
    }
}
