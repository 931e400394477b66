//! Form session state machine.
//!
//! One session collects and validates a single record's fields before the
//! controller sends them to the backend:
//!
//! ```text
//! Closed -> Open(Create|Edit|Delete) -> Submitting -> Closed      (success)
//!                                                  -> Open+error  (failure)
//! ```
//!
//! Field errors are per field and cleared as soon as the user edits that
//! field. The submission error is a separate slot, cleared only when the
//! next submission starts. Delete confirmation is a session without
//! editable fields.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::error::CoreError;
use crate::record::Record;
use crate::schema::{EntitySchema, FieldDef, FieldKind};
use crate::validation::{self, FieldErrors};

/// Value held by one form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    /// Blank default for a field: `false` for booleans, `""` otherwise.
    pub fn blank(def: &FieldDef) -> Self {
        match def.kind {
            FieldKind::Boolean => Self::Bool(false),
            _ => Self::Text(String::new()),
        }
    }

    /// Parse raw user input (e.g. a command-line `key=value`) for `def`.
    pub fn parse_for(def: &FieldDef, raw: &str) -> Result<Self, CoreError> {
        match def.kind {
            FieldKind::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "oui" | "1" | "on" => Ok(Self::Bool(true)),
                "false" | "no" | "non" | "0" | "off" | "" => Ok(Self::Bool(false)),
                other => Err(CoreError::InvalidValue(format!(
                    "'{other}' is not a boolean for {}",
                    def.name
                ))),
            },
            _ => Ok(Self::Text(raw.to_string())),
        }
    }

    fn seeded(def: &FieldDef, value: Option<&Value>) -> Self {
        match def.kind {
            FieldKind::Boolean => Self::Bool(match value {
                Some(Value::Bool(b)) => *b,
                Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
                Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "yes" | "oui"),
                _ => false,
            }),
            _ => Self::Text(match value {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }),
        }
    }
}

/// Flat map from field name to value.
pub type FormValues = BTreeMap<String, FieldValue>;

/// What the open session will do on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Closed,
    Open,
    Submitting,
}

/// Why [`FormSession::begin_submit`] refused to start a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    NotOpen,
    /// A submission from this session is already outstanding.
    InFlight,
    /// Local validation failed; the errors are also stored on the session.
    Invalid(FieldErrors),
}

/// Work handed to the controller once a submission starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Session generation; results for an older generation are stale.
    pub generation: u64,
    pub mode: FormMode,
    /// JSON body for create/update. `None` for delete.
    pub payload: Option<Record>,
}

/// Snapshot-able state of one create/edit/delete form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    status: FormStatus,
    mode: Option<FormMode>,
    values: FormValues,
    original: Option<Record>,
    field_errors: FieldErrors,
    submit_error: Option<String>,
    generation: u64,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            status: FormStatus::Closed,
            mode: None,
            values: FormValues::new(),
            original: None,
            field_errors: FieldErrors::new(),
            submit_error: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn mode(&self) -> Option<&FormMode> {
        self.mode.as_ref()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.status != FormStatus::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Open a blank create form.
    pub fn open_create(&mut self, schema: &EntitySchema) {
        let values = schema
            .fields
            .iter()
            .map(|def| (def.name.to_string(), FieldValue::blank(def)))
            .collect();
        self.reset(FormMode::Create, values, None);
    }

    /// Open an edit form seeded from `record`.
    pub fn open_edit(&mut self, schema: &EntitySchema, id: &str, record: &Record) {
        let values = schema
            .fields
            .iter()
            .map(|def| (def.name.to_string(), FieldValue::seeded(def, record.get(def.name))))
            .collect();
        self.reset(
            FormMode::Edit { id: id.to_string() },
            values,
            Some(record.clone()),
        );
    }

    /// Open a delete confirmation for `id`.
    pub fn open_delete(&mut self, id: &str, record: &Record) {
        self.reset(
            FormMode::Delete { id: id.to_string() },
            FormValues::new(),
            Some(record.clone()),
        );
    }

    fn reset(&mut self, mode: FormMode, values: FormValues, original: Option<Record>) {
        self.generation += 1;
        self.status = FormStatus::Open;
        self.mode = Some(mode);
        self.values = values;
        self.original = original;
        self.field_errors.clear();
        self.submit_error = None;
    }

    /// Close the session. Ignored while a submission is outstanding;
    /// returns whether the session is now closed.
    pub fn close(&mut self) -> bool {
        if self.status == FormStatus::Submitting {
            return false;
        }
        self.status = FormStatus::Closed;
        self.mode = None;
        self.values.clear();
        self.original = None;
        self.field_errors.clear();
        self.submit_error = None;
        true
    }

    /// Set one field and clear its error.
    pub fn set_field(
        &mut self,
        schema: &EntitySchema,
        name: &str,
        value: FieldValue,
    ) -> Result<(), CoreError> {
        if self.status != FormStatus::Open {
            return Err(CoreError::FormNotOpen);
        }
        let def = schema.require_field(name)?;
        match &self.mode {
            Some(FormMode::Delete { .. }) => {
                return Err(CoreError::FieldNotEditable(name.to_string()));
            }
            // The record stays keyed by its original identifier.
            Some(FormMode::Edit { .. }) if name == schema.key_field => {
                return Err(CoreError::FieldNotEditable(name.to_string()));
            }
            _ => {}
        }
        match (def.kind, &value) {
            (FieldKind::Boolean, FieldValue::Bool(_)) => {}
            (FieldKind::Boolean, FieldValue::Text(_)) | (_, FieldValue::Bool(_)) => {
                return Err(CoreError::InvalidValue(format!(
                    "wrong value type for field {name}"
                )));
            }
            _ => {}
        }
        self.values.insert(name.to_string(), value);
        self.field_errors.remove(name);
        Ok(())
    }

    /// Run local validation and store the result on the session.
    pub fn validate(&mut self, schema: &EntitySchema) -> &FieldErrors {
        self.field_errors = match self.mode {
            Some(FormMode::Delete { .. }) | None => FieldErrors::new(),
            _ => validation::validate(schema, &self.values),
        };
        &self.field_errors
    }

    /// Validate and enter `Submitting`.
    ///
    /// Clears the previous submission error. On success the in-flight flag
    /// is set until [`FormSession::succeed`] or a failure transition.
    pub fn begin_submit(&mut self, schema: &EntitySchema) -> Result<Submission, SubmitBlocked> {
        match self.status {
            FormStatus::Closed => return Err(SubmitBlocked::NotOpen),
            FormStatus::Submitting => return Err(SubmitBlocked::InFlight),
            FormStatus::Open => {}
        }
        let mode = self.mode.clone().ok_or(SubmitBlocked::NotOpen)?;

        let errors = self.validate(schema);
        if !errors.is_empty() {
            return Err(SubmitBlocked::Invalid(errors.clone()));
        }

        let payload = match mode {
            FormMode::Delete { .. } => None,
            _ => Some(self.payload(schema)),
        };

        self.status = FormStatus::Submitting;
        self.submit_error = None;

        Ok(Submission {
            generation: self.generation,
            mode,
            payload,
        })
    }

    /// Submission accepted by the backend: close the session.
    ///
    /// Returns `false` when `generation` is stale and nothing changed.
    pub fn succeed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != FormStatus::Submitting {
            return false;
        }
        self.status = FormStatus::Open;
        self.close()
    }

    /// Submission rejected: reopen with a form-level error message.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation || self.status != FormStatus::Submitting {
            return false;
        }
        self.status = FormStatus::Open;
        self.submit_error = Some(message.into());
        true
    }

    /// Submission blocked on one field (e.g. identifier taken): reopen with
    /// a field error instead of a form-level message.
    pub fn fail_field(&mut self, generation: u64, field: &str, message: impl Into<String>) -> bool {
        if generation != self.generation || self.status != FormStatus::Submitting {
            return false;
        }
        self.status = FormStatus::Open;
        self.field_errors.insert(field.to_string(), message.into());
        true
    }

    /// Attach an error to one field of an open form without submitting.
    pub fn set_field_error(&mut self, field: &str, message: impl Into<String>) {
        if self.status == FormStatus::Open {
            self.field_errors.insert(field.to_string(), message.into());
        }
    }

    /// JSON body for the current values.
    ///
    /// Text, date and enum values are strings, numbers become JSON numbers,
    /// booleans stay booleans, and blank optional non-text fields are
    /// `null`. In edit mode the original identifier is always included.
    pub fn payload(&self, schema: &EntitySchema) -> Record {
        let mut body = Record::new();
        for def in schema.fields {
            let value = self
                .values
                .get(def.name)
                .cloned()
                .unwrap_or_else(|| FieldValue::blank(def));
            body.insert(def.name.to_string(), to_json(def, value));
        }

        if let (Some(FormMode::Edit { id }), Some(original)) = (&self.mode, &self.original) {
            let key = original
                .get(schema.key_field)
                .cloned()
                .unwrap_or_else(|| Value::String(id.clone()));
            body.insert(schema.key_field.to_string(), key);
        }
        body
    }
}

fn to_json(def: &FieldDef, value: FieldValue) -> Value {
    match value {
        FieldValue::Bool(b) => Value::Bool(b),
        FieldValue::Text(text) if def.kind == FieldKind::Text => Value::String(text),
        FieldValue::Text(text) => {
            let trimmed = text.trim();
            match def.kind {
                _ if trimmed.is_empty() => Value::Null,
                FieldKind::Number => number_value(trimmed),
                _ => Value::String(trimmed.to_string()),
            }
        }
    }
}

fn number_value(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
