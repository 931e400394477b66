//! Entity schemas.
//!
//! A schema describes one backend collection: where it lives, which field
//! identifies a record, which fields are searched, and the ordered list of
//! form fields with their kinds and constraints. The generic controller and
//! form session operate against a schema instead of hardcoded field names.

use crate::error::CoreError;

/// Value kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Decimal number, submitted as a JSON number.
    Number,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    Boolean,
    /// One of a fixed set of values.
    Enum(&'static [&'static str]),
}

/// Format constraint applied to a non-blank text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValidator {
    Email,
    Url,
    Phone,
    /// Anchored regular expression the whole value must match.
    Pattern(&'static str),
}

/// One form field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub validator: Option<FieldValidator>,
}

impl FieldDef {
    /// Required text field without format constraint.
    pub const fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: true,
            validator: None,
        }
    }

    /// Optional text field without format constraint.
    pub const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            validator: None,
        }
    }

    pub const fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Who assigns a record's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The backend assigns the identifier on create.
    Backend,
    /// The user types the identifier; it gets an availability pre-check.
    User,
}

/// Description of one backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Human-readable entity name.
    pub name: &'static str,
    /// Endpoint path segment, e.g. `PorteGreffe` for `GET /PorteGreffe`.
    pub collection: &'static str,
    /// Alternative names accepted by [`crate::catalog::find`].
    pub aliases: &'static [&'static str],
    pub key_field: &'static str,
    pub key_source: KeySource,
    /// Label fields matched by the client-side filter.
    pub search_fields: &'static [&'static str],
    pub fields: &'static [FieldDef],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Like [`EntitySchema::field`] but reports unknown names as an error.
    pub fn require_field(&self, name: &str) -> Result<&FieldDef, CoreError> {
        self.field(name).ok_or_else(|| CoreError::UnknownField {
            entity: self.name,
            field: name.to_string(),
        })
    }

    pub fn key_def(&self) -> Option<&FieldDef> {
        self.field(self.key_field)
    }

    pub fn has_user_key(&self) -> bool {
        self.key_source == KeySource::User
    }
}
