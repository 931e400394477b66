//! Built-in entity schemas of the orchard administration domain.

use crate::error::CoreError;
use crate::schema::{EntitySchema, FieldDef, FieldKind, FieldValidator, KeySource};

pub const ROOTSTOCK: EntitySchema = EntitySchema {
    name: "Rootstock",
    collection: "PorteGreffe",
    aliases: &["rootstock", "rootstocks", "porte-greffe", "porte-greffes"],
    key_field: "code",
    key_source: KeySource::User,
    search_fields: &["code", "libelle"],
    fields: &[
        FieldDef::required("code", "Code"),
        FieldDef::required("libelle", "Label"),
    ],
};

pub const PROTOCOL: EntitySchema = EntitySchema {
    name: "Protocol",
    collection: "Protocole",
    aliases: &["protocol", "protocols", "protocoles"],
    key_field: "code",
    key_source: KeySource::User,
    search_fields: &["code", "libelle"],
    fields: &[
        FieldDef::required("code", "Code"),
        FieldDef::required("libelle", "Label"),
        FieldDef::optional("description", "Description"),
        FieldDef::optional("date_debut", "Start date").with_kind(FieldKind::Date),
    ],
};

pub const PRODUCER_TYPE: EntitySchema = EntitySchema {
    name: "Producer type",
    collection: "TypeProducteur",
    aliases: &["producer-type", "producer-types", "type-producteur"],
    key_field: "id",
    key_source: KeySource::Backend,
    search_fields: &["libelle"],
    fields: &[
        FieldDef::required("libelle", "Label"),
        FieldDef::optional("description", "Description"),
    ],
};

pub const PLOT: EntitySchema = EntitySchema {
    name: "Plot",
    collection: "Parcelle",
    aliases: &["plot", "plots", "parcelles"],
    key_field: "id",
    key_source: KeySource::Backend,
    search_fields: &["reference", "libelle"],
    fields: &[
        FieldDef::required("reference", "Reference"),
        FieldDef::required("libelle", "Label"),
        FieldDef::required("superficie", "Area (ha)").with_kind(FieldKind::Number),
        FieldDef::optional("verger", "Orchard code"),
        FieldDef::optional("date_plantation", "Planting date").with_kind(FieldKind::Date),
    ],
};

pub const ORCHARD: EntitySchema = EntitySchema {
    name: "Orchard",
    collection: "Verger",
    aliases: &["orchard", "orchards", "vergers"],
    key_field: "code",
    key_source: KeySource::User,
    search_fields: &["code", "nom", "localisation"],
    fields: &[
        FieldDef::required("code", "Code"),
        FieldDef::required("nom", "Name"),
        FieldDef::optional("localisation", "Location"),
        FieldDef::optional("superficie", "Area (ha)").with_kind(FieldKind::Number),
        FieldDef::optional("actif", "Active").with_kind(FieldKind::Boolean),
    ],
};

pub const PRODUCER: EntitySchema = EntitySchema {
    name: "Producer",
    collection: "Producteur",
    aliases: &["producer", "producers", "producteurs"],
    key_field: "id",
    key_source: KeySource::Backend,
    search_fields: &["nom", "prenom", "email"],
    fields: &[
        FieldDef::required("nom", "Last name"),
        FieldDef::optional("prenom", "First name"),
        FieldDef::required("type", "Type").with_kind(FieldKind::Enum(&[
            "Individuel",
            "Cooperative",
            "Entreprise",
        ])),
        FieldDef::optional("email", "Email").with_validator(FieldValidator::Email),
        FieldDef::optional("telephone", "Phone").with_validator(FieldValidator::Phone),
        FieldDef::optional("adresse", "Address"),
        FieldDef::optional("actif", "Active").with_kind(FieldKind::Boolean),
    ],
};

pub const CERTIFICATION_BODY: EntitySchema = EntitySchema {
    name: "Certification body",
    collection: "OrganismeCertification",
    aliases: &[
        "certification-body",
        "certification-bodies",
        "organization",
        "organisme",
    ],
    key_field: "code",
    key_source: KeySource::User,
    search_fields: &["code", "nom"],
    fields: &[
        FieldDef::required("code", "Code")
            .with_validator(FieldValidator::Pattern(r"^[A-Z0-9_-]{2,20}$")),
        FieldDef::required("nom", "Name"),
        FieldDef::optional("email", "Email").with_validator(FieldValidator::Email),
        FieldDef::optional("site_web", "Website").with_validator(FieldValidator::Url),
        FieldDef::optional("telephone", "Phone").with_validator(FieldValidator::Phone),
        FieldDef::optional("adresse", "Address"),
        FieldDef::optional("actif", "Active").with_kind(FieldKind::Boolean),
    ],
};

/// Every built-in schema, in menu order.
pub fn all() -> &'static [EntitySchema] {
    const ALL: &[EntitySchema] = &[
        PRODUCER,
        PRODUCER_TYPE,
        ORCHARD,
        PLOT,
        ROOTSTOCK,
        PROTOCOL,
        CERTIFICATION_BODY,
    ];
    ALL
}

/// Resolve a schema by collection name or alias, case-insensitively.
pub fn find(name: &str) -> Result<&'static EntitySchema, CoreError> {
    let wanted = name.trim().to_lowercase();
    all()
        .iter()
        .find(|s| {
            s.collection.to_lowercase() == wanted || s.aliases.iter().any(|a| *a == wanted)
        })
        .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))
}
