//! Console commands, run against any [`CollectionBackend`].
//!
//! Each command drives a fresh [`ListController`] the way a page would:
//! load, act through the form session, then tear down. Commands return
//! their output as a string so `main` only has to print it.

use std::sync::Arc;

use serde_json::{json, Value};
use verger_client::{CollectionBackend, RestClient};
use verger_controller::{Availability, ListController, SubmitOutcome};
use verger_core::catalog;
use verger_core::record::display_value;
use verger_core::schema::{EntitySchema, KeySource};

use crate::cli::Command;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

/// Build the HTTP backend described by `config`.
pub fn connect(config: &ConsoleConfig) -> Result<Arc<dyn CollectionBackend>, ConsoleError> {
    Ok(Arc::new(RestClient::new(&config.client)?))
}

pub async fn execute(
    command: &Command,
    config: &ConsoleConfig,
    backend: Arc<dyn CollectionBackend>,
    output: Output,
) -> Result<String, ConsoleError> {
    match command {
        Command::Entities => entities(output),
        Command::List {
            entity,
            search,
            page,
            page_size,
            width,
        } => {
            let schema = catalog::find(entity)?;
            let controller = ListController::new(*schema, backend);
            controller
                .set_page_size(page_size.unwrap_or(config.page_size))
                .await?;
            controller.load().await?;
            if let Some(term) = search {
                controller.set_filter(term).await?;
            }
            controller.set_page(*page).await?;
            let view = controller.view().await;
            controller.teardown();

            match output {
                Output::Text => Ok(render::render_list(schema, &view, *width)),
                Output::Json => json_line(&view),
            }
        }
        Command::Create { entity, fields } => {
            let schema = catalog::find(entity)?;
            let controller = loaded(schema, backend).await?;
            controller.open_create().await?;
            for (name, raw) in fields {
                controller.set_field_raw(name, raw).await?;
            }
            let outcome = controller.submit().await?;
            controller.teardown();
            describe(schema, &outcome, output)
        }
        Command::Update { entity, id, fields } => {
            let schema = catalog::find(entity)?;
            let controller = loaded(schema, backend).await?;
            controller.open_edit(id).await?;
            for (name, raw) in fields {
                // Restating the identifier is allowed; changing it is not.
                if name == schema.key_field && raw.trim() == id {
                    continue;
                }
                controller.set_field_raw(name, raw).await?;
            }
            let outcome = controller.submit().await?;
            controller.teardown();
            describe(schema, &outcome, output)
        }
        Command::Delete { entity, id } => {
            let schema = catalog::find(entity)?;
            let controller = loaded(schema, backend).await?;
            let outcome = controller.delete(id).await?;
            controller.teardown();
            describe(schema, &outcome, output)
        }
        Command::Check { entity, candidate } => {
            let schema = catalog::find(entity)?;
            if schema.key_source == KeySource::Backend {
                return Ok(format!(
                    "{} identifiers are assigned by the backend\n",
                    schema.name
                ));
            }
            let controller = ListController::new(*schema, backend);
            let availability = controller.check_identifier_available(candidate).await?;
            controller.teardown();

            match (output, availability) {
                (Output::Json, _) => json_line(&json!({
                    "candidate": candidate.trim(),
                    "available": availability == Availability::Available,
                })),
                (Output::Text, Availability::Available) => {
                    Ok(format!("{} '{}' is available\n", schema.name, candidate.trim()))
                }
                (Output::Text, Availability::Taken) => {
                    Ok(format!("{} '{}' is already in use\n", schema.name, candidate.trim()))
                }
            }
        }
    }
}

// ---- private helpers ----

/// A controller whose list is loaded, so local duplicate checks and
/// record lookups see the current collection.
async fn loaded(
    schema: &EntitySchema,
    backend: Arc<dyn CollectionBackend>,
) -> Result<ListController, ConsoleError> {
    let controller = ListController::new(*schema, backend);
    controller.load().await?;
    Ok(controller)
}

fn entities(output: Output) -> Result<String, ConsoleError> {
    let schemas = catalog::all();
    if output == Output::Json {
        let list: Vec<Value> = schemas
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "collection": s.collection,
                    "aliases": s.aliases,
                    "key_field": s.key_field,
                    "user_key": s.has_user_key(),
                })
            })
            .collect();
        return json_line(&list);
    }

    let mut out = String::new();
    for s in schemas {
        let source = match s.key_source {
            KeySource::User => "user",
            KeySource::Backend => "backend",
        };
        out.push_str(&format!(
            "{:<20} {:<24} key: {} ({source})\n",
            s.name, s.collection, s.key_field
        ));
    }
    Ok(out)
}

fn describe(
    schema: &EntitySchema,
    outcome: &SubmitOutcome,
    output: Output,
) -> Result<String, ConsoleError> {
    match (output, outcome) {
        (Output::Json, SubmitOutcome::Created(record) | SubmitOutcome::Updated(record)) => {
            json_line(record)
        }
        (Output::Json, SubmitOutcome::Deleted(id)) => json_line(&json!({ "deleted": id })),
        (Output::Text, SubmitOutcome::Created(record)) => Ok(format!(
            "Created {} {}\n{}",
            schema.name,
            display_value(record.get(schema.key_field)),
            render::render_record(schema, record)
        )),
        (Output::Text, SubmitOutcome::Updated(record)) => Ok(format!(
            "Updated {} {}\n{}",
            schema.name,
            display_value(record.get(schema.key_field)),
            render::render_record(schema, record)
        )),
        (Output::Text, SubmitOutcome::Deleted(id)) => {
            Ok(format!("Deleted {} '{id}'\n", schema.name))
        }
    }
}

fn json_line(value: &impl serde::Serialize) -> Result<String, ConsoleError> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}
