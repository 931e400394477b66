//! Generic List-CRUD controller.
//!
//! [`ListController`] owns the lifecycle of one collection view: it loads
//! the collection, derives the filtered and paginated view, drives the
//! create/edit/delete form session and applies successful mutations to its
//! in-memory list. It is parameterised by an [`EntitySchema`] and talks to
//! the backend only through [`CollectionBackend`].
//!
//! The handle is cheap to clone; all clones share one state. Locks are
//! never held across a network call. Every request races the controller's
//! [`CancellationToken`], so after [`ListController::teardown`] a late
//! response is dropped instead of being applied.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use verger_client::{ApiError, CollectionBackend};
use verger_core::filter::filter_records;
use verger_core::form::{FieldValue, FormMode, FormSession, FormValues, SubmitBlocked};
use verger_core::pagination::Pagination;
use verger_core::record::{find_index, normalize_list, record_key, Record};
use verger_core::schema::EntitySchema;
use verger_core::view::ListView;

use crate::error::{ControllerError, ControllerResult, LoadError};

/// Result of the identifier-availability pre-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
}

/// What a successful submission did to the list.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Record),
    Updated(Record),
    Deleted(String),
}

/// Behaviour switches for one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Reload the whole collection after every successful mutation, for
    /// backends whose responses cannot be trusted to echo the record.
    pub refetch_after_mutation: bool,
}

/// Handle that tears a controller down from elsewhere (navigation,
/// unmount) without holding the controller itself.
#[derive(Debug, Clone)]
pub struct TeardownHandle(CancellationToken);

impl TeardownHandle {
    pub fn teardown(&self) {
        self.0.cancel();
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    records: Vec<Record>,
    filter: String,
    pagination: Pagination,
    form: FormSession,
    load_error: Option<LoadError>,
    loading: bool,
}

impl ControllerState {
    fn matched(&self, schema: &EntitySchema) -> usize {
        filter_records(schema, &self.records, &self.filter).len()
    }
}

#[derive(Clone)]
pub struct ListController {
    schema: EntitySchema,
    backend: Arc<dyn CollectionBackend>,
    state: Arc<RwLock<ControllerState>>,
    options: ControllerOptions,
    cancel: CancellationToken,
}

impl ListController {
    pub fn new(schema: EntitySchema, backend: Arc<dyn CollectionBackend>) -> Self {
        Self::with_options(schema, backend, ControllerOptions::default())
    }

    pub fn with_options(
        schema: EntitySchema,
        backend: Arc<dyn CollectionBackend>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            schema,
            backend,
            state: Arc::new(RwLock::new(ControllerState::default())),
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    // ---- lifecycle ----

    /// Cancel outstanding requests and refuse further commands.
    pub fn teardown(&self) {
        tracing::debug!(collection = self.schema.collection, "Controller torn down");
        self.cancel.cancel();
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle(self.cancel.clone())
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ---- queries ----

    pub async fn records(&self) -> Vec<Record> {
        self.state.read().await.records.clone()
    }

    /// Current page of the filtered list, with its empty-state.
    pub async fn view(&self) -> ListView {
        let state = self.state.read().await;
        ListView::build(&self.schema, &state.records, &state.filter, &state.pagination)
    }

    /// Records matching `term`, without touching the stored filter.
    pub async fn filter(&self, term: &str) -> Vec<Record> {
        let state = self.state.read().await;
        filter_records(&self.schema, &state.records, term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn filter_term(&self) -> String {
        self.state.read().await.filter.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }

    pub async fn load_error(&self) -> Option<LoadError> {
        self.state.read().await.load_error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Snapshot of the form session.
    pub async fn form(&self) -> FormSession {
        self.state.read().await.form.clone()
    }

    // ---- list commands ----

    /// Fetch the whole collection and replace the in-memory list.
    ///
    /// On failure the previous list is kept and the error is recorded as
    /// the page-level load error. Retrying is calling `load` again.
    pub async fn load(&self) -> ControllerResult<usize> {
        self.ensure_live()?;
        self.state.write().await.loading = true;

        let result = match self.guarded(self.backend.list(self.schema.collection)).await {
            Ok(result) => result,
            Err(cancelled) => {
                self.state.write().await.loading = false;
                return Err(cancelled);
            }
        };

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(body) => {
                state.records = normalize_list(body);
                state.load_error = None;
                let matched = state.matched(&self.schema);
                state.pagination.clamp(matched);
                let count = state.records.len();
                tracing::info!(collection = self.schema.collection, count, "Collection loaded");
                Ok(count)
            }
            Err(e) => {
                let error = LoadError {
                    message: e.user_message(),
                    status: e.status(),
                };
                tracing::warn!(
                    collection = self.schema.collection,
                    error = %e,
                    kept = state.records.len(),
                    "Collection load failed",
                );
                state.load_error = Some(error.clone());
                Err(ControllerError::Load(error))
            }
        }
    }

    /// Store a new search term and go back to page 1.
    pub async fn set_filter(&self, term: &str) -> ControllerResult<()> {
        self.ensure_live()?;
        let mut state = self.state.write().await;
        state.filter = term.to_string();
        state.pagination.reset();
        Ok(())
    }

    /// Move to `page`, clamped to the filtered page range.
    pub async fn set_page(&self, page: usize) -> ControllerResult<usize> {
        self.ensure_live()?;
        let mut state = self.state.write().await;
        let matched = state.matched(&self.schema);
        state.pagination.set_page(page, matched);
        Ok(state.pagination.page())
    }

    /// Change the page size (one of the allowed options) and reset to page 1.
    pub async fn set_page_size(&self, page_size: usize) -> ControllerResult<()> {
        self.ensure_live()?;
        self.state.write().await.pagination.set_page_size(page_size)?;
        Ok(())
    }

    // ---- form commands ----

    pub async fn open_create(&self) -> ControllerResult<()> {
        self.ensure_live()?;
        self.state.write().await.form.open_create(&self.schema);
        Ok(())
    }

    pub async fn open_edit(&self, id: &str) -> ControllerResult<()> {
        self.ensure_live()?;
        let mut state = self.state.write().await;
        let record = self.find(&state, id)?;
        state.form.open_edit(&self.schema, id, &record);
        Ok(())
    }

    pub async fn open_delete(&self, id: &str) -> ControllerResult<()> {
        self.ensure_live()?;
        let mut state = self.state.write().await;
        let record = self.find(&state, id)?;
        state.form.open_delete(id, &record);
        Ok(())
    }

    pub async fn set_field(&self, name: &str, value: FieldValue) -> ControllerResult<()> {
        self.ensure_live()?;
        self.state
            .write()
            .await
            .form
            .set_field(&self.schema, name, value)?;
        Ok(())
    }

    /// Parse raw text for `name` according to its kind, then set it.
    pub async fn set_field_raw(&self, name: &str, raw: &str) -> ControllerResult<()> {
        let def = self.schema.require_field(name)?;
        let value = FieldValue::parse_for(def, raw)?;
        self.set_field(name, value).await
    }

    /// Close the form. Ignored while a submission is outstanding.
    pub async fn close_form(&self) -> bool {
        let closed = self.state.write().await.form.close();
        if !closed {
            tracing::debug!(collection = self.schema.collection, "Close ignored while submitting");
        }
        closed
    }

    /// Validate and submit the open form.
    ///
    /// Creates on user-keyed entities first run the identifier pre-check.
    /// On success the list is updated and the form closes; on failure the
    /// form stays open with the error and the list is untouched.
    pub async fn submit(&self) -> ControllerResult<SubmitOutcome> {
        self.ensure_live()?;

        let submission = {
            let mut state = self.state.write().await;
            if let Some(candidate) = self.local_duplicate(&state) {
                let message = self.taken_message(&candidate);
                state.form.set_field_error(self.schema.key_field, message);
                return Err(ControllerError::IdentifierTaken(candidate));
            }
            match state.form.begin_submit(&self.schema) {
                Ok(submission) => submission,
                Err(SubmitBlocked::NotOpen) => return Err(ControllerError::NoForm),
                Err(SubmitBlocked::InFlight) => return Err(ControllerError::InFlight),
                Err(SubmitBlocked::Invalid(errors)) => {
                    tracing::debug!(
                        collection = self.schema.collection,
                        fields = errors.len(),
                        "Submission blocked by validation",
                    );
                    return Err(ControllerError::Validation(errors));
                }
            }
        };
        let generation = submission.generation;
        let payload = submission.payload.unwrap_or_default();

        if submission.mode == FormMode::Create && self.schema.has_user_key() {
            let candidate = payload
                .get(self.schema.key_field)
                .map(|v| match v {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .unwrap_or_default();

            match self.availability(&candidate).await {
                Ok(Availability::Available) => {}
                Ok(Availability::Taken) => {
                    let message = self.taken_message(&candidate);
                    self.state
                        .write()
                        .await
                        .form
                        .fail_field(generation, self.schema.key_field, message);
                    return Err(ControllerError::IdentifierTaken(candidate));
                }
                Err(e) => return Err(e),
            }
        }

        let body = Value::Object(payload.clone());
        let echo = match &submission.mode {
            FormMode::Create => {
                self.guarded(self.backend.create(self.schema.collection, &body))
                    .await?
            }
            FormMode::Edit { id } => {
                self.guarded(self.backend.update(self.schema.collection, id, &body))
                    .await?
            }
            FormMode::Delete { id } => self
                .guarded(self.backend.delete(self.schema.collection, id))
                .await?
                .map(|()| None),
        };

        let outcome = {
            let mut state = self.state.write().await;
            match echo {
                Ok(echo) => {
                    let outcome = self.apply(&mut state, &submission.mode, echo, payload);
                    state.form.succeed(generation);
                    outcome
                }
                Err(e) => {
                    let message = e.user_message();
                    tracing::warn!(
                        collection = self.schema.collection,
                        error = %e,
                        "Submission failed",
                    );
                    state.form.fail(generation, message.clone());
                    return Err(ControllerError::Submission {
                        message,
                        status: e.status(),
                    });
                }
            }
        };

        if self.options.refetch_after_mutation {
            // A failed refresh is recorded as the page-level load error.
            if let Err(e) = self.load().await {
                tracing::debug!(error = %e, "Refresh after mutation failed");
            }
        }
        Ok(outcome)
    }

    /// Open a create form with `input` and submit it.
    pub async fn create(&self, input: FormValues) -> ControllerResult<SubmitOutcome> {
        self.open_create().await?;
        for (name, value) in input {
            self.set_field(&name, value).await?;
        }
        self.submit().await
    }

    /// Open an edit form for `id`, apply `input` and submit it.
    ///
    /// The identifier field may be repeated in `input` unchanged.
    pub async fn update(&self, id: &str, input: FormValues) -> ControllerResult<SubmitOutcome> {
        self.open_edit(id).await?;
        for (name, value) in input {
            if name == self.schema.key_field && value == FieldValue::Text(id.to_string()) {
                continue;
            }
            self.set_field(&name, value).await?;
        }
        self.submit().await
    }

    /// Open a delete confirmation for `id` and confirm it.
    pub async fn delete(&self, id: &str) -> ControllerResult<SubmitOutcome> {
        self.open_delete(id).await?;
        self.submit().await
    }

    /// Advisory check that a user-supplied identifier is free.
    ///
    /// The in-memory list is scanned first; otherwise the backend is asked
    /// for the record. Not-found means available, any success means taken,
    /// and any other failure is logged and treated as available.
    pub async fn check_identifier_available(
        &self,
        candidate: &str,
    ) -> ControllerResult<Availability> {
        self.ensure_live()?;
        self.availability(candidate.trim()).await
    }

    // ---- private helpers ----

    fn ensure_live(&self) -> ControllerResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }
        Ok(())
    }

    /// Race a backend call against teardown.
    ///
    /// The outer error is [`ControllerError::Cancelled`]; the inner result
    /// is the backend's own outcome.
    async fn guarded<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> ControllerResult<Result<T, ApiError>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(collection = self.schema.collection, "Request cancelled");
                Err(ControllerError::Cancelled)
            }
            result = request => {
                if self.cancel.is_cancelled() {
                    return Err(ControllerError::Cancelled);
                }
                Ok(result)
            }
        }
    }

    fn find(&self, state: &ControllerState, id: &str) -> ControllerResult<Record> {
        find_index(&self.schema, &state.records, id)
            .map(|i| state.records[i].clone())
            .ok_or_else(|| ControllerError::NotFound {
                entity: self.schema.name,
                id: id.to_string(),
            })
    }

    /// Identifier typed into an open create form that is already in the
    /// local list.
    fn local_duplicate(&self, state: &ControllerState) -> Option<String> {
        let form = &state.form;
        if !self.schema.has_user_key()
            || form.is_submitting()
            || form.mode() != Some(&FormMode::Create)
        {
            return None;
        }
        let candidate = match form.value(self.schema.key_field)? {
            FieldValue::Text(text) => text.trim(),
            FieldValue::Bool(_) => return None,
        };
        if candidate.is_empty() {
            return None;
        }
        find_index(&self.schema, &state.records, candidate).map(|_| candidate.to_string())
    }

    fn taken_message(&self, candidate: &str) -> String {
        let label = self.schema.key_def().map_or(self.schema.key_field, |d| d.label);
        format!("{label} '{candidate}' is already in use")
    }

    async fn availability(&self, candidate: &str) -> ControllerResult<Availability> {
        if candidate.is_empty() || !self.schema.has_user_key() {
            return Ok(Availability::Available);
        }

        {
            let state = self.state.read().await;
            if find_index(&self.schema, &state.records, candidate).is_some() {
                return Ok(Availability::Taken);
            }
        }

        match self
            .guarded(self.backend.fetch(self.schema.collection, candidate))
            .await?
        {
            Ok(_) => Ok(Availability::Taken),
            Err(e) if e.is_not_found() => Ok(Availability::Available),
            Err(e) => {
                tracing::warn!(
                    collection = self.schema.collection,
                    candidate,
                    error = %e,
                    "Identifier check inconclusive; allowing submission",
                );
                Ok(Availability::Available)
            }
        }
    }

    /// Apply an accepted submission to the list and describe it.
    ///
    /// An echo counts as the stored record only when it carries the key
    /// field. Otherwise a create keeps the submitted payload and an update
    /// merges the payload over the record it edited, so fields outside the
    /// schema survive.
    fn apply(
        &self,
        state: &mut ControllerState,
        mode: &FormMode,
        echo: Option<Value>,
        payload: Record,
    ) -> SubmitOutcome {
        let echoed = echo.and_then(|echo| self.echoed_record(echo));
        let outcome = match mode {
            FormMode::Create => {
                let record = echoed.unwrap_or(payload);
                state.records.push(record.clone());
                SubmitOutcome::Created(record)
            }
            FormMode::Edit { id } => match find_index(&self.schema, &state.records, id) {
                Some(i) => {
                    let record =
                        echoed.unwrap_or_else(|| merged(&state.records[i], payload));
                    state.records[i] = record.clone();
                    SubmitOutcome::Updated(record)
                }
                None => {
                    tracing::debug!(
                        collection = self.schema.collection,
                        id = %id,
                        "Updated record no longer in list",
                    );
                    SubmitOutcome::Updated(echoed.unwrap_or(payload))
                }
            },
            FormMode::Delete { id } => {
                state
                    .records
                    .retain(|r| record_key(&self.schema, r).as_deref() != Some(id.as_str()));
                SubmitOutcome::Deleted(id.clone())
            }
        };
        let matched = state.matched(&self.schema);
        state.pagination.clamp(matched);
        tracing::info!(
            collection = self.schema.collection,
            count = state.records.len(),
            "Collection updated",
        );
        outcome
    }

    /// The echo as a record, if it is an object carrying the key field.
    fn echoed_record(&self, echo: Value) -> Option<Record> {
        match echo {
            Value::Object(record) if record_key(&self.schema, &record).is_some() => Some(record),
            Value::Object(_) => {
                tracing::debug!(
                    collection = self.schema.collection,
                    "Response is not a record; keeping submitted values",
                );
                None
            }
            _ => None,
        }
    }
}

/// `base` with every field of `changes` written over it.
fn merged(base: &Record, changes: Record) -> Record {
    let mut record = base.clone();
    record.extend(changes);
    record
}
