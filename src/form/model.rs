//! The form aggregate: one editable tree, its error map and touched set, plus
//! the read-only snapshot of records already in the remote collection.
//!
//! All edits go through [`FormModel`] on a single logical thread. The only
//! suspending work is the two gateway calls; hosts that await them may use
//! the split `begin_*`/`apply_*`/`finish_*` operations, everything else can
//! call [`FormModel::refresh`] and [`FormModel::submit`] directly.

use serde_json::Value as Json;
use tracing::{debug, info, warn};

use crate::errors::{PathError, SyncError};
use crate::form::interaction::InteractionTracker;
use crate::form::path::{FieldPath, PathResolver};
use crate::form::record::Record;
use crate::form::schema::Schema;
use crate::form::validation::{ErrorMap, ValidationEngine};
use crate::form::value::Value;
use crate::gateway::{Credential, SyncGateway};

/// Lifecycle of the form. `Submitting` only lasts while an append is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
}

/// What to do with the tree once a submission succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Replace the tree with a fresh one; otherwise keep the entered values.
    pub reset_on_success: bool,
}

/// Sequence number handed out for each snapshot fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Result of applying a fetch to the existing-records snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot replaced with this many records.
    Applied(usize),
    /// Fetch failed; snapshot is now empty.
    Degraded(String),
    /// A newer fetch was issued; this response was discarded.
    Stale,
}

/// Successful submission details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Whether the tree was reset after the append.
    pub cleared: bool,
    /// Snapshot reload triggered by the submission, when the model ran it.
    pub refresh: Option<RefreshOutcome>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was sent; every violating path is now touched.
    ValidationFailed(ErrorMap),
    /// The remote collection refused or could not be reached; the tree is unchanged.
    SubmissionFailed(SyncError),
    Submitted(SubmitReceipt),
    /// Another submission is still awaiting its append.
    InFlight,
}

/// An append that has been validated and is awaiting the gateway.
#[derive(Debug)]
pub struct PendingSubmission {
    payload: Json,
}

impl PendingSubmission {
    /// Record-shaped JSON to hand to [`SyncGateway::append`].
    pub fn payload(&self) -> &Json {
        &self.payload
    }
}

#[derive(Debug)]
pub struct FormModel {
    schema: Schema,
    engine: ValidationEngine,
    tree: Record,
    errors: ErrorMap,
    tracker: InteractionTracker,
    state: FormState,
    existing: Vec<Record>,
    issued_refresh: u64,
    applied_refresh: u64,
    last_failure: Option<String>,
    credential: Option<Credential>,
    policy: SubmitPolicy,
}

impl FormModel {
    pub fn new(schema: Schema) -> Self {
        let engine = ValidationEngine::from_schema(&schema);
        let tree = Record::from_schema(&schema);
        Self {
            schema,
            engine,
            tree,
            errors: ErrorMap::new(),
            tracker: InteractionTracker::new(),
            state: FormState::Editing,
            existing: Vec::new(),
            issued_refresh: 0,
            applied_refresh: 0,
            last_failure: None,
            credential: None,
            policy: SubmitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Credential forwarded on every gateway call.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    pub fn tree(&self) -> &Record {
        &self.tree
    }

    /// Current error map: exact for every touched path, possibly partial for
    /// untouched ones.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    /// Read-only snapshot of records already in the remote collection.
    pub fn existing_records(&self) -> &[Record] {
        &self.existing
    }

    /// Message of the most recent failed submission, cleared on success.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn interactions(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.tracker.is_touched(path)
    }

    pub fn get(&self, path: &FieldPath) -> Result<&Value, PathError> {
        PathResolver::get(&self.tree, path)
    }

    /// Commits `value` at `path` in the shape the leaf's kind stores, marks it
    /// touched and re-evaluates that leaf plus any touched sibling whose rule
    /// reads it. Returns the leaf's current error.
    pub fn mutate(&mut self, path: &FieldPath, value: Value) -> Result<Option<&str>, PathError> {
        let value = match self.schema.field_at(path) {
            Some(field) => value.coerce(field.kind),
            None => value,
        };
        PathResolver::set(&mut self.tree, path, value)?;
        debug!("updated `{}`", path);
        self.tracker.touch(path.clone());
        self.revalidate(path);
        for dependent in self.engine.dependents(path) {
            if self.tracker.is_touched(&dependent) {
                self.revalidate(&dependent);
            }
        }
        Ok(self.errors.get(path).map(String::as_str))
    }

    /// Like [`FormModel::mutate`] for a raw keystroke string.
    pub fn mutate_input(&mut self, path: &FieldPath, raw: &str) -> Result<Option<&str>, PathError> {
        if self.schema.field_at(path).is_none() {
            return Err(PathError::UnknownField(path.to_string()));
        }
        self.mutate(path, Value::text(raw))
    }

    /// Marks `path` as interacted (a blur) and re-evaluates it.
    pub fn touch(&mut self, path: &FieldPath) -> Result<Option<&str>, PathError> {
        PathResolver::get(&self.tree, path)?;
        self.tracker.touch(path.clone());
        self.revalidate(path);
        Ok(self.errors.get(path).map(String::as_str))
    }

    /// Grows the collection at `prefix` (`plans`, `plans[0].payments`) by one
    /// default element and returns its index.
    pub fn append(&mut self, prefix: &FieldPath) -> Result<usize, PathError> {
        let index = PathResolver::append(&mut self.tree, &self.schema, prefix)?;
        debug!("appended `{}[{}]`", prefix, index);
        Ok(index)
    }

    /// Full-tree validation without side effects.
    pub fn validate(&self) -> ErrorMap {
        self.engine.validate_all(&self.tree)
    }

    /// The message to display for `path`: only once touched.
    pub fn visible_error(&self, path: &FieldPath) -> Option<&str> {
        if self.tracker.is_touched(path) {
            self.errors.get(path).map(String::as_str)
        } else {
            None
        }
    }

    pub fn visible_errors(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.errors
            .iter()
            .filter(|(path, _)| self.tracker.is_touched(path))
            .map(|(path, message)| (path, message.as_str()))
    }

    /// Fresh default tree; errors and touched state are dropped, the
    /// existing-records snapshot is kept.
    pub fn reset(&mut self) {
        self.tree = Record::from_schema(&self.schema);
        self.errors.clear();
        self.tracker.clear();
        self.last_failure = None;
    }

    /// Issues a ticket for a snapshot fetch. Only the latest ticket can be applied.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_refresh += 1;
        RefreshTicket(self.issued_refresh)
    }

    /// Applies a fetch result. Failures degrade to an empty snapshot; results
    /// for superseded tickets are discarded.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Json>, SyncError>,
    ) -> RefreshOutcome {
        if ticket.0 != self.issued_refresh || ticket.0 <= self.applied_refresh {
            warn!(
                "discarding stale snapshot response #{} (latest #{})",
                ticket.0, self.issued_refresh
            );
            return RefreshOutcome::Stale;
        }
        self.applied_refresh = ticket.0;
        match result {
            Ok(documents) => {
                let mut records = Vec::with_capacity(documents.len());
                for (index, document) in documents.iter().enumerate() {
                    match Record::from_json(&self.schema, document) {
                        Ok(record) => records.push(record),
                        Err(err) => warn!("skipping existing record #{}: {}", index, err),
                    }
                }
                info!("loaded {} existing record(s)", records.len());
                self.existing = records;
                RefreshOutcome::Applied(self.existing.len())
            }
            Err(err) => {
                warn!("failed to load existing records: {}", err);
                self.existing.clear();
                RefreshOutcome::Degraded(err.to_string())
            }
        }
    }

    /// Fetches and applies the existing-records snapshot. Call on mount.
    pub fn refresh<G: SyncGateway + ?Sized>(&mut self, gateway: &G) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = gateway.fetch_all(self.credential.as_ref());
        self.apply_refresh(ticket, result)
    }

    /// Validates the whole tree and, when clean, enters `Submitting` and
    /// returns the payload to append. On violations the error map is replaced
    /// by the full map and every violating path becomes touched.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        if self.state == FormState::Submitting {
            return Err(SubmitOutcome::InFlight);
        }
        let errors = self.engine.validate_all(&self.tree);
        if !errors.is_empty() {
            debug!("submission blocked by {} invalid field(s)", errors.len());
            self.tracker.touch_all(errors.keys().cloned());
            self.errors = errors.clone();
            return Err(SubmitOutcome::ValidationFailed(errors));
        }
        self.errors.clear();
        let payload = self
            .tree
            .to_json()
            .map_err(|err| SubmitOutcome::SubmissionFailed(SyncError::Serde(err)))?;
        self.state = FormState::Submitting;
        Ok(PendingSubmission { payload })
    }

    /// Resolves a pending submission with the gateway's answer. On success the
    /// caller is expected to refresh the snapshot.
    pub fn finish_submit(
        &mut self,
        _pending: PendingSubmission,
        result: Result<(), SyncError>,
    ) -> SubmitOutcome {
        self.state = FormState::Editing;
        match result {
            Ok(()) => {
                self.last_failure = None;
                let cleared = self.policy.reset_on_success;
                if cleared {
                    self.reset();
                }
                info!("member record submitted (form cleared: {})", cleared);
                SubmitOutcome::Submitted(SubmitReceipt {
                    cleared,
                    refresh: None,
                })
            }
            Err(err) => {
                warn!("submission failed: {}", err);
                self.last_failure = Some(err.to_string());
                SubmitOutcome::SubmissionFailed(err)
            }
        }
    }

    /// Validate, append, and on success reload the snapshot once.
    pub fn submit<G: SyncGateway + ?Sized>(&mut self, gateway: &G) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let result = gateway.append(pending.payload(), self.credential.as_ref());
        match self.finish_submit(pending, result) {
            SubmitOutcome::Submitted(mut receipt) => {
                receipt.refresh = Some(self.refresh(gateway));
                SubmitOutcome::Submitted(receipt)
            }
            other => other,
        }
    }

    fn revalidate(&mut self, path: &FieldPath) {
        match self.engine.validate_field(&self.tree, path) {
            Some(message) => {
                debug!("`{}` invalid: {}", path, message);
                self.errors.insert(path.clone(), message);
            }
            None => {
                self.errors.remove(path);
            }
        }
    }
}
