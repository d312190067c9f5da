use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde_json::Value as Json;

use crate::errors::SyncError;

use super::{Credential, SyncGateway};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Json>,
    fetch_calls: usize,
    append_calls: usize,
    pending_fetch_failures: VecDeque<String>,
    append_failure: Option<String>,
    last_credential: Option<Credential>,
}

/// Process-local collection. Counts calls and can be told to fail, which
/// makes it the gateway of choice for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
    required: Option<Credential>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Json>) -> Self {
        let gateway = Self::new();
        gateway.lock().records = records;
        gateway
    }

    /// Rejects calls that do not forward exactly `credential`.
    pub fn requiring(mut self, credential: Credential) -> Self {
        self.required = Some(credential);
        self
    }

    /// The next fetch fails with `message`. Queued failures are consumed in order.
    pub fn fail_next_fetch(&self, message: impl Into<String>) {
        self.lock().pending_fetch_failures.push_back(message.into());
    }

    /// Every append fails with `message` until cleared with `None`.
    pub fn fail_appends(&self, message: Option<String>) {
        self.lock().append_failure = message;
    }

    pub fn records(&self) -> Vec<Json> {
        self.lock().records.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    pub fn append_calls(&self) -> usize {
        self.lock().append_calls
    }

    pub fn last_credential(&self) -> Option<Credential> {
        self.lock().last_credential.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn authorize(&self, credential: Option<&Credential>) -> Result<(), SyncError> {
        match &self.required {
            Some(required) if credential != Some(required) => Err(SyncError::Unauthorized),
            _ => Ok(()),
        }
    }
}

impl SyncGateway for InMemoryGateway {
    fn fetch_all(&self, credential: Option<&Credential>) -> Result<Vec<Json>, SyncError> {
        let mut state = self.lock();
        state.fetch_calls += 1;
        state.last_credential = credential.cloned();
        if let Some(message) = state.pending_fetch_failures.pop_front() {
            return Err(SyncError::Unavailable(message));
        }
        self.authorize(credential)?;
        Ok(state.records.clone())
    }

    fn append(&self, record: &Json, credential: Option<&Credential>) -> Result<(), SyncError> {
        let mut state = self.lock();
        state.append_calls += 1;
        state.last_credential = credential.cloned();
        if let Some(message) = &state.append_failure {
            return Err(SyncError::Rejected(message.clone()));
        }
        self.authorize(credential)?;
        state.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appends_are_visible_to_later_fetches() {
        let gateway = InMemoryGateway::new();
        gateway.append(&json!({ "firstName": "Ada" }), None).unwrap();
        let records = gateway.fetch_all(None).unwrap();
        assert_eq!(records, vec![json!({ "firstName": "Ada" })]);
        assert_eq!(gateway.append_calls(), 1);
        assert_eq!(gateway.fetch_calls(), 1);
    }

    #[test]
    fn queued_fetch_failures_are_consumed_once() {
        let gateway = InMemoryGateway::with_records(vec![json!({})]);
        gateway.fail_next_fetch("offline");
        gateway.fail_next_fetch("timeout");
        assert!(matches!(
            gateway.fetch_all(None),
            Err(SyncError::Unavailable(message)) if message == "offline"
        ));
        assert!(matches!(
            gateway.fetch_all(None),
            Err(SyncError::Unavailable(message)) if message == "timeout"
        ));
        assert_eq!(gateway.fetch_all(None).unwrap().len(), 1);
    }

    #[test]
    fn enforces_required_credential() {
        let token = Credential::new("token-1");
        let gateway = InMemoryGateway::new().requiring(token.clone());
        assert!(matches!(
            gateway.append(&json!({}), None),
            Err(SyncError::Unauthorized)
        ));
        assert!(gateway.append(&json!({}), Some(&token)).is_ok());
        assert_eq!(gateway.last_credential(), Some(token));
        assert_eq!(gateway.records().len(), 1);
    }
}
