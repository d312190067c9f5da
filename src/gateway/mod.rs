//! Contract between the form core and the remote member collection.
//!
//! The core needs exactly two calls: read the whole collection and append one
//! record. Documents travel as record-shaped JSON; decoding them against a
//! schema is the caller's concern.

pub mod json_backend;
pub mod memory;

use std::fmt;

use serde_json::Value as Json;

use crate::errors::SyncError;

pub use json_backend::JsonCollectionGateway;
pub use memory::InMemoryGateway;

/// Opaque bearer credential supplied by an external token store.
///
/// The core forwards it untouched; `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for gateways that put it on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Remote collection operations. Each call is a single best-effort round
/// trip: implementations neither retry nor batch.
pub trait SyncGateway: Send + Sync {
    fn fetch_all(&self, credential: Option<&Credential>) -> Result<Vec<Json>, SyncError>;
    fn append(&self, record: &Json, credential: Option<&Credential>) -> Result<(), SyncError>;
}

impl<G: SyncGateway + ?Sized> SyncGateway for &G {
    fn fetch_all(&self, credential: Option<&Credential>) -> Result<Vec<Json>, SyncError> {
        (**self).fetch_all(credential)
    }

    fn append(&self, record: &Json, credential: Option<&Credential>) -> Result<(), SyncError> {
        (**self).append(record, credential)
    }
}
