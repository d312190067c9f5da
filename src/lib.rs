#![doc(test(attr(deny(warnings))))]

//! Member Form is the headless core of a membership registration form: a
//! schema-driven record tree with path addressing, per-field validation,
//! touched-state tracking and synchronisation with a remote member
//! collection.

pub mod config;
pub mod domain;
pub mod errors;
pub mod form;
pub mod gateway;
pub mod utils;

use std::sync::Once;

pub use config::{ConfigManager, FormConfig};
pub use errors::{ConfigError, DecodeError, PathError, SyncError};
pub use form::{FieldPath, FormModel, RefreshOutcome, SubmitOutcome, Value};
pub use gateway::{Credential, InMemoryGateway, JsonCollectionGateway, SyncGateway};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            "Member Form {} initialized (git {}, {} build).",
            build.version,
            build.git_hash,
            build.profile
        );
    });
}
