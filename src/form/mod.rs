//! Path-addressable nested form state and its validation engine.

pub mod interaction;
pub mod model;
pub mod path;
pub mod record;
pub mod rules;
pub mod schema;
pub mod validation;
pub mod value;

pub use interaction::InteractionTracker;
pub use model::{
    FormModel, FormState, PendingSubmission, RefreshOutcome, RefreshTicket, SubmitOutcome,
    SubmitPolicy, SubmitReceipt,
};
pub use path::{FieldPath, PathResolver, PathTemplate, Segment, TemplateSegment};
pub use record::{Node, Record};
pub use rules::Rule;
pub use schema::{CollectionSpec, FieldSpec, Schema};
pub use validation::{ErrorMap, FieldRule, ValidationEngine};
pub use value::{FieldKind, Value, DATE_FORMAT};
