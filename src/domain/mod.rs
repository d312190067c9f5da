pub mod member;

pub use member::{
    member_form, member_form_with_credential, member_schema, CatalogEntry, Country,
    DiscountType, Gender, TrainingType,
};
