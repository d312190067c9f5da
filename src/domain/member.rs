//! The membership registration record: wire keys, closed option sets, the
//! plan and batch catalogs, and the schema tying them to rules and labels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::FormConfig;
use crate::form::{FieldKind, FieldPath, FieldSpec, FormModel, Rule, Schema, SubmitPolicy, Value};
use crate::gateway::Credential;

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const MOBILE: &str = "mobile";
pub const COUNTRY_SHORT_CODE: &str = "countryShortCode";
pub const COUNTRY_CODE: &str = "countryCode";
pub const EMAIL: &str = "email";
pub const DOB: &str = "dob";
pub const GENDER: &str = "gender";
/// Spelled as the remote collection stores it.
pub const DATE_OF_JOINING: &str = "dateOfJoing";
pub const ADDRESS: &str = "address";
pub const NOTES: &str = "notes";

pub const PLANS: &str = "plans";
pub const PLAN_ID: &str = "planId";
pub const BATCH_ID: &str = "batchId";
pub const START_DATE: &str = "startDate";
pub const TRAINING_TYPE: &str = "trainingType";
pub const ADMISSION_FEES: &str = "admissionFees";
pub const DISCOUNT: &str = "discount";
pub const DISCOUNT_TYPE: &str = "discountType";

pub const PAYMENTS: &str = "payments";
pub const AMOUNT_PAID: &str = "amountPaid";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unspecified,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::Unspecified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
            Gender::Unspecified => "UNSPECIFIED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingType {
    General,
    Personal,
}

impl TrainingType {
    pub const ALL: [TrainingType; 2] = [TrainingType::General, TrainingType::Personal];

    pub fn as_str(self) -> &'static str {
        match self {
            TrainingType::General => "GENERAL",
            TrainingType::Personal => "PERSONAL",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    Amount,
}

impl DiscountType {
    pub const ALL: [DiscountType; 2] = [DiscountType::Percentage, DiscountType::Amount];

    pub fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "PERCENTAGE",
            DiscountType::Amount => "AMOUNT",
        }
    }
}

/// Countries offered by the registration form, with their ISO short code
/// and international dial code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Country {
    #[serde(rename = "AF")]
    Afghanistan,
    #[serde(rename = "AU")]
    Australia,
    #[serde(rename = "BD")]
    Bangladesh,
    #[serde(rename = "BR")]
    Brazil,
    #[serde(rename = "CA")]
    Canada,
    #[serde(rename = "CN")]
    China,
    #[serde(rename = "DE")]
    Germany,
    #[serde(rename = "IS")]
    Iceland,
    #[serde(rename = "IN")]
    India,
    #[serde(rename = "MY")]
    Malaysia,
    #[serde(rename = "SG")]
    Singapore,
    #[serde(rename = "CH")]
    Switzerland,
}

impl Country {
    pub const ALL: [Country; 12] = [
        Country::Afghanistan,
        Country::Australia,
        Country::Bangladesh,
        Country::Brazil,
        Country::Canada,
        Country::China,
        Country::Germany,
        Country::Iceland,
        Country::India,
        Country::Malaysia,
        Country::Singapore,
        Country::Switzerland,
    ];

    pub fn short_code(self) -> &'static str {
        match self {
            Country::Afghanistan => "AF",
            Country::Australia => "AU",
            Country::Bangladesh => "BD",
            Country::Brazil => "BR",
            Country::Canada => "CA",
            Country::China => "CN",
            Country::Germany => "DE",
            Country::Iceland => "IS",
            Country::India => "IN",
            Country::Malaysia => "MY",
            Country::Singapore => "SG",
            Country::Switzerland => "CH",
        }
    }

    pub fn dial_code(self) -> &'static str {
        match self {
            Country::Afghanistan => "+93",
            Country::Australia => "+61",
            Country::Bangladesh => "+880",
            Country::Brazil => "+55",
            Country::Canada => "+1",
            Country::China => "+86",
            Country::Germany => "+49",
            Country::Iceland => "+354",
            Country::India => "+91",
            Country::Malaysia => "+60",
            Country::Singapore => "+65",
            Country::Switzerland => "+41",
        }
    }

    pub fn from_short_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|country| country.short_code() == code)
    }
}

/// A selectable plan or batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

pub fn default_plans() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            Uuid::from_u128(0x61d6c0a4_55ac_436b_813b_68c48cd91345),
            "Morning",
        ),
        CatalogEntry::new(
            Uuid::from_u128(0x61d6c0a4_55ac_436b_813b_68c48cd91356),
            "Evening",
        ),
    ]
}

pub fn default_batches() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            Uuid::from_u128(0x61d6c0a4_55ac_436b_813b_68c48cd91245),
            "Morning",
        ),
        CatalogEntry::new(
            Uuid::from_u128(0x61d6c0a4_55ac_436b_813b_68c48cd91256),
            "Evening",
        ),
    ]
}

fn catalog_rule(entries: &[CatalogEntry]) -> Rule {
    Rule::one_of(entries.iter().map(|entry| entry.id.to_string()))
}

fn choice(key: &'static str, label: &'static str, options: &[&'static str]) -> FieldSpec {
    FieldSpec::new(key, label, FieldKind::Choice)
        .required()
        .with_rule(Rule::one_of(options.iter().copied()))
}

fn amount(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(key, label, FieldKind::Number)
        .required()
        .with_default(Value::Number(0.0))
}

fn payment_schema() -> Schema {
    Schema::new("payment").with_field(amount(AMOUNT_PAID, "Amount Paid"))
}

fn plan_schema(plans: &[CatalogEntry], batches: &[CatalogEntry]) -> Schema {
    let training: Vec<&'static str> = TrainingType::ALL.iter().map(|t| t.as_str()).collect();
    let discount: Vec<&'static str> = DiscountType::ALL.iter().map(|d| d.as_str()).collect();
    Schema::new("plan")
        .with_field(FieldSpec::new(PLAN_ID, "Plan Id", FieldKind::Choice).with_rule(catalog_rule(plans)))
        .with_field(
            FieldSpec::new(BATCH_ID, "Batch Id", FieldKind::Choice).with_rule(catalog_rule(batches)),
        )
        .with_field(FieldSpec::new(START_DATE, "Start Date", FieldKind::Date).required())
        .with_field(choice(TRAINING_TYPE, "Training Type", &training))
        .with_field(amount(ADMISSION_FEES, "Admission Fees"))
        .with_field(amount(DISCOUNT, "Discount"))
        .with_field(choice(DISCOUNT_TYPE, "Discount Type", &discount))
        .with_collection(PAYMENTS, "Payments", payment_schema())
}

/// Membership schema with the given plan and batch catalogs.
///
/// Stricter than the registration form this record came from in two places:
/// date of birth must not fall after the date of joining, and a non-empty
/// plan or batch id must name a catalog entry.
pub fn member_schema(plans: &[CatalogEntry], batches: &[CatalogEntry]) -> Schema {
    let short_codes: Vec<&'static str> = Country::ALL.iter().map(|c| c.short_code()).collect();
    let dial_codes: Vec<&'static str> = Country::ALL.iter().map(|c| c.dial_code()).collect();
    let genders: Vec<&'static str> = Gender::ALL.iter().map(|g| g.as_str()).collect();
    Schema::new("member")
        .with_field(FieldSpec::new(FIRST_NAME, "First Name", FieldKind::Text).required())
        .with_field(FieldSpec::new(LAST_NAME, "Last Name", FieldKind::Text).required())
        .with_field(FieldSpec::new(MOBILE, "Mobile", FieldKind::Text).required())
        .with_field(choice(COUNTRY_SHORT_CODE, "Country Short Code", &short_codes))
        .with_field(choice(COUNTRY_CODE, "Country Code", &dial_codes))
        .with_field(
            FieldSpec::new(EMAIL, "Email", FieldKind::Text)
                .required()
                .with_rule(Rule::Email),
        )
        .with_field(
            FieldSpec::new(DOB, "Date of Birth", FieldKind::Date)
                .required()
                .with_rule(Rule::NotAfter {
                    field: DATE_OF_JOINING,
                    label: "Date of Joining",
                }),
        )
        .with_field(choice(GENDER, "Gender", &genders))
        .with_field(FieldSpec::new(DATE_OF_JOINING, "Date of Joining", FieldKind::Date).required())
        .with_field(FieldSpec::new(ADDRESS, "Address", FieldKind::Text).required())
        .with_field(FieldSpec::new(NOTES, "Notes", FieldKind::Text))
        .with_collection(PLANS, "Plans", plan_schema(plans, batches))
}

/// A fresh member form configured from `config`.
pub fn member_form(config: &FormConfig) -> FormModel {
    FormModel::new(member_schema(&config.plans, &config.batches)).with_policy(SubmitPolicy {
        reset_on_success: config.reset_after_submit,
    })
}

/// Same as [`member_form`], forwarding `credential` on every gateway call.
pub fn member_form_with_credential(config: &FormConfig, credential: Credential) -> FormModel {
    member_form(config).with_credential(credential)
}

/// `plans[plan].<key>`
pub fn plan_path(plan: usize, key: &str) -> FieldPath {
    FieldPath::root().item(PLANS, plan).then(key)
}

/// `plans[plan].payments[payment].<key>`
pub fn payment_path(plan: usize, payment: usize, key: &str) -> FieldPath {
    FieldPath::root()
        .item(PLANS, plan)
        .item(PAYMENTS, payment)
        .then(key)
}

/// `plans[plan].payments`, the prefix to append a payment to.
pub fn payments_of(plan: usize) -> FieldPath {
    FieldPath::root().item(PLANS, plan).then(PAYMENTS)
}
