#![allow(dead_code)]

use std::sync::Mutex;

use member_form::{
    config::{ConfigManager, FormConfig},
    domain::member::{self, member_form, payment_path, plan_path},
    form::{FieldPath, FormModel},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Config manager rooted in a unique temporary directory.
pub fn setup_test_env() -> ConfigManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    ConfigManager::with_base_dir(base).expect("create config manager for temp dir")
}

pub fn blank_form() -> FormModel {
    member_form(&FormConfig::default())
}

/// Every required leaf of a one-plan member, as raw input.
pub fn valid_member_inputs() -> Vec<(FieldPath, &'static str)> {
    vec![
        (FieldPath::field(member::FIRST_NAME), "Jane"),
        (FieldPath::field(member::LAST_NAME), "Doe"),
        (FieldPath::field(member::MOBILE), "5551234"),
        (FieldPath::field(member::COUNTRY_SHORT_CODE), "IN"),
        (FieldPath::field(member::COUNTRY_CODE), "+91"),
        (FieldPath::field(member::EMAIL), "jane.doe@example.com"),
        (FieldPath::field(member::DOB), "1990-05-01"),
        (FieldPath::field(member::GENDER), "FEMALE"),
        (FieldPath::field(member::DATE_OF_JOINING), "2024-01-15"),
        (FieldPath::field(member::ADDRESS), "12 Main Street"),
        (plan_path(0, member::START_DATE), "2024-01-15"),
        (plan_path(0, member::TRAINING_TYPE), "GENERAL"),
        (plan_path(0, member::ADMISSION_FEES), "0"),
        (plan_path(0, member::DISCOUNT), "0"),
        (plan_path(0, member::DISCOUNT_TYPE), "PERCENTAGE"),
        (payment_path(0, 0, member::AMOUNT_PAID), "0"),
    ]
}

/// A member form that passes full validation.
pub fn filled_form() -> FormModel {
    let mut form = blank_form();
    fill_valid_member(&mut form);
    form
}

pub fn fill_valid_member(form: &mut FormModel) {
    for (path, raw) in valid_member_inputs() {
        form.mutate_input(&path, raw).expect("fixture path exists");
    }
}
