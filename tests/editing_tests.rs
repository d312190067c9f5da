mod common;

use chrono::NaiveDate;
use common::{blank_form, filled_form, valid_member_inputs};
use member_form::{
    domain::member::{self, payment_path, payments_of, plan_path, PLANS},
    form::{FieldPath, PathResolver, Value},
    PathError,
};

#[test]
fn filled_fixture_is_valid() {
    let form = filled_form();
    assert!(form.validate().is_empty(), "{:?}", form.validate());
    assert!(form.errors().is_empty());
}

#[test]
fn blanking_any_required_leaf_reports_exactly_that_leaf() {
    for (path, _) in valid_member_inputs() {
        let mut form = filled_form();
        form.mutate_input(&path, "").unwrap();
        let errors = form.validate();
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec![&path],
            "blanking {}",
            path
        );
        assert!(errors[&path].ends_with("is required"), "{}", errors[&path]);
    }
}

#[test]
fn fixture_covers_every_required_leaf() {
    let form = blank_form();
    let covered: Vec<FieldPath> = valid_member_inputs()
        .into_iter()
        .map(|(path, _)| path)
        .collect();
    for (template, spec) in form.schema().leaf_templates() {
        if !spec.is_required() {
            continue;
        }
        for path in PathResolver::expand(form.tree(), &template) {
            assert!(covered.contains(&path), "{} missing from fixture", path);
        }
    }
    assert!(covered.contains(&plan_path(0, member::ADMISSION_FEES)));
    assert!(covered.contains(&plan_path(0, member::DISCOUNT)));
}

#[test]
fn required_messages_are_field_specific() {
    let form = blank_form();
    let errors = form.validate();
    let expect = [
        (FieldPath::field(member::LAST_NAME), "Last Name is required"),
        (FieldPath::field(member::DOB), "Date of Birth is required"),
        (
            FieldPath::field(member::DATE_OF_JOINING),
            "Date of Joining is required",
        ),
        (
            plan_path(0, member::TRAINING_TYPE),
            "Training Type is required",
        ),
    ];
    for (path, message) in expect {
        assert_eq!(errors.get(&path).map(String::as_str), Some(message));
    }
    assert!(!errors.contains_key(&FieldPath::field(member::NOTES)));
    assert!(!errors.contains_key(&plan_path(0, member::PLAN_ID)));
}

#[test]
fn set_then_get_round_trips_every_leaf() {
    let mut form = blank_form();
    for (path, raw) in valid_member_inputs() {
        let kind = form.schema().field_at(&path).unwrap().kind;
        let value = Value::from_input(kind, raw);
        form.mutate(&path, value.clone()).unwrap();
        assert_eq!(form.get(&path).unwrap(), &value);
        assert_eq!(PathResolver::get(form.tree(), &path).unwrap(), &value);
    }
}

#[test]
fn errors_become_visible_only_after_touch() {
    let mut form = blank_form();
    let email = FieldPath::field(member::EMAIL);
    assert!(form.engine().validate_field(form.tree(), &email).is_some());
    assert_eq!(form.visible_error(&email), None);
    assert_eq!(form.visible_errors().count(), 0);

    assert_eq!(form.touch(&email).unwrap(), Some("Email is required"));
    assert_eq!(form.visible_error(&email), Some("Email is required"));

    form.mutate_input(&email, "not-an-email").unwrap();
    assert_eq!(form.visible_error(&email), Some("Invalid email address"));
    form.mutate_input(&email, "ok@example.org").unwrap();
    assert_eq!(form.visible_error(&email), None);
}

#[test]
fn choice_fields_are_closed_sets() {
    let mut form = blank_form();
    let gender = FieldPath::field(member::GENDER);
    assert_eq!(
        form.mutate_input(&gender, "unknown").unwrap(),
        Some("Gender must be one of: MALE, FEMALE, OTHER, UNSPECIFIED")
    );
    let plan = plan_path(0, member::PLAN_ID);
    assert!(form
        .mutate_input(&plan, "00000000-0000-0000-0000-000000000000")
        .unwrap()
        .is_some());
    assert_eq!(
        form.mutate_input(&plan, "61d6c0a4-55ac-436b-813b-68c48cd91345")
            .unwrap(),
        None
    );
}

#[test]
fn birth_after_joining_is_flagged_and_cleared_from_either_side() {
    let mut form = filled_form();
    let dob = FieldPath::field(member::DOB);
    let joined = FieldPath::field(member::DATE_OF_JOINING);

    assert_eq!(
        form.mutate_input(&dob, "2025-03-01").unwrap(),
        Some("Date of Birth must not be after Date of Joining")
    );
    form.mutate(
        &joined,
        Value::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
    )
    .unwrap();
    assert_eq!(form.visible_error(&dob), None);
}

#[test]
fn numbers_and_dates_report_unparsed_input() {
    let mut form = blank_form();
    assert_eq!(
        form.mutate_input(&plan_path(0, member::DISCOUNT), "ten")
            .unwrap(),
        Some("Discount must be a number")
    );
    assert_eq!(
        form.mutate_input(&plan_path(0, member::START_DATE), "31/02/2024")
            .unwrap(),
        Some("Start Date must be a valid date")
    );
}

#[test]
fn appended_plans_and_payments_are_validated() {
    let mut form = filled_form();
    assert_eq!(form.append(&FieldPath::field(PLANS)).unwrap(), 1);
    assert_eq!(form.append(&payments_of(1)).unwrap(), 1);

    let errors = form.validate();
    assert!(errors.contains_key(&plan_path(1, member::START_DATE)));
    assert!(!errors.contains_key(&payment_path(1, 1, member::AMOUNT_PAID)));
    assert_eq!(
        form.get(&payment_path(1, 1, member::AMOUNT_PAID)).unwrap(),
        &Value::Number(0.0)
    );
}

#[test]
fn bad_paths_are_errors_not_panics() {
    let mut form = blank_form();
    assert!(matches!(
        form.mutate(&plan_path(3, member::DISCOUNT), Value::Number(1.0)),
        Err(PathError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        form.touch(&FieldPath::field("nickname")),
        Err(PathError::UnknownField(_))
    ));
    assert!(matches!(
        "plans[x].discount".parse::<FieldPath>(),
        Err(PathError::Malformed(_))
    ));
}

#[test]
fn reset_restores_defaults_and_forgets_interaction() {
    let mut form = filled_form();
    form.reset();
    assert_eq!(
        form.get(&FieldPath::field(member::FIRST_NAME)).unwrap(),
        &Value::empty()
    );
    assert!(form.interactions().is_empty());
    assert!(form.errors().is_empty());
}
