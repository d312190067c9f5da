use criterion::{black_box, criterion_group, criterion_main, Criterion};
use member_form::{
    config::FormConfig,
    domain::member::{self, member_form, payment_path, payments_of, plan_path},
    form::{FieldPath, FormModel},
};

fn build_member(plan_count: usize, payments_per_plan: usize) -> FormModel {
    let mut form = member_form(&FormConfig::default());
    for _ in 1..plan_count {
        form.append(&FieldPath::field(member::PLANS))
            .expect("append plan");
    }
    for plan in 0..plan_count {
        for _ in 1..payments_per_plan {
            form.append(&payments_of(plan)).expect("append payment");
        }
        form.mutate_input(&plan_path(plan, member::START_DATE), "2025-01-01")
            .expect("start date");
        form.mutate_input(&plan_path(plan, member::TRAINING_TYPE), "GENERAL")
            .expect("training type");
        for payment in 0..payments_per_plan {
            form.mutate_input(
                &payment_path(plan, payment, member::AMOUNT_PAID),
                &(10 * (payment + 1)).to_string(),
            )
            .expect("amount paid");
        }
    }
    form
}

fn bench_validate_all(c: &mut Criterion) {
    let form = build_member(200, 5);
    c.bench_function("validate_all_200_plans", |b| {
        b.iter(|| {
            let errors = form.validate();
            black_box(errors);
        })
    });
}

fn bench_incremental_edit(c: &mut Criterion) {
    let mut form = build_member(200, 5);
    let path = payment_path(199, 4, member::AMOUNT_PAID);
    c.bench_function("mutate_single_leaf_200_plans", |b| {
        b.iter(|| {
            form.mutate_input(black_box(&path), "42").expect("mutate");
        })
    });
}

criterion_group!(benches, bench_validate_all, bench_incremental_edit);
criterion_main!(benches);
