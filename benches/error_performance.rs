//! Benchmarks for error construction and the response boundary.
//!
//! Construction sits on every failing request, so the interesting numbers
//! are the plain-kind fast path, the secure-kind paths on either side of
//! the override, and the fallback path that emits a warning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iam_errors::message::{self, Disclosure};
use iam_errors::template;
use iam_errors::{ApiError, ErrorKind, ErrorResponse, Failure, InternalError, Params, Snapshot};

// ============================================================================
// CONSTRUCTION BENCHMARKS
// ============================================================================

fn bench_plain_construction(c: &mut Criterion) {
    let snapshot = Snapshot::redacted();

    c.bench_function("plain_static_params", |b| {
        b.iter(|| {
            black_box(
                ApiError::builder(ErrorKind::UserNotFound)
                    .param("user_id", "3f2a9c")
                    .build_with(&snapshot),
            )
        })
    });

    c.bench_function("plain_integer_params", |b| {
        b.iter(|| {
            black_box(
                ApiError::builder(ErrorKind::PasswordAgeValidation)
                    .param("min_age_days", 1u32)
                    .param("days_left", black_box(3u32))
                    .build_with(&snapshot),
            )
        })
    });

    c.bench_function("plain_no_template", |b| {
        b.iter(|| {
            black_box(ApiError::builder(ErrorKind::ForbiddenNotSecurity).build_with(&snapshot))
        })
    });
}

fn bench_secure_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("secure_kinds");

    for (label, snapshot) in [
        ("redacted", Snapshot::redacted()),
        ("revealing", Snapshot::revealing()),
    ] {
        group.bench_with_input(BenchmarkId::new("unexpected", label), &snapshot, |b, s| {
            b.iter(|| {
                black_box(
                    ApiError::builder(ErrorKind::Unexpected)
                        .message(format!("backend timeout after {}ms", black_box(250)))
                        .build_with(s),
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("auth_methods", label), &snapshot, |b, s| {
            b.iter(|| black_box(ApiError::builder(ErrorKind::AuthMethodNotSupported).build_with(s)))
        });
    }

    group.finish();
}

fn bench_fallback(c: &mut Criterion) {
    // No subscriber is installed, so the warning is filtered at the callsite.
    let snapshot = Snapshot::redacted();
    c.bench_function("missing_param_fallback", |b| {
        b.iter(|| {
            black_box(
                ApiError::builder(ErrorKind::Validation)
                    .param("attribute", "name")
                    .build_with(&snapshot),
            )
        })
    });
}

// ============================================================================
// TEMPLATE BENCHMARKS
// ============================================================================

fn bench_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("template");
    let raw = ErrorKind::AssignmentTypeCalculation
        .spec()
        .debug_template
        .unwrap_or_default();
    let pairs: &[(&str, &str)] = &[
        ("user_id", "u"),
        ("group_id", "g"),
        ("project_id", "p"),
        ("domain_id", "d"),
    ];

    group.bench_function("placeholders", |b| b.iter(|| black_box(template::placeholders(raw))));
    group.bench_function("render_four", |b| b.iter(|| black_box(template::render(raw, pairs))));

    let mut params = Params::new();
    params.insert("user_id", "42");
    group.bench_function("message_build", |b| {
        b.iter(|| {
            black_box(message::build(
                ErrorKind::UserNotFound,
                None,
                &params,
                Disclosure::Redacted,
            ))
        })
    });

    group.finish();
}

// ============================================================================
// BOUNDARY BENCHMARKS
// ============================================================================

fn bench_boundary(c: &mut Criterion) {
    let snapshot = Snapshot::redacted().with_auth_methods(["password", "token"]);
    let err = ApiError::builder(ErrorKind::AuthMethodNotSupported).build_with(&snapshot);

    c.bench_function("response_to_json", |b| {
        b.iter(|| black_box(ErrorResponse::from_error(&err).to_json()))
    });

    c.bench_function("clone_shares_instance", |b| b.iter(|| black_box(err.clone())));

    c.bench_function("internal_log_write_to", |b| {
        let mut buffer = String::with_capacity(256);
        b.iter(|| {
            buffer.clear();
            let _ = err.internal_log().write_to(&mut buffer);
            black_box(buffer.len())
        })
    });

    c.bench_function("internal_failure_rewrap", |b| {
        b.iter(|| {
            let failure = Failure::from(InternalError::Configuration("no signing key".into()));
            black_box(ErrorResponse::from_failure_with(failure, &snapshot))
        })
    });
}

criterion_group!(
    construction_benches,
    bench_plain_construction,
    bench_secure_construction,
    bench_fallback,
);

criterion_group!(template_benches, bench_templates);

criterion_group!(boundary_benches, bench_boundary);

criterion_main!(construction_benches, template_benches, boundary_benches);
