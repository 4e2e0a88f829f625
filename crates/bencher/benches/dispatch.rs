use std::hint::black_box;

use bencher::{TestCase, TestRequest, bench_app};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lite_gateway::memory;

const FILLER_ROUTES: usize = 64;

static ITEM_BODY: &str = r#"{"name": "pen", "price": 1.5, "tags": [{"name": "office"}, {"name": "blue"}]}"#;

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("static_route", TestRequest::get("/ping")),
        TestCase::normal("path_capture", TestRequest::get("/api/users/42?verbose=true")),
        TestCase::large("model_body", TestRequest::post_json("/api/items", ITEM_BODY)),
        TestCase::small("not_found", TestRequest::get("/missing/route")),
    ]
}

fn benchmark_route_resolution(criterion: &mut Criterion) {
    let app = bench_app(FILLER_ROUTES);
    let mut group = criterion.benchmark_group("route_resolution");

    for case in create_test_cases() {
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let method = case.request().method();
            b.iter(|| black_box(app.routes().resolve(black_box(case.request().path()), &method)));
        });
    }

    group.finish();
}

fn benchmark_dispatch(criterion: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().expect("tokio runtime should build");
    let app = bench_app(FILLER_ROUTES);
    let mut group = criterion.benchmark_group("dispatch");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.request().body_len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.to_async(&runtime).iter(|| async {
                let request = case.request().to_http().expect("benchmark request should be valid");
                let recorded = memory::call(&app, request).await.expect("in-memory gateway should not fail");
                black_box(recorded)
            });
        });
    }

    group.finish();
}

criterion_group!(dispatch, benchmark_route_resolution, benchmark_dispatch);
criterion_main!(dispatch);
