//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeflow::prelude::*;
use pipeflow::testing::FailingStep;
use serde_json::{json, Value};

fn chain() -> PipelineConfig {
    PipelineConfig::builder()
        .fn_step("fetch", |_| Ok(json!((0..64).collect::<Vec<i64>>())))
        .fn_step("transform", |input| {
            let doubled: Vec<i64> = input
                .as_ref()
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_i64).map(|v| v * 2).collect())
                .unwrap_or_default();
            Ok(json!(doubled))
        })
        .fn_step("summarize", |input| {
            let total: i64 = input
                .as_ref()
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_i64).sum())
                .unwrap_or_default();
            Ok(json!(total))
        })
        .build()
}

fn pipeline_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = RunSettings::default().with_snapshot_dir(dir.path());

    let pipeline = Pipeline::new(chain()).with_settings(settings.clone());
    c.bench_function("run_three_steps", |b| {
        b.iter(|| black_box(pipeline.run()))
    });

    let failing = Pipeline::new(
        PipelineConfig::builder()
            .fn_step("fetch", |_| Ok(json!({"rows": 10})))
            .step("store", FailingStep::new("IntegrityError", "UNIQUE constraint failed"))
            .build(),
    )
    .with_settings(settings);
    c.bench_function("run_failure_with_snapshot", |b| {
        b.iter(|| black_box(failing.run()))
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
