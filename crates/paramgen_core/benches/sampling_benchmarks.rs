//! Criterion benchmarks for paramgen_core sampling
//!
//! Run with: cargo bench -p paramgen_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jiff::civil::date;
use paramgen_core::{
    ParameterDefinition, SamplingSettings, SchemaVersion, TimeAxis, TimeSeriesGenerator,
    growth_coefficients,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn ten_year_axis() -> TimeAxis {
    TimeAxis::monthly(date(2020, 1, 1), date(2030, 1, 1)).unwrap()
}

fn constant_definition() -> ParameterDefinition {
    ParameterDefinition::new("power_tv")
        .distribution("numpy.random", "triangular")
        .params(50.0, Some(60.0.into()), Some(80.0.into()))
        .cagr(-0.02)
        .ref_date(date(2024, 1, 1))
}

fn grouped_definition() -> ParameterDefinition {
    ParameterDefinition::new("power_laptop")
        .version(SchemaVersion::V2)
        .growth_type("exp")
        .ref_date(date(2024, 1, 1))
        .ref_value([("DE", 20.0), ("FR", 22.0), ("UK", 25.0)])
        .growth_factor(0.01)
        .ef_growth_factor(0.05)
        .variation(0.2)
}

fn bench_growth_coefficients(c: &mut Criterion) {
    c.bench_function("growth_coefficients_10yr_1000", |b| {
        b.iter(|| {
            growth_coefficients(
                black_box(date(2020, 1, 1)),
                black_box(date(2030, 1, 1)),
                black_box(date(2015, 6, 1)),
                black_box(0.05),
                black_box(1000),
            )
        })
    });
}

fn bench_constant_uncertainty(c: &mut Criterion) {
    let mut group = c.benchmark_group("constant_uncertainty");
    let definition = constant_definition();

    for samples in [10, 100, 1000].iter() {
        let settings = SamplingSettings::new()
            .sample_size(*samples)
            .time_series(ten_year_axis());
        let generator = TimeSeriesGenerator::from_definition(&definition, &settings).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        group.bench_with_input(BenchmarkId::new("samples", samples), samples, |b, _| {
            b.iter(|| generator.generate(black_box(&mut rng)))
        });
    }

    group.finish();
}

fn bench_mean_variance_grouped(c: &mut Criterion) {
    let mut group = c.benchmark_group("mean_variance_grouped");
    let definition = grouped_definition();

    for samples in [10, 100, 1000].iter() {
        let settings = SamplingSettings::new()
            .sample_size(*samples)
            .time_series(ten_year_axis())
            .grouped(["power_laptop"], ["DE", "FR", "UK"]);
        let generator = TimeSeriesGenerator::from_definition(&definition, &settings).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        group.bench_with_input(BenchmarkId::new("samples", samples), samples, |b, _| {
            b.iter(|| generator.generate(black_box(&mut rng)))
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let settings = SamplingSettings::new()
        .sample_size(1000)
        .time_series(ten_year_axis());
    let series = TimeSeriesGenerator::from_definition(&constant_definition(), &settings)
        .unwrap()
        .generate(&mut StdRng::seed_from_u64(42));

    c.bench_function("summarize_10yr_1000", |b| b.iter(|| black_box(&series).summarize()));
}

criterion_group!(
    benches,
    bench_growth_coefficients,
    bench_constant_uncertainty,
    bench_mean_variance_grouped,
    bench_summary
);
criterion_main!(benches);
