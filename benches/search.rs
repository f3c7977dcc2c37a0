use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use miv_automl::autopipeline::ProblemTypeDetector;
use miv_automl::training::{AutoSearchEngine, SearchConfig, TabularSearchEngine, TaskKind};
use miv_automl::utils::{detect_separator, DatasetLoader};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::io::Cursor;

fn create_csv(n_rows: usize, n_features: usize, sep: char) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut header: Vec<String> = (0..n_features).map(|i| format!("feature_{}", i)).collect();
    header.push("target".to_string());

    let mut text = header.join(&sep.to_string());
    text.push('\n');
    for _ in 0..n_rows {
        let values: Vec<f64> = (0..n_features).map(|_| rng.gen::<f64>() * 10.0).collect();
        let target: f64 = values.iter().sum::<f64>() + rng.gen::<f64>() * 0.1;
        let mut row: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
        row.push(format!("{:.4}", target));
        text.push_str(&row.join(&sep.to_string()));
        text.push('\n');
    }
    text
}

fn load(n_rows: usize) -> DataFrame {
    let csv = create_csv(n_rows, 5, ',');
    DatasetLoader::new()
        .load(csv.as_bytes(), true)
        .map(|d| d.frame().clone())
        .unwrap_or_default()
}

fn bench_separator(c: &mut Criterion) {
    let mut group = c.benchmark_group("separator");

    for sep in [',', ';', '\t', '|'] {
        let csv = create_csv(1000, 8, sep);
        group.bench_with_input(BenchmarkId::new("detect", sep.escape_default()), &csv, |b, csv| {
            b.iter(|| {
                let mut stream = Cursor::new(csv.as_bytes());
                detect_separator(black_box(&mut stream), true)
            })
        });
    }
    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let df = load(10_000);
    let detector = ProblemTypeDetector::new();

    c.bench_function("infer_problem_type", |b| {
        b.iter(|| detector.infer(black_box(&df), "target").ok())
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10); // Fewer samples for full model searches

    for n_rows in [200, 1000].iter() {
        let df = load(*n_rows);
        let engine = AutoSearchEngine::new(SearchConfig::default().with_n_estimators(20));

        group.bench_with_input(BenchmarkId::new("compare_models", n_rows), &df, |b, df| {
            b.iter(|| engine.compare_models(black_box(df), "target", TaskKind::Regression, 123).ok())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_separator, bench_inference, bench_search);
criterion_main!(benches);
