use criterion::{Criterion, criterion_group, criterion_main};
use cyto2diagnosis::{
    AppConfig, Diagnosis, DiagnosisEngine, DiagnosisModel, FEATURE_COUNT, FeatureVector,
    ScalingBounds, TissueSample,
};

fn synthetic_samples(n: usize) -> Vec<TissueSample> {
    (0..n)
        .map(|i| {
            let malignant = i % 2 == 1;
            let base = if malignant { 3.0 } else { 1.0 };
            let mut values = [0.0; FEATURE_COUNT];
            for (j, v) in values.iter_mut().enumerate() {
                *v = base + (i as f64) * 0.001 + (j as f64) * 0.01;
            }
            TissueSample {
                features: values.into(),
                diagnosis: if malignant {
                    Diagnosis::Malignant
                } else {
                    Diagnosis::Benign
                },
            }
        })
        .collect()
}

fn trained() -> (ScalingBounds, DiagnosisModel) {
    let samples = synthetic_samples(200);
    let bounds = ScalingBounds::fit(&samples).expect("fit bounds");
    let model = DiagnosisModel::train(&bounds, &samples).expect("train model");
    (bounds, model)
}

fn bench_predict_single(c: &mut Criterion) {
    let (bounds, model) = trained();
    let features: FeatureVector = [2.0; FEATURE_COUNT].into();

    c.bench_function("predict one sample", |b| {
        b.iter(|| {
            let _ = model.predict(&bounds.scale(&features));
        })
    });
}

fn bench_bulk_prediction(c: &mut Criterion) {
    let (bounds, model) = trained();
    let vectors: Vec<FeatureVector> = synthetic_samples(10_000)
        .into_iter()
        .map(|s| s.features)
        .collect();

    c.bench_function("bulk predict 10k samples", |b| {
        b.iter(|| {
            for features in &vectors {
                let _ = model.predict(&bounds.scale(features));
            }
        });
    });
}

fn bench_train(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let samples = synthetic_samples(200);
    let config = AppConfig {
        dataset_path: dir.path().join("data.csv"),
        model_path: dir.path().join("model.msgpack"),
        scaler_path: dir.path().join("scaler.msgpack"),
        ..AppConfig::default()
    };
    write_reference_csv(&config.dataset_path, &samples);

    c.bench_function("train from reference csv", |b| {
        b.iter(|| {
            let _ = DiagnosisEngine::train(&config, 0.0).expect("train");
        })
    });
}

fn write_reference_csv(path: &std::path::Path, samples: &[TissueSample]) {
    use std::io::Write;
    let mut file = std::fs::File::create(path).expect("create csv");
    writeln!(
        file,
        "diagnosis,{}",
        cyto2diagnosis::FEATURE_NAMES.join(",")
    )
    .expect("write header");
    for sample in samples {
        let label = match sample.diagnosis {
            Diagnosis::Malignant => "M",
            Diagnosis::Benign => "B",
        };
        let cells: Vec<String> = sample.features.values().iter().map(|v| v.to_string()).collect();
        writeln!(file, "{label},{}", cells.join(",")).expect("write row");
    }
}

criterion_group!(
    benches,
    bench_predict_single,
    bench_bulk_prediction,
    bench_train
);
criterion_main!(benches);
