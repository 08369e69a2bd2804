use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use cyto2diagnosis::{
    AppConfig, DiagnosisEngine, FEATURE_COUNT, FeatureVector, HistoryRecorder, batch,
    load_reference_csv,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load_or_default(Path::new("cyto2diagnosis.toml"))?;
    let engine = DiagnosisEngine::load_or_train_if_stale(&config, 0.2)
        .context("preparing classifier artifacts")?;

    let samples = load_reference_csv(&config.dataset_path)?;
    println!(
        "✅ Accuracy on reference dataset: {:.2}%",
        engine.evaluate_on(&samples) * 100.0
    );
    println!("Most informative measurements (by weight):");
    for (name, weight) in engine.model().top_weights(10) {
        println!("{name:>25} | weight: {weight:+.3}");
    }

    // A file argument means batch mode: score the upload and exit.
    if let Some(input) = std::env::args().nth(1) {
        let scored = batch::predict_file(&engine, Path::new(&input), &config.batch_output_path)?;
        println!(
            "💾 Scored {} rows, results saved to {:?}",
            scored.len(),
            config.batch_output_path
        );
        return Ok(());
    }

    let mut history =
        HistoryRecorder::open(&config.history_path).context("opening prediction history")?;

    loop {
        print!("Enter {FEATURE_COUNT} comma-separated measurements (or 'exit'): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            break;
        }

        let features = match parse_measurements(line) {
            Ok(features) => features,
            Err(message) => {
                eprintln!("⚠️  {message}");
                continue;
            }
        };

        let prediction = engine.predict(&features);
        history.record(&features, &prediction)?;
        println!(
            "The cell cluster is {} (P_benign = {:.2}%, P_malignant = {:.2}%)",
            prediction.diagnosis.as_str(),
            prediction.probability_benign * 100.0,
            prediction.probability_malignant * 100.0
        );
    }
    Ok(())
}

fn parse_measurements(line: &str) -> Result<FeatureVector, String> {
    let values: Result<Vec<f64>, _> = line.split(',').map(|v| v.trim().parse::<f64>()).collect();
    let values = values.map_err(|e| e.to_string())?;
    FeatureVector::from_ordered(values).map_err(|e| e.to_string())
}
