//! Runs the command line end to end against fixture files.

use std::path::PathBuf;

use clap::Parser;
use cosmosis_consistency_run::{Cli, OutputFormat, RunError, parse_parameters, run};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["cosmosis-consistency"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

/// The built-in table completes a flat universe and keeps extra keys.
#[test]
fn test_run_builtin_table() {
    let out = run(&cli(&[&fixture("flat_lcdm.yaml")])).unwrap();
    let completed = parse_parameters(&out).unwrap();

    assert_eq!(completed.len(), 14);
    assert_eq!(completed["n_s"], 0.96);
    assert!((completed["h0"] - 0.72).abs() < 1e-12);
    assert!((completed["omega_lambda"] - 0.7).abs() < 1e-12);
}

/// Contradictory inputs surface as the engine's over-specified error.
#[test]
fn test_run_reports_conflict() {
    let err = run(&cli(&[&fixture("over_specified.json")])).unwrap_err();
    let RunError::Consistency(inner) = err else {
        panic!("expected an engine error");
    };
    assert!(inner.is_over_specified());
}

/// A model file replaces the built-in table.
#[test]
fn test_run_with_model_file() {
    let model = fixture("hubble.yaml");
    let args = cli(&[&fixture("hubble_only.yaml"), "--model", &model, "--format", "json"]);
    assert_eq!(args.format, OutputFormat::Json);

    let out = run(&args).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["hubble"], 67.4);
    assert!((value["h0"].as_f64().unwrap() - 0.674).abs() < 1e-12);
}

/// With --provenance each entry names its source.
#[test]
fn test_run_with_provenance() {
    let model = fixture("hubble.yaml");
    let out = run(&cli(&[
        &fixture("hubble_only.yaml"),
        "--model",
        &model,
        "--provenance",
    ]))
    .unwrap();

    let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
    assert_eq!(value["hubble"]["source"].as_str(), Some("supplied"));
    assert_eq!(value["h0"]["source"].as_str(), Some("derived"));
    assert_eq!(value["h0"]["relation"].as_str(), Some("h0 = hubble/100"));
}

#[test]
fn test_run_missing_model() {
    let err = run(&cli(&[&fixture("hubble_only.yaml"), "--model", "/nonexistent/model.yaml"]))
        .unwrap_err();
    assert!(matches!(err, RunError::Model(_)));
}
