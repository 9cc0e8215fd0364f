//! Full runs against an in-process experiment store.

use std::time::Duration;

use qrelay_adapter_sim::builtin_registry;
use qrelay_aqueduct::{AqueductError, InMemoryStore};
use qrelay_cli::commands::{plot, simulate};
use qrelay_cli::{ConfigError, PlotConfig, RunConfig, RunError, SimulateArgs};
use qrelay_hal::HalError;
use qrelay_qasm::{ParseError, QasmVersion};

const BELL_QASM2: &str = r#"
OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0], q[1];
measure q -> c;
"#;

const FLIP_FIRST_QASM2: &str = r#"
OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
x q[0];
measure q -> c;
"#;

const FLIP_FIRST_QASM3: &str = r#"
OPENQASM 3.0;
include "stdgates.inc";
qubit[2] q;
bit[2] c;
x q[0];
c = measure q;
"#;

fn store(qasm: &str) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.add_experiment("EXP-1", "relay test");
    store.put_file("EXP-1", "circuit.qasm", qasm).unwrap();
    store
}

fn config(backend: &str, shots: u32, memory: bool) -> RunConfig {
    RunConfig {
        aqueduct_url: "http://localhost:8000".to_string(),
        experiment: "EXP-1".to_string(),
        qasm_file: "circuit.qasm".to_string(),
        result_file: "result.txt".to_string(),
        simulator_type: backend.to_string(),
        qasm_version: QasmVersion::V2,
        shots,
        memory,
        timeout: Duration::from_secs(10),
    }
}

fn uploaded_lines(store: &InMemoryStore, name: &str) -> Vec<String> {
    let bytes = store.file("EXP-1", name).expect("file was not uploaded");
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_bell_run_uploads_every_shot() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();

    let output = simulate::run(&config("AerSimulator", 100, true), &store, &registry)
        .await
        .unwrap();

    let lines = uploaded_lines(&store, "result.txt");
    assert_eq!(lines.len(), 100);
    for line in &lines {
        assert_eq!(line.len(), 2);
        assert!(line.chars().all(|c| c == '0' || c == '1'));
        assert!(line == "00" || line == "11", "uncorrelated outcome {line}");
    }
    assert_eq!(lines, output.memory);
    assert_eq!(output.counts.total_shots(), 100);
}

#[tokio::test]
async fn test_without_memory_nothing_is_uploaded() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();

    let output = simulate::run(&config("QasmSimulator", 50, false), &store, &registry)
        .await
        .unwrap();

    assert!(output.memory.is_empty());
    assert_eq!(output.counts.total_shots(), 50);
    assert_eq!(store.file_names("EXP-1"), vec!["circuit.qasm"]);
}

#[tokio::test]
async fn test_outcomes_are_little_endian() {
    let store = store(FLIP_FIRST_QASM2);
    let registry = builtin_registry().unwrap();

    let output = simulate::run(&config("AerSimulator", 20, true), &store, &registry)
        .await
        .unwrap();

    assert_eq!(output.counts.get("10"), 20);
    assert!(uploaded_lines(&store, "result.txt").iter().all(|l| l == "10"));
}

#[tokio::test]
async fn test_qasm3_run() {
    let store = store(FLIP_FIRST_QASM3);
    let registry = builtin_registry().unwrap();
    let mut config = config("StatevectorSimulator", 10, false);
    config.qasm_version = QasmVersion::V3;

    let output = simulate::run(&config, &store, &registry).await.unwrap();
    assert_eq!(output.counts.get("10"), 10);
}

#[tokio::test]
async fn test_dialect_must_match_header() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();
    let mut config = config("AerSimulator", 10, true);
    config.qasm_version = QasmVersion::V3;

    let err = simulate::run(&config, &store, &registry).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::Parse(ParseError::VersionMismatch { .. }))
    ));
    assert!(store.file("EXP-1", "result.txt").is_none());
}

#[tokio::test]
async fn test_fake_device_run() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();

    let output = simulate::run(&config("Fake5QV1", 200, true), &store, &registry)
        .await
        .unwrap();

    let lines = uploaded_lines(&store, "result.txt");
    assert_eq!(lines.len(), 200);
    assert!(lines.iter().all(|l| l.len() == 2));
    // Noise is small; the correlated outcomes still dominate.
    let correlated = output.counts.get("00") + output.counts.get("11");
    assert!(correlated > 150, "correlated {correlated}");
}

#[tokio::test]
async fn test_unknown_backend_uploads_nothing() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();

    let err = simulate::run(&config("NoSuchSimulator", 10, true), &store, &registry)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::Backend(HalError::BackendNotFound(name))) if name == "NoSuchSimulator"
    ));
    assert!(store.file("EXP-1", "result.txt").is_none());
}

#[test]
fn test_bad_shot_counts_rejected_by_config() {
    for shots in [0, -3] {
        let args = SimulateArgs {
            aqueduct_url: Some("http://localhost:8000".into()),
            experiment: Some("EXP-1".into()),
            qasm_file: Some("circuit.qasm".into()),
            result_file: Some("result.txt".into()),
            simulator_type: "AerSimulator".into(),
            qasm_version: "2".into(),
            shots,
            memory: true,
            timeout: 10,
        };
        assert!(matches!(
            RunConfig::try_from(args),
            Err(ConfigError::Invalid { key: "shots", .. })
        ));
    }
}

#[tokio::test]
async fn test_zero_shots_rejected_by_runner() {
    let store = store(BELL_QASM2);
    let registry = builtin_registry().unwrap();

    let err = simulate::run(&config("AerSimulator", 0, true), &store, &registry)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::InvalidShots(0))
    ));
    assert!(store.file("EXP-1", "result.txt").is_none());
}

#[tokio::test]
async fn test_missing_circuit_file() {
    let store = InMemoryStore::new();
    store.add_experiment("EXP-1", "");
    let registry = builtin_registry().unwrap();

    let err = simulate::run(&config("AerSimulator", 10, true), &store, &registry)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AqueductError>(),
        Some(AqueductError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_plot_uploads_histogram() {
    let store = InMemoryStore::new();
    store.add_experiment("EXP-1", "");
    store
        .put_file("EXP-1", "result.txt", "00\n11\n11\n\n00\n11\n")
        .unwrap();

    let config = PlotConfig {
        aqueduct_url: "http://localhost:8000".to_string(),
        experiment: "EXP-1".to_string(),
        shots_file: "result.txt".to_string(),
        image_file: "histogram.svg".to_string(),
        width: 640,
        height: 480,
        timeout: Duration::from_secs(2),
    };

    let counts = plot::run(&config, &store).await.unwrap();
    assert_eq!(counts.get("11"), 3);
    assert_eq!(counts.get("00"), 2);

    let svg = String::from_utf8(store.file("EXP-1", "histogram.svg").unwrap()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"width="640" height="480""#));
}
