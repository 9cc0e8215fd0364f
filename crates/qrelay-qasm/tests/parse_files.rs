//! Loading circuit files from disk in both dialects.

use std::io::Write;

use qrelay_ir::{ClbitId, QubitId};
use qrelay_qasm::{ParseError, QasmVersion, parse, parse_file};
use tempfile::NamedTempFile;

fn write_source(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_file_qasm2() {
    let file = write_source(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q -> c;\n",
    );
    let circuit = parse_file(file.path(), QasmVersion::V2).unwrap();
    assert_eq!(circuit.num_qubits(), 2);
    assert_eq!(circuit.count_ops()["measure"], 2);
}

#[test]
fn test_parse_file_qasm3() {
    let file = write_source(
        "OPENQASM 3;\ninclude \"stdgates.inc\";\nqubit[3] q;\nbit[3] c;\nh q[0];\ncx q[0], q[1];\ncx q[1], q[2];\nc = measure q;\n",
    );
    let circuit = parse_file(file.path(), QasmVersion::V3).unwrap();
    assert_eq!(circuit.num_clbits(), 3);
    let last = circuit.instructions().last().unwrap();
    assert_eq!(last.qubits, vec![QubitId(2)]);
    assert_eq!(last.clbits, vec![ClbitId(2)]);
}

#[test]
fn test_parse_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(dir.path().join("absent.qasm"), QasmVersion::V2).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("absent.qasm"));
}

#[test]
fn test_dialect_is_enforced_both_ways() {
    let v3_source = "OPENQASM 3.0;\nqubit[1] q;\nx q[0];\n";
    assert!(matches!(
        parse(v3_source, QasmVersion::V2),
        Err(ParseError::VersionMismatch { .. })
    ));
    assert!(parse(v3_source, QasmVersion::V3).is_ok());

    let v2_source = "OPENQASM 2.0;\nqreg q[1];\nx q[0];\n";
    assert!(matches!(
        parse(v2_source, QasmVersion::V3),
        Err(ParseError::VersionMismatch { .. })
    ));
}

#[test]
fn test_legacy_registers_accepted_in_qasm3() {
    let source = "OPENQASM 3.0;\nqreg q[2];\ncreg c[2];\nmeasure q -> c;\n";
    let circuit = parse(source, QasmVersion::V3).unwrap();
    assert_eq!(circuit.num_ops(), 2);
}

#[test]
fn test_lexer_error_reports_line() {
    let source = "OPENQASM 2.0;\nqreg q[1];\nx q[0] @;\n";
    let err = parse(source, QasmVersion::V2).unwrap_err();
    assert!(matches!(err, ParseError::LexerError { line: 3, .. }));
}

#[test]
fn test_comments_are_ignored() {
    let source = "// header comment\nOPENQASM 2.0;\n/* block\ncomment */\nqreg q[1];\nh q[0]; // trailing\n";
    let circuit = parse(source, QasmVersion::V2).unwrap();
    assert_eq!(circuit.num_ops(), 1);
}
