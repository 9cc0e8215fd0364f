//! File movement through an in-process experiment store.

use proptest::prelude::*;
use qrelay_aqueduct::{
    AqueductError, InMemoryStore, ShotBit, collect_counts, fetch, read_shots,
    save_sequence_and_upload, upload,
};
use qrelay_hal::Counts;
use tempfile::TempDir;

fn store_with_circuit() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.add_experiment("EXP-42", "bell pair");
    store
        .put_file("EXP-42", "bell.qasm", "OPENQASM 2.0;\nqreg q[2];\n")
        .unwrap();
    store
}

#[tokio::test]
async fn test_fetch_writes_into_directory() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();

    let path = fetch(&store, "EXP-42", "bell.qasm", dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("bell.qasm"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("OPENQASM 2.0;"));
}

#[tokio::test]
async fn test_fetch_unknown_experiment_or_file() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();

    let err = fetch(&store, "EXP-0", "bell.qasm", dir.path()).await.unwrap_err();
    assert!(matches!(err, AqueductError::NotFound(ref m) if m.contains("EXP-0")));

    let err = fetch(&store, "EXP-42", "ghz.qasm", dir.path()).await.unwrap_err();
    assert!(matches!(err, AqueductError::NotFound(ref m) if m.contains("ghz.qasm")));
    assert!(!dir.path().join("ghz.qasm").exists());
}

#[tokio::test]
async fn test_upload_uses_base_name() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("notes.txt");
    std::fs::write(&local, "hello").unwrap();

    upload(&store, "EXP-42", &local).await.unwrap();
    assert_eq!(store.file("EXP-42", "notes.txt").unwrap(), b"hello");
    assert_eq!(store.file_names("EXP-42"), vec!["bell.qasm", "notes.txt"]);
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();
    let err = upload(&store, "EXP-42", &dir.path().join("absent.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, AqueductError::Io(_)));
}

#[tokio::test]
async fn test_save_and_upload_shots() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();
    let memory = vec!["00".to_string(), "11".to_string(), "11".to_string()];

    let path = save_sequence_and_upload(
        &store,
        memory.iter().map(|s| s.chars()),
        "EXP-42",
        "result.txt",
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "00\n11\n11\n");
    assert_eq!(store.file("EXP-42", "result.txt").unwrap(), b"00\n11\n11\n");

    let counts = collect_counts(&path).unwrap();
    assert_eq!(counts.get("11"), 2);
    assert_eq!(counts.get("00"), 1);
    assert_eq!(counts.total_shots(), 3);
}

#[tokio::test]
async fn test_bad_value_writes_nothing() {
    let store = store_with_circuit();
    let dir = TempDir::new().unwrap();

    let err = save_sequence_and_upload(
        &store,
        [vec![0_i32, 1], vec![1, -1]],
        "EXP-42",
        "result.txt",
        dir.path(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AqueductError::Format(_)));
    assert!(!dir.path().join("result.txt").exists());
    assert!(store.file("EXP-42", "result.txt").is_none());
}

#[tokio::test]
async fn test_save_to_unknown_experiment_keeps_local_file() {
    let store = InMemoryStore::new();
    let dir = TempDir::new().unwrap();

    let err = save_sequence_and_upload(&store, [[1_u8]], "EXP-7", "r.txt", dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, AqueductError::NotFound(_)));
    assert!(dir.path().join("r.txt").exists());
}

#[test]
fn test_read_shots_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shots.txt");
    std::fs::write(&path, "01\n\n  10 \n01\n").unwrap();

    assert_eq!(read_shots(&path).unwrap(), vec!["01", "10", "01"]);
    let counts = collect_counts(&path).unwrap();
    assert_eq!(counts.get("01"), 2);
    assert_eq!(counts.len(), 2);
}

#[tokio::test]
async fn test_zero_width_outcomes_are_not_read_back() {
    let store = InMemoryStore::new();
    store.add_experiment("EXP-1", "");
    let dir = TempDir::new().unwrap();

    let rows = vec![vec![1_u8], vec![], vec![0]];
    let path = save_sequence_and_upload(&store, &rows, "EXP-1", "result.txt", dir.path())
        .await
        .unwrap();

    assert_eq!(store.file("EXP-1", "result.txt").unwrap(), b"1\n\n0\n");
    assert_eq!(read_shots(&path).unwrap(), vec!["1", "0"]);
}

fn save_and_read<B: ShotBit>(rows: &[Vec<B>]) -> (Vec<String>, Counts) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let store = InMemoryStore::new();
    store.add_experiment("EXP-1", "");
    let dir = TempDir::new().unwrap();

    let path = runtime
        .block_on(save_sequence_and_upload(
            &store,
            rows,
            "EXP-1",
            "result.txt",
            dir.path(),
        ))
        .unwrap();
    (read_shots(&path).unwrap(), collect_counts(&path).unwrap())
}

fn rows<T: Arbitrary + Clone>() -> impl Strategy<Value = Vec<Vec<T>>> {
    (1_usize..8).prop_flat_map(|width| {
        proptest::collection::vec(proptest::collection::vec(any::<T>(), width), 0..40)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_saved_bool_shots_read_back_in_order(rows in rows::<bool>()) {
        let expected: Vec<String> = rows
            .iter()
            .map(|row| row.iter().map(|&b| if b { '1' } else { '0' }).collect())
            .collect();

        let (shots, counts) = save_and_read(&rows);
        prop_assert_eq!(&shots, &expected);
        prop_assert_eq!(counts, expected.iter().map(String::as_str).collect::<Counts>());
    }

    #[test]
    fn prop_saved_digit_shots_read_back_in_order(
        rows in rows::<u8>().prop_map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(|d| d % 10).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        })
    ) {
        let expected: Vec<String> = rows
            .iter()
            .map(|row| row.iter().map(|d| char::from(b'0' + d)).collect())
            .collect();

        let (shots, _) = save_and_read(&rows);
        prop_assert_eq!(shots, expected);
    }

    #[test]
    fn prop_saved_char_shots_read_back_in_order(
        memory in (1_usize..8).prop_flat_map(|width| {
            proptest::collection::vec(proptest::string::string_regex(&format!("[01]{{{width}}}")).unwrap(), 0..40)
        })
    ) {
        let (shots, _) = save_and_read(
            &memory.iter().map(|s| s.chars().collect::<Vec<_>>()).collect::<Vec<_>>(),
        );
        prop_assert_eq!(shots, memory);
    }
}
