use super::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, AtomicOrdering::SeqCst);
    dir.push(format!(
        "affinity_eval_checkpoint_{}_{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"weights").unwrap();
}

fn names(records: &[CheckpointRecord]) -> Vec<String> {
    records.iter().map(|r| r.file_name()).collect()
}

#[test]
fn test_list_skips_aliases_and_foreign_files() {
    let dir = make_temp_dir();
    for name in [
        "checkpoint1.pt",
        "checkpoint10.pt",
        "checkpoint2.pt",
        "checkpoint_best.pt",
        "checkpoint_last.pt",
        "checkpoint0.pt",
        "checkpoint3.txt",
        "checkpoint2_test.csv",
        "notes.md",
    ] {
        touch(&dir, name);
    }
    fs::create_dir_all(dir.join("checkpoint7.pt")).unwrap();

    let records = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap();
    assert_eq!(
        names(&records),
        vec!["checkpoint1.pt", "checkpoint10.pt", "checkpoint2.pt"]
    );
    assert_eq!(records[1].epoch.as_str(), "10");
}

#[test]
fn test_epoch_stops_at_first_dot() {
    let dir = make_temp_dir();
    touch(&dir, "checkpoint12.fp32.pt");
    let records = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].epoch.as_str(), "12");
}

#[test]
fn test_list_empty_directory_is_not_an_error() {
    let dir = make_temp_dir();
    let records = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_list_missing_directory() {
    let dir = make_temp_dir().join("does_not_exist");
    let err = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap_err();
    assert!(matches!(err, EvalError::NotFound(p) if p == dir));
}

#[test]
fn test_custom_pattern() {
    let dir = make_temp_dir();
    touch(&dir, "model5.ckpt");
    touch(&dir, "checkpoint5.pt");
    let pattern = CheckpointPattern {
        prefix: "model".to_string(),
        extension: "ckpt".to_string(),
    };
    let records = list_checkpoints(&dir, &pattern).unwrap();
    assert_eq!(names(&records), vec!["model5.ckpt"]);
}

#[test]
fn test_select_top_n_lexical_quirk() {
    let dir = make_temp_dir();
    for name in ["checkpoint1.pt", "checkpoint2.pt", "checkpoint10.pt"] {
        touch(&dir, name);
    }
    let records = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap();
    let top = select_top_n(&records, 2, EpochOrdering::Lexical, true);
    assert_eq!(names(&top), vec!["checkpoint2.pt", "checkpoint10.pt"]);
}

#[test]
fn test_select_top_n_numeric() {
    let records = ["1", "2", "10", "9"]
        .iter()
        .map(|e| CheckpointRecord {
            epoch: EpochKey::new(*e),
            path: PathBuf::from(format!("checkpoint{e}.pt")),
        })
        .collect::<Vec<_>>();
    let top = select_top_n(&records, 3, EpochOrdering::Numeric, true);
    assert_eq!(
        names(&top),
        vec!["checkpoint10.pt", "checkpoint9.pt", "checkpoint2.pt"]
    );
    let asc = select_top_n(&records, 10, EpochOrdering::Numeric, false);
    assert_eq!(asc.len(), 4);
    assert_eq!(asc[0].epoch.as_str(), "1");
}

#[test]
fn test_select_top_n_ties_keep_scan_order() {
    let records = vec![
        CheckpointRecord {
            epoch: EpochKey::new("3"),
            path: PathBuf::from("a/checkpoint3.pt"),
        },
        CheckpointRecord {
            epoch: EpochKey::new("3"),
            path: PathBuf::from("b/checkpoint3.pt"),
        },
    ];
    let top = select_top_n(&records, 2, EpochOrdering::Lexical, true);
    assert_eq!(top[0].path, PathBuf::from("a/checkpoint3.pt"));
    assert_eq!(top[1].path, PathBuf::from("b/checkpoint3.pt"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_name_keeps_real_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = make_temp_dir();
    let raw = OsStr::from_bytes(b"checkpoint5.\xff.pt");
    fs::write(dir.join(raw), b"weights").unwrap();
    let records = list_checkpoints(&dir, &CheckpointPattern::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].epoch.as_str(), "5");
    assert_eq!(records[0].path, dir.join(raw));
    assert!(records[0].path.is_file());
}
