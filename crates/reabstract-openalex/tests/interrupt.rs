//! Batch run after a shutdown request (own test binary: the flag is process-wide)

use std::sync::atomic::Ordering;

use reabstract_core::{ProgressContext, shutdown_flag};
use reabstract_openalex::{Config, InvertedIndex, run};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn shutdown_before_start_still_finalizes_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part_000");
    let output = dir.path().join("abstracts.txt");
    let payload = InvertedIndex::from_tokens(["never", "read"]).to_json();
    let line = json!({"id": "https://openalex.org/W1", "abstract_inverted_index": payload});
    std::fs::write(&input, line.to_string()).unwrap();

    shutdown_flag().store(true, Ordering::Relaxed);
    let config = Config {
        input: Some(input),
        output: Some(output.clone()),
        ..Default::default()
    };
    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.lines, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    assert!(!dir.path().join("abstracts.txt.tmp").exists());
}
