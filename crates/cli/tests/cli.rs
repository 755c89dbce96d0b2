//! Command-line contract tests for `docrank`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn docrank() -> Command {
    Command::cargo_bin("docrank").expect("binary built")
}

fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("corpus.jsonl");
    let lines = [
        r#"{"id": "rust", "title": "Rust", "text": "systems programming with ownership and borrowing"}"#,
        r#"{"id": "python", "text": "dynamic scripting language with a large standard library"}"#,
        r#"{"id": "haskell", "text": "lazy purely functional programming"}"#,
        r#"{"id": "sql", "text": "declarative queries over relational tables"}"#,
    ];
    fs::write(&path, lines.join("\n")).expect("write corpus");
    path
}

fn fit(dir: &Path) -> std::path::PathBuf {
    let corpus = write_corpus(dir);
    let index = dir.join("out").join("tfidf.idx");
    docrank()
        .args(["fit", "--corpus"])
        .arg(&corpus)
        .arg("--index")
        .arg(&index)
        .args(["--hash-size", "65536", "--batch-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 4 documents"));
    index
}

#[test]
fn fit_then_query_prints_ranked_lines() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index = fit(tmp.path());
    assert!(index.exists());

    docrank()
        .arg("query")
        .arg("--index")
        .arg(&index)
        .args(["-n", "2", "ownership", "borrowing"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rust\t"));
}

#[test]
fn query_json_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index = fit(tmp.path());

    let output = docrank()
        .arg("query")
        .arg("--index")
        .arg(&index)
        .args(["--json", "relational tables"])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["question"], "relational tables");
    assert_eq!(value["doc_ids"][0], "sql");
    assert_eq!(value["scores"].as_array().map(Vec::len), Some(1));
}

#[test]
fn query_without_matches_prints_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index = fit(tmp.path());

    docrank()
        .arg("query")
        .arg("--index")
        .arg(&index)
        .arg("zzzz")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn inspect_reports_index_statistics() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index = fit(tmp.path());

    docrank()
        .arg("inspect")
        .arg("--index")
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"documents\": 4"))
        .stdout(predicate::str::contains("\"hash_size\": 65536"));
}

#[test]
fn missing_index_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index = tmp.path().join("absent.idx");

    docrank()
        .arg("query")
        .arg("--index")
        .arg(&index)
        .arg("anything")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no index found"));
}

#[test]
fn invalid_ngram_range_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let corpus = write_corpus(tmp.path());

    docrank()
        .args(["fit", "--corpus"])
        .arg(&corpus)
        .arg("--index")
        .arg(tmp.path().join("tfidf.idx"))
        .args(["--ngram-min", "3", "--ngram-max", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid ngram_range"));
}
