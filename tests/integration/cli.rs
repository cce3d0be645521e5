//! End-to-end tests of the `wordtally` binary.
//!
//! The harness only sees the process: stdin in, exit status and stderr out,
//! nothing on stdout. These tests pin that contract down.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::common::{corpus_of, raw_record, Project};
use wordtally::{EXIT_CORRUPT, EXIT_IO};

const BIN: &str = env!("CARGO_BIN_EXE_wordtally");

fn run(dir: &Path, args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .current_dir(dir)
        .env_remove("WORDTALLY_ROOT")
        .env_remove("WORDTALLY_MARKER")
        .env_remove("WORDTALLY_CORPUS")
        .env_remove("WORDTALLY_FORMAT")
        .env_remove("WORDTALLY_ON_TRUNCATION")
        .env_remove("WORDTALLY_SKIPPED_STATUS")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn wordtally");
    // Skipped runs exit without reading stdin, so a broken pipe is expected
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input);
    }
    child.wait_with_output().expect("wait for wordtally")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_record_writes_nothing_to_stdout() {
    let project = Project::new();
    let output = run(project.root(), &[], b"abc");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read(project.corpus_path()).unwrap(), raw_record(b"abc"));
}

#[test]
fn test_repeated_runs_accumulate() {
    let project = Project::new();
    let inputs: [&[u8]; 3] = [b"abc", b"ab", b"abc"];
    for input in inputs {
        let output = run(project.root(), &["record"], input);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }
    assert_eq!(project.read_corpus(), corpus_of(&[b"ab", b"abc", b"abc"]));
}

#[test]
fn test_large_binary_input() {
    let project = Project::new();
    let input: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    let output = run(project.root(), &[], &input);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(project.read_corpus().multiplicity(&input), 1);
}

#[test]
fn test_wrong_directory_is_skipped_with_success() {
    let project = Project::without_marker();
    let output = run(project.root(), &[], b"abc");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("Please run this program from the root of the project"));
    assert!(!project.root().join("resources").exists());
}

#[test]
fn test_skipped_status_override() {
    let project = Project::without_marker();
    let output = run(project.root(), &["--skipped-status", "3"], b"abc");

    assert_eq!(output.status.code(), Some(3));
    assert!(!project.corpus_path().exists());
}

#[test]
fn test_corrupt_corpus_exit_status() {
    let project = Project::new();
    let mut bytes = raw_record(b"abc");
    bytes.pop();
    project.write_raw(&bytes);

    let output = run(project.root(), &[], b"new");

    assert_eq!(output.status.code(), Some(EXIT_CORRUPT));
    assert!(stderr(&output).contains("corrupt corpus"));
    assert_eq!(fs::read(project.corpus_path()).unwrap(), bytes);
}

#[test]
fn test_discarded_tail_warns_once() {
    let project = Project::new();
    let mut bytes = raw_record(b"keep");
    bytes.extend_from_slice(&[5, 0, 0]);
    project.write_raw(&bytes);

    let output = run(project.root(), &["--on-truncation", "discard"], b"new");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stderr(&output);
    let warnings: Vec<&str> = text.lines().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "stderr: {}", text);
    assert!(warnings[0].contains("discarding 3 trailing bytes"));
    assert_eq!(project.read_corpus(), corpus_of(&[b"keep", b"new"]));
}

#[cfg(unix)]
#[test]
fn test_unwritable_corpus_dir_exit_status() {
    use std::os::unix::fs::PermissionsExt;

    let project = Project::new();
    project.write_raw(&raw_record(b"abc"));
    let dir = project.corpus_path().parent().unwrap().to_path_buf();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores permission bits; only assert when the restriction holds
    let probe = fs::write(dir.join("probe"), b"");
    let output = run(project.root(), &[], b"new");
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

    if probe.is_err() {
        assert_eq!(output.status.code(), Some(EXIT_IO));
        assert_eq!(fs::read(project.corpus_path()).unwrap(), raw_record(b"abc"));
    }
}

#[test]
fn test_root_option_from_elsewhere() {
    let project = Project::new();
    let elsewhere = Project::without_marker();
    let root = project.root().to_str().unwrap();

    let output = run(elsewhere.root(), &["--root", root], b"remote");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(project.read_corpus(), corpus_of(&[b"remote"]));
}

#[test]
fn test_report_lists_rarest_first() {
    let project = Project::new();
    let inputs: [&[u8]; 4] = [b"x", b"y", b"y", b"z\n"];
    for input in inputs {
        run(project.root(), &[], input);
    }

    let output = run(project.root(), &["report"], b"");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "1: x");
    assert_eq!(lines[1], "1: z\\n");
    assert_eq!(lines[2], "2: y");
    assert_eq!(lines.last().unwrap(), &"4 words, 3 distinct, 1 duplicates");
}

#[test]
fn test_report_json_and_limit() {
    let project = Project::new();
    let inputs: [&[u8]; 6] = [b"a", b"b", b"b", b"c", b"c", b"c"];
    for input in inputs {
        run(project.root(), &[], input);
    }

    let output = run(project.root(), &["report", "--json", "--limit", "2"], b"");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total"], 6);
    assert_eq!(json["distinct"], 3);
    let words = json["words"].as_array().unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0]["word"], "b");
    assert_eq!(words[1]["word"], "c");
    assert_eq!(words[1]["count"], 3);
}

#[test]
fn test_report_does_not_create_corpus() {
    let project = Project::new();
    let output = run(project.root(), &["report"], b"");

    assert!(output.status.success());
    assert!(!project.corpus_path().exists());
}

#[test]
fn test_inspect_json() {
    let project = Project::new();
    run(project.root(), &["--format", "framed"], b"abc");
    run(project.root(), &[], b"abc");

    let output = run(project.root(), &["inspect", "--json"], b"");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "framed");
    assert_eq!(json["records"], 2);
    assert_eq!(json["distinct"], 1);
    assert_eq!(json["longest"], 3);
    assert_eq!(json["checksum_verified"], true);
    // header + 2 * (prefix + "abc") + footer
    assert_eq!(json["size"], 8 + 2 * 11 + 8);
}

#[test]
fn test_inspect_missing_corpus_fails() {
    let project = Project::new();
    let output = run(project.root(), &["inspect"], b"");
    assert_eq!(output.status.code(), Some(1));
    assert!(!project.corpus_path().exists());
}
