//! CLI Integration Tests for genregistry
//!
//! Runs the built binary against configs written to temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const REGISTRY: &str = r#"
[algorithms.a]
name = "A"
header = "a.h"

[algorithms.b]
name = "B"
header = "b.h"
when = "^#define HAVE_B"

[algorithms.c]
name = "C"
header = "c.h"

[algorithms.top]
name = "Top"
header = "top.h"
slots = [["a", "b"], ["a", "c"]]

[[kinds]]
name = "Compressor"
algorithms = ["top", "c"]
"#;

const HEADER: &str = "#pragma once\n#define HAVE_B 1\n";

/// Path of the genregistry binary built for this test run
fn genregistry() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_genregistry"))
}

/// Write the registry config and header, returning their paths
fn setup(dir: &Path, registry: &str) -> (PathBuf, PathBuf) {
    let config = dir.join("registry.toml");
    let header = dir.join("config.h");
    fs::write(&config, registry).unwrap();
    fs::write(&header, HEADER).unwrap();
    (config, header)
}

fn run(config: &Path, header: &Path, out: &Path, extra: &[&str]) -> Output {
    Command::new(genregistry())
        .arg(config)
        .arg(header)
        .arg(out)
        .args(extra)
        .output()
        .expect("Failed to run genregistry")
}

// ============================================================================
// Dependency Listing
// ============================================================================

#[test]
fn test_print_deps_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (config, header) = setup(dir.path(), REGISTRY);
    let out = dir.path().join("out");

    let output = run(&config, &header, &out, &["--print-deps"]);
    assert!(
        output.status.success(),
        "genregistry failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let deps: Vec<&str> = stdout.split(';').collect();
    // root + 2*2 + 1
    assert_eq!(deps.len(), 6);
    assert_eq!(Path::new(deps[0]), out.join("root.cpp"));
    assert!(!stdout.ends_with('\n'));
    assert!(!out.exists());
}

#[test]
fn test_generate_files() {
    let dir = tempfile::tempdir().unwrap();
    let (config, header) = setup(dir.path(), REGISTRY);
    let out = dir.path().join("out");

    let output = run(&config, &header, &out, &["--generate-files", "--print-deps"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for dep in stdout.split(';') {
        assert!(Path::new(dep).exists(), "missing {dep}");
    }
    let root = fs::read_to_string(out.join("root.cpp")).unwrap();
    assert!(root.contains("with_all_from(register_compressors, \"compressor\")"));
}

#[test]
fn test_grouping_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (config, header) = setup(dir.path(), REGISTRY);
    let out = dir.path().join("out");

    let output = run(&config, &header, &out, &["--print-deps", "--group", "2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let deps: Vec<&str> = stdout.split(';').collect();
    assert_eq!(deps.len(), 3);
    assert!(deps[1..].iter().all(|d| d.contains("group_")));
}

#[test]
fn test_print_trace() {
    let dir = tempfile::tempdir().unwrap();
    let (config, header) = setup(dir.path(), REGISTRY);

    let output = run(&config, &header, &dir.path().join("out"), &["--print"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[\"Top\", \"B\", \"C\"]"));
    assert!(stdout.contains("r.register_algorithm<Top<B,C>>();"));
}

// ============================================================================
// Error Handling
// ============================================================================

#[test]
fn test_empty_slot_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    // `b` is disabled by the header, leaving the slot empty
    let registry = r#"
[algorithms.b]
name = "B"
header = "b.h"
when = "NOT_DEFINED_ANYWHERE"

[algorithms.top]
name = "Top"
header = "top.h"
slots = [["b"]]

[[kinds]]
name = "Compressor"
algorithms = ["top"]
"#;
    let (config, header) = setup(dir.path(), registry);
    let out = dir.path().join("out");

    let output = run(&config, &header, &out, &["--generate-files"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no alternatives"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[test]
fn test_zero_groups_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (config, header) = setup(dir.path(), REGISTRY);

    let output = run(&config, &header, &dir.path().join("out"), &["--group", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let (_, header) = setup(dir.path(), REGISTRY);

    let output = run(
        &dir.path().join("nope.toml"),
        &header,
        &dir.path().join("out"),
        &[],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config file not found"));
}
