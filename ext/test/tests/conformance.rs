//! Conformance tests that run YAML fixtures against pathwright
//!
//! Run with: cargo test -p pathwright-test --test conformance
//!
//! `fixtures` is a default feature; these tests are skipped under
//! `--no-default-features`.

#![cfg(feature = "fixtures")]

use pathwright_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_chaining() {
    run_fixture_file("01_chaining.yaml");
}

#[test]
fn test_setters() {
    run_fixture_file("02_setters.yaml");
}

#[test]
fn test_render() {
    run_fixture_file("03_render.yaml");
}

#[test]
fn test_methods() {
    run_fixture_file("04_methods.yaml");
}

#[test]
fn test_grammar() {
    run_fixture_file("05_grammar.yaml");
}

#[test]
fn every_fixture_file_is_wired() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_chaining.yaml",
            "02_setters.yaml",
            "03_render.yaml",
            "04_methods.yaml",
            "05_grammar.yaml"
        ]
    );
}

#[test]
fn failing_expectation_is_reported() {
    let fixture = Fixture::from_yaml(
        r#"
name: wrong_expectation
routes:
  /wp/v2/tags: { namespace: wp/v2, methods: [GET] }
cases:
  - name: wrong
    resource: tags
    expect: categories
"#,
    )
    .unwrap();
    let results = fixture.run();
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(results[0].actual, "tags");
}
