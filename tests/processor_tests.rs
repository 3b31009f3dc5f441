mod common;

use std::fs;
use std::path::Path;

use anyhow::Result;
use licenser::error::LicenserError;
use licenser::processor::{Processor, ProcessorConfig};
use licenser::templates::{DEFAULT_LICENSOR, HeaderRegistry};
use tempfile::tempdir;

fn processor(license: &str, exclude: &[&str], dry_run: bool) -> Result<Processor> {
  let header = HeaderRegistry::builtin().get(license)?.render(DEFAULT_LICENSOR);
  Ok(Processor::new(ProcessorConfig {
    exclude: exclude.iter().map(|e| e.to_string()).collect(),
    dry_run,
    ..ProcessorConfig::new(header)
  })?)
}

/// Runs `processor` over `root/testdata`, returning the report with `root`
/// stripped from every line.
fn run(processor: &Processor, root: &Path) -> (String, Result<(), LicenserError>) {
  let mut out = Vec::new();
  let result = processor.process(&root.join("testdata"), &mut out).map(|_| ());
  let prefix = format!("{}/", root.display());
  let report = String::from_utf8(out).unwrap().replace(&prefix, "");
  (report, result)
}

#[test]
fn test_dry_run_asl2_with_exclusions() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;

  let processor = processor("ASL2", &["excludedpath", "x-pack", "cloud"], true)?;
  let (report, result) = run(&processor, temp_dir.path());

  assert_eq!(
    report,
    "testdata/multilevel/doc.go: is missing the license header
testdata/multilevel/main.go: is missing the license header
testdata/multilevel/sublevel/autogen.go: is missing the license header
testdata/multilevel/sublevel/doc.go: is missing the license header
testdata/multilevel/sublevel/partial.go: is missing the license header
testdata/singlelevel/doc.go: is missing the license header
testdata/singlelevel/main.go: is missing the license header
testdata/singlelevel/wrapper.go: is missing the license header
"
  );
  assert!(matches!(result, Err(LicenserError::VerificationMismatch)));
  Ok(())
}

#[test]
fn test_dry_run_elastic_reports_everything_but_its_own_header() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;

  let processor = processor("Elastic", &[], true)?;
  let (report, result) = run(&processor, temp_dir.path());

  let lines: Vec<&str> = report.lines().collect();
  assert_eq!(lines.len(), 13);
  assert!(lines.contains(&"testdata/singlelevel/zrapper.go: is missing the license header"));
  assert!(lines.contains(&"testdata/cloud/doc.go: is missing the license header"));
  assert!(!lines.iter().any(|l| l.starts_with("testdata/x-pack/doc.go")));
  assert!(!report.contains("README.md"));
  assert!(matches!(result, Err(LicenserError::VerificationMismatch)));
  Ok(())
}

#[test]
fn test_dry_run_cloud() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;

  let processor = processor("Cloud", &["excludedpath/", "multilevel/*", "singlelevel"], true)?;
  let (report, _) = run(&processor, temp_dir.path());

  assert_eq!(
    report,
    "testdata/cloud/wrong.go: is missing the license header
testdata/x-pack/doc.go: is missing the license header
testdata/x-pack/wrong.go: is missing the license header
"
  );
  Ok(())
}

#[test]
fn test_rewrite_then_dry_run_conforms() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;

  let rewrite = processor("ASL2", &["excludedpath"], false)?;
  let (report, result) = run(&rewrite, temp_dir.path());
  assert_eq!(report, "");
  result?;

  let check = processor("ASL2", &["excludedpath"], true)?;
  let (report, result) = run(&check, temp_dir.path());
  assert_eq!(report, "");
  result?;

  // The excluded file is untouched.
  let excluded = fs::read_to_string(temp_dir.path().join("testdata/excludedpath/file.go"))?;
  assert_eq!(excluded, common::GO_BODY);
  Ok(())
}

#[test]
fn test_rewrite_replaces_stale_headers() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;

  let rewrite = processor("ASL2", &[], false)?;
  let (_, result) = run(&rewrite, temp_dir.path());
  result?;

  let expected = common::licensed_go("ASL2");
  for relative in ["x-pack/doc.go", "cloud/doc.go", "multilevel/sublevel/partial.go"] {
    let contents = fs::read_to_string(temp_dir.path().join("testdata").join(relative))?;
    assert_eq!(contents, expected, "{relative}");
  }

  // Build constraints and generated-code markers stay below the header.
  let wrapper = fs::read_to_string(temp_dir.path().join("testdata/singlelevel/wrapper.go"))?;
  assert_eq!(
    wrapper,
    format!("{}\n// +build linux\n\n{}", common::header("ASL2"), common::GO_BODY)
  );
  let autogen = fs::read_to_string(temp_dir.path().join("testdata/multilevel/sublevel/autogen.go"))?;
  assert!(autogen.starts_with(&common::header("ASL2")));
  assert!(autogen.contains("// Code generated by protoc-gen-go. DO NOT EDIT.\n"));

  let readme = fs::read_to_string(temp_dir.path().join("testdata/singlelevel/README.md"))?;
  assert_eq!(readme, "# not a go file\n");
  Ok(())
}

#[test]
fn test_rewrite_is_idempotent() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;
  let rewrite = processor("Elasticv2", &[], false)?;

  run(&rewrite, temp_dir.path()).1?;
  let first = fs::read(temp_dir.path().join("testdata/multilevel/main.go"))?;
  run(&rewrite, temp_dir.path()).1?;
  let second = fs::read(temp_dir.path().join("testdata/multilevel/main.go"))?;

  assert_eq!(first, second);
  Ok(())
}

#[test]
fn test_single_file_root() -> Result<()> {
  let temp_dir = tempdir()?;
  common::create_fixture_tree(temp_dir.path())?;
  let processor = processor("ASL2", &["x-pack", "cloud"], true)?;

  let summary = processor.process(
    &temp_dir.path().join("testdata/singlelevel/zrapper.go"),
    &mut Vec::new(),
  )?;
  assert_eq!(summary.checked, 1);
  assert_eq!(summary.conforming, 1);
  assert!(summary.all_conform());

  let mut out = Vec::new();
  let err = processor
    .process(&temp_dir.path().join("testdata/singlelevel/main.go"), &mut out)
    .unwrap_err();
  assert!(err.is_verification_mismatch());
  assert!(String::from_utf8(out)?.ends_with("testdata/singlelevel/main.go: is missing the license header\n"));
  Ok(())
}

#[test]
fn test_missing_root() -> Result<()> {
  let temp_dir = tempdir()?;
  let processor = processor("ASL2", &[], true)?;

  let err = processor
    .process(&temp_dir.path().join("does-not-exist"), &mut Vec::new())
    .unwrap_err();
  assert!(matches!(err, LicenserError::TreeStatFailed { .. }));
  assert_eq!(err.exit_code(), 2);
  Ok(())
}
