//! Pipeline behavior tests with in-process stub builders
//!
//! Running the pipeline against stub builders makes filtering, hook
//! fatality, version persistence, and scratch cleanup observable without
//! the external packaging tools.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use repack::builders::{Builder, BuilderRegistry};
use repack::core::config::{self, Configuration, ResolveOptions};
use repack::core::pipeline::{BuildReport, Pipeline};
use repack::core::spec::{PackageEntry, Spec};
use repack::error::{BuilderError, FilesystemError, HookError, RepackError};
use tempfile::TempDir;

/// Builder that writes a plain file as its artifact
struct StubBuilder {
    id: &'static str,
    fail_build: bool,
    trees: Arc<Mutex<Vec<PathBuf>>>,
}

impl StubBuilder {
    fn new(id: &'static str) -> Self {
        Self {
            id,
            fail_build: false,
            trees: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(id: &'static str) -> Self {
        Self {
            fail_build: true,
            ..Self::new(id)
        }
    }

    fn trees(&self) -> Arc<Mutex<Vec<PathBuf>>> {
        Arc::clone(&self.trees)
    }
}

impl Builder for StubBuilder {
    fn id(&self) -> &'static str {
        self.id
    }

    fn filenamegen(
        &self,
        spec: &Spec,
        _entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<String, BuilderError> {
        Ok(format!("{}_{}.{}", spec.name, config.version, self.id))
    }

    fn tree(
        &self,
        _spec: &Spec,
        _entry: &PackageEntry,
        _config: &Configuration,
    ) -> Result<PathBuf, BuilderError> {
        let dir = tempfile::Builder::new()
            .prefix("stub-")
            .tempdir()
            .map_err(|e| {
                BuilderError::Filesystem(FilesystemError::Scratch {
                    error: e.to_string(),
                })
            })?
            .into_path();
        self.trees.lock().unwrap().push(dir.clone());
        Ok(dir)
    }

    fn build(
        &self,
        _build_dir: &Path,
        filename: &str,
        config: &Configuration,
    ) -> Result<(), BuilderError> {
        if self.fail_build {
            return Err(BuilderError::ToolFailed {
                tool: "stub".to_string(),
                code: 1,
                filename: filename.to_string(),
            });
        }
        std::fs::write(config.output_dir.join(filename), b"artifact").map_err(|e| {
            BuilderError::Render {
                what: "artifact".to_string(),
                path: config.output_dir.join(filename),
                error: e.to_string(),
            }
        })?;
        Ok(())
    }
}

fn registry_of(builders: Vec<StubBuilder>) -> BuilderRegistry {
    let mut registry = BuilderRegistry::new();
    for builder in builders {
        registry.register(Box::new(builder));
    }
    registry
}

fn run_pipeline(
    spec: &Spec,
    registry: &BuilderRegistry,
    opts: &ResolveOptions,
) -> Result<BuildReport, RepackError> {
    let config = config::resolve(spec, registry, opts).expect("configuration resolves");
    Pipeline::new(spec, &config, registry).run()
}

fn options_into(dir: &TempDir) -> ResolveOptions {
    ResolveOptions {
        output_dir: dir.path().to_path_buf(),
        ..ResolveOptions::default()
    }
}

#[test]
fn test_run_builds_every_entry_and_records_versions() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-e2e
version: "2.3.1"
release: "1"
packages:
  - package: formata
  - package: formatb
pkgbuild:
  version-db: "{}"
"#,
        out.path().join("versions").display()
    ))
    .unwrap();

    let stub_a = StubBuilder::new("formata");
    let stub_b = StubBuilder::new("formatb");
    let trees_a = stub_a.trees();
    let trees_b = stub_b.trees();
    let registry = registry_of(vec![stub_a, stub_b]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert_eq!(report.built.len(), 2);
    assert_eq!(report.built[0].filename, "pipe-e2e_2.3.1.formata");
    assert_eq!(report.built[1].filename, "pipe-e2e_2.3.1.formatb");
    assert!(out.path().join("pipe-e2e_2.3.1.formata").is_file());
    assert!(out.path().join("pipe-e2e_2.3.1.formatb").is_file());

    for trees in [&trees_a, &trees_b] {
        let trees = trees.lock().unwrap();
        assert_eq!(trees.len(), 1);
        assert!(!trees[0].exists(), "scratch is removed after the run");
    }

    let store = std::fs::read_to_string(out.path().join("versions")).unwrap();
    assert!(
        store.contains("pipe_e2e_formata_version=2.3.1"),
        "store was: {store}"
    );
    assert!(
        store.contains("pipe_e2e_formatb_version=2.3.1"),
        "store was: {store}"
    );
}

#[test]
fn test_format_filter_limits_the_run() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(
        r#"
name: pipe-fmt
version: "1.0"
release: "1"
packages:
  - package: formata
  - package: formatb
"#,
    )
    .unwrap();

    let registry = registry_of(vec![StubBuilder::new("formata"), StubBuilder::new("formatb")]);
    let opts = ResolveOptions {
        format: "formata".to_string(),
        ..options_into(&out)
    };
    let report = run_pipeline(&spec, &registry, &opts).unwrap();

    assert_eq!(report.built.len(), 1);
    assert_eq!(report.built[0].format, "formata");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].format, "formatb");
    assert_eq!(report.skipped[0].reason, "excluded by format filter");
    assert!(!out.path().join("pipe-fmt_1.0.formatb").exists());
}

#[test]
fn test_profile_matrix() {
    let spec = Spec::from_yaml(
        r#"
name: pipe-profile
version: "1.0"
release: "1"
packages:
  - package: formata
    profile: release
  - package: formatb
    profile: debug
  - package: formatc
"#,
    )
    .unwrap();

    // With an active profile, only matching or profile-less entries build
    let out = TempDir::new().unwrap();
    let registry = registry_of(vec![
        StubBuilder::new("formata"),
        StubBuilder::new("formatb"),
        StubBuilder::new("formatc"),
    ]);
    let opts = ResolveOptions {
        profile: Some("release".to_string()),
        ..options_into(&out)
    };
    let report = run_pipeline(&spec, &registry, &opts).unwrap();

    let built: Vec<_> = report.built.iter().map(|a| a.format.as_str()).collect();
    assert_eq!(built, vec!["formata", "formatc"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].format, "formatb");
    assert_eq!(report.skipped[0].reason, "profile does not match");

    // Without an active profile, entry profiles are not a constraint
    let out = TempDir::new().unwrap();
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();
    assert_eq!(report.built.len(), 3);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_version_filter_matches_prefixes_only() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(
        r#"
name: pipe-vers
version: "2.3.1"
release: "1"
packages:
  - package: va
    pkg-version: "2\\."
  - package: vb
    pkg-version: "3\\."
  - package: vc
    pkg-version: "["
  - package: vd
"#,
    )
    .unwrap();

    let registry = registry_of(vec![
        StubBuilder::new("va"),
        StubBuilder::new("vb"),
        StubBuilder::new("vc"),
        StubBuilder::new("vd"),
    ]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    let built: Vec<_> = report.built.iter().map(|a| a.format.as_str()).collect();
    assert_eq!(built, vec!["va", "vd"], "only prefix matches build");

    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].format, "vb");
    assert_eq!(report.skipped[0].reason, "version constraint does not match");
    assert_eq!(report.skipped[1].format, "vc");
    assert!(
        report.skipped[1].reason.contains("invalid version pattern"),
        "reason was: {}",
        report.skipped[1].reason
    );
}

#[test]
fn test_failing_update_hook_aborts_before_builders() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-hookfail
version: "1.0"
release: "1"
packages:
  - package: formata
  - package: formatb
pkgbuild:
  pkg-update-dist: /bin/false
  version-db: "{}"
"#,
        out.path().join("versions").display()
    ))
    .unwrap();

    let stub_a = StubBuilder::new("formata");
    let trees = stub_a.trees();
    let registry = registry_of(vec![stub_a, StubBuilder::new("formatb")]);

    let err = run_pipeline(&spec, &registry, &options_into(&out)).unwrap_err();
    match err {
        RepackError::Hook(HookError::Failed { hook, code, .. }) => {
            assert_eq!(hook, "update");
            assert_eq!(code, 1);
        }
        other => panic!("Expected a hook failure, got {other:?}"),
    }

    assert!(
        trees.lock().unwrap().is_empty(),
        "no builder may run after a hook failure"
    );
    assert!(!out.path().join("pipe-hookfail_1.0.formata").exists());

    let store = std::fs::read_to_string(out.path().join("versions")).unwrap_or_default();
    assert!(
        !store.contains("_version="),
        "no version may be recorded: {store}"
    );
}

#[test]
fn test_update_hook_runs_before_each_entry() {
    let out = TempDir::new().unwrap();
    let marker = out.path().join("hook-count");
    let hook = out.path().join("update.sh");
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(&hook, format!("#!/bin/sh\necho ran >> {}\n", marker.display())).unwrap();
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-perentry
version: "1.0"
release: "1"
packages:
  - package: formata
  - package: formatb
pkgbuild:
  pkg-update-dist: "{}"
"#,
        hook.display()
    ))
    .unwrap();

    let registry = registry_of(vec![StubBuilder::new("formata"), StubBuilder::new("formatb")]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert_eq!(report.built.len(), 2);
    let count = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(
        count.lines().count(),
        2,
        "the update hook runs once per built entry"
    );
}

#[test]
fn test_builder_failure_aborts_the_run() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-badbuild
version: "1.0"
release: "1"
packages:
  - package: bad
  - package: good
pkgbuild:
  version-db: "{}"
"#,
        out.path().join("versions").display()
    ))
    .unwrap();

    let bad = StubBuilder::failing("bad");
    let trees = bad.trees();
    let registry = registry_of(vec![bad, StubBuilder::new("good")]);

    let err = run_pipeline(&spec, &registry, &options_into(&out)).unwrap_err();
    assert!(
        matches!(err, RepackError::Builder(BuilderError::ToolFailed { .. })),
        "got {err:?}"
    );

    assert!(
        !out.path().join("pipe-badbuild_1.0.good").exists(),
        "later entries must not build after an aborting failure"
    );

    let store = std::fs::read_to_string(out.path().join("versions")).unwrap_or_default();
    assert!(
        !store.contains("pipe_badbuild_bad_version"),
        "a failed build must not be recorded: {store}"
    );

    // Cleanup runs on the abort path too
    let trees = trees.lock().unwrap();
    assert_eq!(trees.len(), 1);
    assert!(
        !trees[0].exists(),
        "scratch directories are removed even when the run aborts"
    );
}

#[test]
fn test_continue_on_error_moves_to_the_next_entry() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-continue
version: "1.0"
release: "1"
packages:
  - package: bad
    continue-on-error: true
  - package: good
pkgbuild:
  version-db: "{}"
"#,
        out.path().join("versions").display()
    ))
    .unwrap();

    let registry = registry_of(vec![StubBuilder::failing("bad"), StubBuilder::new("good")]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].format, "bad");
    assert_eq!(report.built.len(), 1);
    assert_eq!(report.built[0].format, "good");
    assert!(out.path().join("pipe-continue_1.0.good").is_file());

    let store = std::fs::read_to_string(out.path().join("versions")).unwrap();
    assert!(store.contains("pipe_continue_good_version=1.0"));
    assert!(
        !store.contains("pipe_continue_bad_version"),
        "store was: {store}"
    );
}

#[test]
fn test_entry_without_builder_is_skipped() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(
        r#"
name: pipe-ghost
version: "1.0"
release: "1"
packages:
  - package: ghost
  - package: good
"#,
    )
    .unwrap();

    let registry = registry_of(vec![StubBuilder::new("good")]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].format, "ghost");
    assert_eq!(report.skipped[0].reason, "no builder registered");
    assert_eq!(report.built.len(), 1);
    assert!(out.path().join("pipe-ghost_1.0.good").is_file());
}

#[test]
fn test_scratch_directories_are_removed_after_success() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(
        r#"
name: pipe-clean
version: "1.0"
release: "1"
packages:
  - package: formata
"#,
    )
    .unwrap();

    let stub = StubBuilder::new("formata");
    let trees = stub.trees();
    let registry = registry_of(vec![stub]);

    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert!(report.kept_scratch.is_empty());
    let trees = trees.lock().unwrap();
    assert_eq!(trees.len(), 1);
    assert!(!trees[0].exists(), "scratch must be removed after the run");
}

#[test]
fn test_no_clean_keeps_scratch_directories() {
    let out = TempDir::new().unwrap();
    let spec = Spec::from_yaml(
        r#"
name: pipe-noclean
version: "1.0"
release: "1"
packages:
  - package: formata
  - package: formatb
"#,
    )
    .unwrap();

    let stub_a = StubBuilder::new("formata");
    let stub_b = StubBuilder::new("formatb");
    let trees_a = stub_a.trees();
    let trees_b = stub_b.trees();
    let registry = registry_of(vec![stub_a, stub_b]);
    let opts = ResolveOptions {
        no_clean: true,
        ..options_into(&out)
    };

    let report = run_pipeline(&spec, &registry, &opts).unwrap();

    let trees_a = trees_a.lock().unwrap();
    let trees_b = trees_b.lock().unwrap();
    assert_eq!((trees_a.len(), trees_b.len()), (1, 1));
    assert!(trees_a[0].exists(), "no-clean retains every scratch directory");
    assert!(trees_b[0].exists(), "no-clean retains every scratch directory");
    assert_eq!(report.kept_scratch, vec![trees_a[0].clone(), trees_b[0].clone()]);

    std::fs::remove_dir_all(&trees_a[0]).unwrap();
    std::fs::remove_dir_all(&trees_b[0]).unwrap();
}

#[test]
fn test_unopenable_version_store_degrades_gracefully() {
    let out = TempDir::new().unwrap();
    // A regular file where the store's parent directory should be
    std::fs::write(out.path().join("blocker"), "not a directory").unwrap();

    let spec = Spec::from_yaml(&format!(
        r#"
name: pipe-nostore
version: "1.0"
release: "1"
packages:
  - package: formata
pkgbuild:
  version-db: "{}"
"#,
        out.path().join("blocker").join("versions").display()
    ))
    .unwrap();

    let registry = registry_of(vec![StubBuilder::new("formata")]);
    let report = run_pipeline(&spec, &registry, &options_into(&out)).unwrap();

    assert_eq!(report.built.len(), 1, "the build proceeds without a store");
    assert!(out.path().join("pipe-nostore_1.0.formata").is_file());
}
