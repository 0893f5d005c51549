//! End-to-end tests for sweeping a project tree through the library API.

#![allow(clippy::unwrap_used)]

use anyhow::Result;
use rmlogs::commands::{run_sweep, CancelFlag, FileState, SweepOptions};
use rmlogs::rewrite::RewriteRules;
use rmlogs::utils::{collect_source_files, WalkOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COMPONENT: &str = "\
<template>
  <p>Don't panic, it's fine</p>
</template>
<script>
export default {
  mounted() {
    console.log('mounted');
  },
};
</script>
";

const COMPONENT_SWEPT: &str = "\
<template>
  <p>Don't panic, it's fine</p>
</template>
<script>
export default {
  mounted() {
  },
};
</script>
";

fn project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();
    fs::create_dir_all(root.join("src/lib"))?;
    fs::create_dir_all(root.join("node_modules/pkg"))?;
    fs::create_dir_all(root.join("dist"))?;

    fs::write(
        root.join("src/main.js"),
        "import run from './lib/run';\nconsole.log('start');\nrun();\n",
    )?;
    fs::write(
        root.join("src/lib/run.js"),
        "export default function run() {\n  try {\n    work();\n  } catch (e) {\n    console.log(e);\n  }\n}\n",
    )?;
    fs::write(root.join("src/App.vue"), COMPONENT)?;
    fs::write(root.join("src/clean.js"), "export const x = 1;\n")?;
    fs::write(root.join("src/notes.ts"), "console.log('not swept');\n")?;
    fs::write(root.join("node_modules/pkg/index.js"), "console.log('dep');\n")?;
    fs::write(root.join("dist/bundle.js"), "console.log('built');\n")?;
    Ok(dir)
}

fn walk_options() -> WalkOptions {
    WalkOptions {
        extensions: vec!["js".to_owned(), "vue".to_owned()],
        ..WalkOptions::default()
    }
}

fn sweep(root: &Path, files: &[std::path::PathBuf], dry_run: bool) -> Result<rmlogs::commands::SweepReport> {
    let options = SweepOptions {
        dry_run,
        quiet: true,
        root: Some(root.to_path_buf()),
        ..SweepOptions::default()
    };
    run_sweep(
        files,
        &RewriteRules::default(),
        &options,
        &CancelFlag::new(),
        std::io::sink(),
    )
}

#[test]
fn test_walk_skips_dependencies_and_other_extensions() -> Result<()> {
    let dir = project()?;
    let files = collect_source_files(dir.path(), &walk_options())?;

    let names: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        names,
        vec!["src/App.vue", "src/clean.js", "src/lib/run.js", "src/main.js"]
    );
    Ok(())
}

#[test]
fn test_include_folder_overrides_default_exclusion() -> Result<()> {
    let dir = project()?;
    let options = WalkOptions {
        include: vec!["dist".to_owned()],
        ..walk_options()
    };
    let files = collect_source_files(dir.path(), &options)?;
    assert!(files.iter().any(|f| f.ends_with("dist/bundle.js")));
    assert!(!files.iter().any(|f| f.ends_with("node_modules/pkg/index.js")));
    Ok(())
}

#[test]
fn test_sweep_rewrites_project() -> Result<()> {
    let dir = project()?;
    let root = dir.path();
    let files = collect_source_files(root, &walk_options())?;

    let report = sweep(root, &files, false)?;

    assert_eq!(report.summary.files_scanned, 4);
    assert_eq!(report.summary.files_changed, 3);
    assert_eq!(report.summary.deleted, 2);
    assert_eq!(report.summary.rewritten, 1);
    assert_eq!(report.summary.failed, 0);

    assert_eq!(
        fs::read_to_string(root.join("src/main.js"))?,
        "import run from './lib/run';\nrun();\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("src/lib/run.js"))?,
        "export default function run() {\n  try {\n    work();\n  } catch (e) {\n    console.error(e);\n  }\n}\n"
    );
    assert_eq!(fs::read_to_string(root.join("src/App.vue"))?, COMPONENT_SWEPT);
    assert_eq!(
        fs::read_to_string(root.join("node_modules/pkg/index.js"))?,
        "console.log('dep');\n"
    );
    Ok(())
}

#[test]
fn test_second_sweep_changes_nothing() -> Result<()> {
    let dir = project()?;
    let root = dir.path();
    let files = collect_source_files(root, &walk_options())?;

    sweep(root, &files, false)?;
    let snapshot: Vec<String> = files
        .iter()
        .map(|f| fs::read_to_string(f).unwrap())
        .collect();

    let report = sweep(root, &files, false)?;
    assert_eq!(report.summary.files_changed, 0);
    assert!(report.files.iter().all(|f| f.state != FileState::Changed));
    for (file, before) in files.iter().zip(snapshot) {
        assert_eq!(fs::read_to_string(file)?, before);
    }
    Ok(())
}

#[test]
fn test_dry_run_reports_without_writing() -> Result<()> {
    let dir = project()?;
    let root = dir.path();
    let files = collect_source_files(root, &walk_options())?;

    let report = sweep(root, &files, true)?;
    assert!(report.summary.dry_run);
    assert_eq!(report.summary.files_changed, 3);
    assert_eq!(fs::read_to_string(root.join("src/App.vue"))?, COMPONENT);
    assert_eq!(
        fs::read_to_string(root.join("src/main.js"))?,
        "import run from './lib/run';\nconsole.log('start');\nrun();\n"
    );
    Ok(())
}

#[test]
fn test_report_serializes_changes() -> Result<()> {
    let dir = project()?;
    let root = dir.path();
    let files = collect_source_files(root, &walk_options())?;

    let report = sweep(root, &files, true)?;
    let json: serde_json::Value = serde_json::to_value(&report)?;

    assert_eq!(json["target_function"], "console.log");
    assert_eq!(json["summary"]["deleted"], 2);
    let run = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["file"].as_str().unwrap().ends_with("run.js"))
        .unwrap();
    assert_eq!(run["state"], "changed");
    assert_eq!(run["changes"][0]["kind"], "rewritten");
    assert_eq!(run["changes"][0]["line"], 5);
    assert_eq!(run["changes"][0]["handler_parameter"], "e");
    Ok(())
}

#[test]
fn test_writes_outside_root_are_refused() -> Result<()> {
    let inside = TempDir::new()?;
    let outside = TempDir::new()?;
    let stray = outside.path().join("stray.js");
    fs::write(&stray, "console.log('x');\n")?;

    let report = sweep(inside.path(), &[stray.clone()], false)?;

    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.files_changed, 0);
    assert_eq!(fs::read_to_string(stray)?, "console.log('x');\n");
    Ok(())
}
