//! Tests for the rmlogs binary.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn project() -> Result<TempDir> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("src"))?;
    fs::create_dir_all(temp.path().join("node_modules/dep"))?;
    fs::write(
        temp.path().join("src/app.js"),
        "console.log('boot');\ntry {\n  start();\n} catch (err) {\n  console.log(err);\n}\n",
    )?;
    fs::write(
        temp.path().join("src/Widget.vue"),
        "<template><div>it's here</div></template>\n<script>\nconsole.log('widget');\nexport default {};\n</script>\n",
    )?;
    fs::write(temp.path().join("src/util.js"), "export const id = (x) => x;\n")?;
    fs::write(
        temp.path().join("node_modules/dep/index.js"),
        "console.log('dep');\n",
    )?;
    Ok(temp)
}

#[test]
fn test_help_mentions_config_file() -> Result<()> {
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIGURATION FILE (.rmlogs.toml)"))
        .stdout(predicate::str::contains("--dry-run"));
    Ok(())
}

#[test]
fn test_missing_path_fails() -> Result<()> {
    let temp = TempDir::new()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn test_unknown_flag_fails() -> Result<()> {
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg("--no-such-flag").assert().code(1);
    Ok(())
}

#[test]
fn test_sweep_rewrites_files() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed console.log from 2 files."));

    assert_eq!(
        fs::read_to_string(temp.path().join("src/app.js"))?,
        "try {\n  start();\n} catch (err) {\n  console.error(err);\n}\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("src/Widget.vue"))?,
        "<template><div>it's here</div></template>\n<script>\nexport default {};\n</script>\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("node_modules/dep/index.js"))?,
        "console.log('dep');\n"
    );
    Ok(())
}

#[test]
fn test_dry_run_leaves_files_alone() -> Result<()> {
    let temp = project()?;
    let before = fs::read_to_string(temp.path().join("src/app.js"))?;

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would remove console.log at"))
        .stdout(predicate::str::contains(
            "Would rewrite console.log to console.error at",
        ))
        .stdout(predicate::str::contains(
            "Would remove console.log from 2 files.",
        ));

    assert_eq!(fs::read_to_string(temp.path().join("src/app.js"))?, before);
    Ok(())
}

#[test]
fn test_check_exit_codes() -> Result<()> {
    let temp = project()?;

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .arg("--check")
        .arg("--quiet")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CHECK]"));

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path()).arg("--quiet").assert().success();

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .arg("--check")
        .arg("--quiet")
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    let output = cmd.arg(temp.path()).arg("--json").arg("-n").output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["summary"]["files_scanned"], 3);
    assert_eq!(report["summary"]["files_changed"], 2);
    assert_eq!(report["summary"]["deleted"], 2);
    assert_eq!(report["summary"]["rewritten"], 1);
    assert_eq!(report["summary"]["dry_run"], true);
    assert_eq!(report["replacement_function"], "console.error");
    Ok(())
}

#[test]
fn test_files_command_json() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    let output = cmd.arg("files").arg(temp.path()).arg("--json").output()?;
    assert!(output.status.success());

    let listings: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let listings = listings.as_array().cloned().unwrap_or_default();
    assert_eq!(listings.len(), 3);
    let calls: u64 = listings
        .iter()
        .filter_map(|l| l["calls"].as_u64())
        .sum();
    assert_eq!(calls, 3);
    Ok(())
}

#[test]
fn test_only_and_skip_globs() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--only", "*.vue", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed console.log from 1 files."));
    assert!(fs::read_to_string(temp.path().join("src/app.js"))?.contains("console.log('boot')"));

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--skip", "app.js", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed console.log from 0 files."));
    assert!(fs::read_to_string(temp.path().join("src/app.js"))?.contains("console.log('boot')"));
    Ok(())
}

#[test]
fn test_invalid_glob_aborts_before_writing() -> Result<()> {
    let temp = project()?;
    let app = fs::read_to_string(temp.path().join("src/app.js"))?;
    let widget = fs::read_to_string(temp.path().join("src/Widget.vue"))?;

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--skip", "legacy/{a.js"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--only", "src/[", "--quiet"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.args(["--skip", "legacy/{a.js", "files"])
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert_eq!(fs::read_to_string(temp.path().join("src/app.js"))?, app);
    assert_eq!(fs::read_to_string(temp.path().join("src/Widget.vue"))?, widget);
    Ok(())
}

#[test]
fn test_custom_target_from_flags() -> Result<()> {
    let temp = TempDir::new()?;
    let file = temp.path().join("a.js");
    fs::write(&file, "debug('x');\nconsole.log('kept');\n")?;

    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--target", "debug", "--replacement", "report", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed debug from 1 files."));
    assert_eq!(fs::read_to_string(file)?, "console.log('kept');\n");
    Ok(())
}

#[test]
fn test_invalid_rules_fail() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--replacement", "console.log"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn test_init_command() -> Result<()> {
    let temp = TempDir::new()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.current_dir(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .rmlogs.toml"));
    assert!(temp.path().join(".rmlogs.toml").exists());
    Ok(())
}

#[test]
fn test_select_from_stdin() -> Result<()> {
    let temp = project()?;
    let mut cmd = Command::cargo_bin("rmlogs")?;
    cmd.arg(temp.path())
        .args(["--select", "--quiet"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files to process:"))
        .stdout(predicate::str::contains("Removed console.log from 1 files."));

    // Files are listed sorted, so Widget.vue comes first.
    assert!(!fs::read_to_string(temp.path().join("src/Widget.vue"))?.contains("console.log"));
    assert!(fs::read_to_string(temp.path().join("src/app.js"))?.contains("console.log('boot')"));
    Ok(())
}
