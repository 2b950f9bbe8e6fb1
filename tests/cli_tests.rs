//! Integration tests for the `stepscan` binary using `assert_cmd`.
//!
//! These tests run the compiled binary against the Kotlin files under
//! `tests/data` and check the reports it prints.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{data_file, write_source};

fn stepscan() -> Result<Command> {
    let mut cmd = Command::cargo_bin("stepscan").context("locate stepscan binary")?;
    cmd.env_remove("STEPSCAN_MARKER")
        .env_remove("STEPSCAN_EXTENSIONS");
    Ok(cmd)
}

#[test]
fn prints_one_line_per_step() -> Result<()> {
    let foo = data_file("foo.kt");
    stepscan()?
        .arg(foo.as_str())
        .assert()
        .success()
        .stdout(format!("{foo}:6:5\tnew step\n"));
    Ok(())
}

#[test]
fn text_report_lists_aliases() -> Result<()> {
    stepscan()?
        .arg(data_file("StepImpl.kt").as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\tSay <hello> to <world> (aliases: Greet <hello>, <world>)\n",
        ))
        .stdout(predicate::str::contains("\tThis is a step\n"))
        .stdout(predicate::str::contains("not decodable").not());
    Ok(())
}

#[test]
fn json_report_describes_entries() -> Result<()> {
    let output = stepscan()?
        .args(["--format", "json"])
        .arg(data_file("StepImpl.kt").as_str())
        .output()
        .context("run stepscan")?;
    ensure!(output.status.success(), "stepscan failed: {output:?}");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("parse JSON report")?;
    let entries = value.as_array().context("report should be an array")?;
    ensure!(entries.len() == 12, "expected twelve entries, got {}", entries.len());
    let table = entries
        .iter()
        .find(|entry| entry["step_text"] == "step <a> and a table <table>")
        .context("table step")?;
    ensure!(
        table["step_value"]["parameterized_step_text"] == "step <a> and a table <table>",
        "unexpected step value {}",
        table["step_value"]
    );
    ensure!(
        table["parameters"][1]["type"] == "Table",
        "unexpected parameters {}",
        table["parameters"]
    );
    ensure!(table["span"]["start"]["line"] == 12, "unexpected span {}", table["span"]);
    ensure!(table["has_alias"] == false, "table step has no alias");
    Ok(())
}

#[test]
fn skips_unparseable_files() -> Result<()> {
    stepscan()?
        .arg(data_file("Broken.kt").as_str())
        .arg(data_file("foo.kt").as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("\tnew step\n"))
        .stderr(predicate::str::contains("Broken.kt"));
    Ok(())
}

#[test]
fn fails_when_nothing_can_be_scanned() -> Result<()> {
    stepscan()?
        .arg(data_file("Broken.kt").as_str())
        .arg(data_file("missing.kt").as_str())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("could be scanned"));
    Ok(())
}

#[test]
fn skips_files_without_kotlin_extension() -> Result<()> {
    let (_dir, java) = write_source("Steps.java", "@Step(\"java step\")\nfun f() {}\n")?;
    stepscan()?
        .arg(java.as_str())
        .arg(data_file("foo.kt").as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("java step").not());
    Ok(())
}

#[test]
fn marker_can_come_from_environment() -> Result<()> {
    let (_dir, path) = write_source(
        "Given.kt",
        "@Given(\"a given step\")\n@Step(\"a plain step\")\nfun f() {}\n",
    )?;
    stepscan()?
        .env("STEPSCAN_MARKER", "Given")
        .arg(path.as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("a given step"))
        .stdout(predicate::str::contains("a plain step").not());
    Ok(())
}

#[test]
fn marker_flag_overrides_environment() -> Result<()> {
    let (_dir, path) = write_source(
        "Given.kt",
        "@Given(\"a given step\")\n@Step(\"a plain step\")\nfun f() {}\n",
    )?;
    stepscan()?
        .env("STEPSCAN_MARKER", "Given")
        .args(["--marker", "Step"])
        .arg(path.as_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("a plain step"))
        .stdout(predicate::str::contains("a given step").not());
    Ok(())
}

#[test]
fn rejects_blank_marker() -> Result<()> {
    stepscan()?
        .args(["--marker", "  "])
        .arg(data_file("foo.kt").as_str())
        .assert()
        .failure()
        .stderr(predicate::str::contains("scan configuration"));
    Ok(())
}
