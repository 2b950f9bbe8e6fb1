//! Integration tests for sharing one step registry between scans.
//!
//! Several files and scanners feed a single registry here, including
//! concurrently, to check how duplicate implementations and per-file removal
//! behave.

use anyhow::{Context, Result, ensure};
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::thread;
use stepscan::config::ScanConfig;
use stepscan::registry::StepRegistry;
use stepscan::scanner::StaticScanner;

const FIRST: &str = "@Step(\"Open <page>\")\nfun open(page: String) {}\n";
const SECOND: &str = "class Other {\n    @Step(\"Open <url>\")\n    fun visit(url: String) {}\n}\n";

#[fixture]
fn registry() -> Arc<StepRegistry> {
    Arc::new(StepRegistry::new())
}

#[rstest]
fn detects_implementations_in_different_files(registry: Arc<StepRegistry>) -> Result<()> {
    let scanner = StaticScanner::with_registry(Arc::clone(&registry), ScanConfig::default());
    scanner.add_steps_from_file_contents("First.kt", FIRST)?;
    ensure!(
        !registry.has_multiple_implementations("Open <x>"),
        "one implementation so far"
    );
    scanner.add_steps_from_file_contents("Second.kt", SECOND)?;
    ensure!(
        registry.has_multiple_implementations("Open <x>"),
        "both files implement the step"
    );
    let files: Vec<_> = registry
        .get_all("Open <x>")
        .into_iter()
        .map(|entry| entry.file_name)
        .collect();
    ensure!(files == ["First.kt", "Second.kt"], "unexpected files {files:?}");
    let first = registry.get("Open <x>").context("registered step")?;
    ensure!(first.step_text == "Open <page>", "get should return the first entry");
    Ok(())
}

#[rstest]
fn rescanning_a_file_is_not_a_duplicate(registry: Arc<StepRegistry>) -> Result<()> {
    let scanner = StaticScanner::with_registry(Arc::clone(&registry), ScanConfig::default());
    scanner.add_steps_from_file_contents("First.kt", FIRST)?;
    scanner.add_steps_from_file_contents("First.kt", FIRST)?;
    ensure!(registry.get_all("Open <page>").len() == 2, "both scans recorded");
    ensure!(
        !registry.has_multiple_implementations("Open <page>"),
        "same function should not count twice"
    );
    Ok(())
}

#[rstest]
fn removing_one_file_keeps_the_other(registry: Arc<StepRegistry>) -> Result<()> {
    let first = StaticScanner::with_registry(Arc::clone(&registry), ScanConfig::default());
    let second = StaticScanner::with_registry(Arc::clone(&registry), ScanConfig::default());
    first.add_steps_from_file_contents("First.kt", FIRST)?;
    second.add_steps_from_file_contents("Second.kt", SECOND)?;
    first.remove_steps("First.kt");
    ensure!(!second.is_file_cached("First.kt"), "removal is shared");
    ensure!(registry.contains("Open <anything>"), "Second.kt still implements it");
    ensure!(
        !registry.has_multiple_implementations("Open <anything>"),
        "only one implementation remains"
    );
    second.remove_steps("Second.kt");
    ensure!(registry.is_empty(), "registry should be empty");
    Ok(())
}

#[rstest]
fn concurrent_scans_register_every_file(registry: Arc<StepRegistry>) -> Result<()> {
    let names: Vec<String> = (0..8).map(|n| format!("Steps{n}.kt")).collect();
    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let scanner =
                    StaticScanner::with_registry(Arc::clone(&registry), ScanConfig::default());
                scope.spawn(move || {
                    let source =
                        format!("@Step(\"step from {name}\", \"shared step\")\nfun f() {{}}\n");
                    scanner.add_steps_from_file_contents(name, &source)
                })
            })
            .collect();
        for handle in handles {
            let joined = handle
                .join()
                .map_err(|_| anyhow::anyhow!("scan thread panicked"))?;
            joined.context("scan source")?;
        }
        Ok(())
    })?;
    for name in &names {
        ensure!(registry.is_file_cached(name), "{name} should be cached");
        ensure!(
            registry.contains(&format!("step from {name}")),
            "{name} step missing"
        );
    }
    ensure!(
        registry.get_all("shared step").len() == names.len(),
        "every file should implement the shared step"
    );
    ensure!(
        registry.has_multiple_implementations("shared step"),
        "shared step has several implementations"
    );
    ensure!(registry.len() == names.len() + 1, "unexpected size {}", registry.len());
    Ok(())
}
