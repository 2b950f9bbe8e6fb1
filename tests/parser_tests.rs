//! Integration tests for parsing Kotlin files and rendering what was found.
//!
//! These tests parse the formatted fixture under `tests/data` and check the
//! functions, annotations, and signatures the scanner relies on.

use anyhow::{Context, Result, ensure};
use rstest::{fixture, rstest};
use std::fs;
use stepscan::annotations::{functions, step_annotations};
use stepscan::ast::KotlinFile;
use stepscan::decode::decode_step_text;
use stepscan::parser::{ParseErrorKind, parse_file};
use stepscan::position::SourcePosition;
use stepscan::render::function_signature;
use test_support::data_file;

#[fixture]
fn step_impl() -> KotlinFile {
    let path = data_file("StepImpl.kt");
    let source = fs::read_to_string(&path).expect("read StepImpl.kt");
    parse_file(&source, path.as_str()).expect("parse StepImpl.kt")
}

#[rstest]
fn reads_package_and_imports(step_impl: KotlinFile) -> Result<()> {
    ensure!(
        step_impl.package.as_deref() == Some("test.files.formatted"),
        "unexpected package {:?}",
        step_impl.package
    );
    ensure!(
        step_impl.imports == ["com.thoughtworks.gauge.Step", "com.thoughtworks.gauge.Table"],
        "unexpected imports {:?}",
        step_impl.imports
    );
    Ok(())
}

#[rstest]
fn finds_every_function_including_companions(step_impl: KotlinFile) -> Result<()> {
    let names: Vec<_> = functions(&step_impl)
        .into_iter()
        .map(|func| func.name.as_str())
        .collect();
    ensure!(
        names
            == [
                "helloWorld",
                "stepWithTable",
                "someStepStep",
                "tell",
                "stepWith",
                "someStepWithComments",
                "stepWithDualBackSlashes",
                "stepWithCommonDualSlashes",
                "stepWithSpecialChars",
                "concatenated",
                "fromConstant",
                "helper",
                "companionStep",
            ],
        "unexpected functions {names:?}"
    );
    Ok(())
}

#[rstest]
fn decodes_the_texts_of_each_annotation(step_impl: KotlinFile) -> Result<()> {
    let decoded: Vec<Vec<Option<String>>> = functions(&step_impl)
        .into_iter()
        .flat_map(|func| step_annotations(func, "Step"))
        .map(|args| args.iter().map(|arg| decode_step_text(&arg.expr)).collect())
        .collect();
    ensure!(decoded.len() == 12, "expected twelve annotations, got {}", decoded.len());
    let first = decoded.first().context("first annotation")?;
    ensure!(
        first
            == &[
                Some(String::from("Say <hello> to <world>")),
                Some(String::from("Greet <hello>, <world>")),
            ],
        "unexpected texts {first:?}"
    );
    ensure!(
        decoded.contains(&vec![Some(String::from("A step with \\"))]),
        "escaped backslash should decode to a single backslash"
    );
    ensure!(
        decoded.contains(&vec![Some(String::from("This is a step"))]),
        "concatenation should decode"
    );
    ensure!(decoded.contains(&vec![None]), "constants should not decode");
    Ok(())
}

#[rstest]
fn renders_signatures_and_spans(step_impl: KotlinFile) -> Result<()> {
    let funcs = functions(&step_impl);
    let table = funcs
        .iter()
        .find(|func| func.name == "stepWithTable")
        .context("stepWithTable")?;
    ensure!(
        function_signature(table)
            == "@Step(\"step <a> and a table <table>\") fun stepWithTable(a: Float, table: Table)",
        "unexpected signature {}",
        function_signature(table)
    );
    ensure!(
        table.span.start == SourcePosition::new(12, 5),
        "span started at {}",
        table.span.start
    );
    ensure!(
        table.span.end == SourcePosition::new(14, 6),
        "span ended at {}",
        table.span.end
    );
    let helper = funcs
        .iter()
        .find(|func| func.name == "helper")
        .context("helper")?;
    ensure!(
        function_signature(helper) == "fun helper(): Int",
        "unexpected signature {}",
        function_signature(helper)
    );
    Ok(())
}

#[test]
fn reports_unclosed_annotation_arguments() -> Result<()> {
    let path = data_file("Broken.kt");
    let source = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let Err(err) = parse_file(&source, path.as_str()) else {
        anyhow::bail!("Broken.kt should not parse");
    };
    ensure!(
        matches!(err.kind(), ParseErrorKind::Unexpected { .. }),
        "unexpected error kind {:?}",
        err.kind()
    );
    ensure!(err.file() == path.as_str(), "error names {}", err.file());
    ensure!(
        err.position() == Some(SourcePosition::new(3, 5)),
        "error at {:?}",
        err.position()
    );
    Ok(())
}
