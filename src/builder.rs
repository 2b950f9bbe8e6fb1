//! Turning step annotations into registry entries.
//!
//! Each annotation invocation forms an alias group: every decoded text becomes
//! the primary text of one entry, with its siblings recorded as aliases.
//! Separate invocations on the same function never alias each other.

use crate::ast::{Expr, FunctionDecl, ValueArg};
use crate::decode::decode_step_text;
use crate::registry::StepRegistrar;
use crate::render::function_signature;
use crate::step::{ParameterDescriptor, StepRegistryEntry, StepValue};

/// Decode the texts declared by one annotation invocation.
///
/// Arguments that do not decode are skipped. An array literal argument, as in
/// `@Step(value = ["a", "b"])`, contributes each of its decodable items.
#[must_use]
pub fn step_texts(args: &[ValueArg]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| match &arg.expr {
            Expr::Collection(items) => items.iter().filter_map(decode_step_text).collect(),
            expr => decode_step_text(expr).into_iter().collect::<Vec<_>>(),
        })
        .collect()
}

/// Build one entry per text declared by the annotation invocation `args` on
/// `func`, declared in `file`.
#[must_use]
pub fn build_entries(func: &FunctionDecl, args: &[ValueArg], file: &str) -> Vec<StepRegistryEntry> {
    let texts = step_texts(args);
    if texts.is_empty() {
        return Vec::new();
    }
    let name = function_signature(func);
    let parameters: Vec<_> = func
        .parameters
        .iter()
        .map(|param| ParameterDescriptor::new(param.ty.as_str(), param.name.as_str()))
        .collect();
    texts
        .iter()
        .map(|text| {
            let aliases: Vec<String> = texts.iter().filter(|other| *other != text).cloned().collect();
            StepRegistryEntry {
                name: name.clone(),
                step_text: text.clone(),
                step_value: StepValue::new(text),
                has_alias: !aliases.is_empty(),
                aliases,
                parameters: parameters.clone(),
                span: func.span,
                file_name: file.to_owned(),
            }
        })
        .collect()
}

/// Build the entries for `args` and submit them to `registrar`, returning how
/// many were added.
pub fn add_steps(
    registrar: &dyn StepRegistrar,
    func: &FunctionDecl,
    args: &[ValueArg],
    file: &str,
) -> usize {
    let entries = build_entries(func, args, file);
    let count = entries.len();
    for entry in entries {
        registrar.add_step(entry.step_value.clone(), entry);
    }
    count
}
