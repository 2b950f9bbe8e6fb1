//! Locating step annotations on function declarations.

use crate::ast::{Declaration, FunctionDecl, KotlinFile, ValueArg};

/// Default annotation name marking a step implementation.
pub const STEP_MARKER: &str = "Step";

/// Collect every function declared in `file`, descending into classes,
/// objects, and companions but never into function bodies.
#[must_use]
pub fn functions(file: &KotlinFile) -> Vec<&FunctionDecl> {
    let mut found = Vec::new();
    collect_functions(&file.declarations, &mut found);
    found
}

fn collect_functions<'a>(declarations: &'a [Declaration], found: &mut Vec<&'a FunctionDecl>) {
    for declaration in declarations {
        match declaration {
            Declaration::Function(func) => found.push(func),
            Declaration::Class(class) => collect_functions(&class.declarations, found),
            Declaration::Property { .. } | Declaration::TypeAlias { .. } | Declaration::Other => {}
        }
    }
}

/// Argument lists of the annotations on `func` whose name includes `marker`.
///
/// Annotation names match when any dotted segment equals `marker` exactly, so
/// both `@Step` and `@com.thoughtworks.gauge.Step` qualify. Bracketed sets and
/// use-site targets are flattened. Each returned slice is one invocation, in
/// declaration order; invocations without arguments yield empty slices.
#[must_use]
pub fn step_annotations<'a>(func: &'a FunctionDecl, marker: &str) -> Vec<&'a [ValueArg]> {
    func.annotations
        .iter()
        .flat_map(|set| &set.annotations)
        .filter(|annotation| annotation.names.iter().any(|name| name == marker))
        .map(|annotation| annotation.args.as_slice())
        .collect()
}
