//! Kotlin source rendering for syntax nodes.
//!
//! [`function_signature`] produces the display name recorded on each step
//! entry: the function's annotations, modifiers, and signature written back
//! out in normalised Kotlin syntax, without its body.

use crate::ast::{
    Annotation, AnnotationSet, Expr, FunctionDecl, Parameter, StringTemplate, TemplateElement,
    ValueArg,
};
use itertools::Itertools;
use std::fmt;

/// Render the declaration header of `func`.
///
/// ```rust
/// use stepscan::ast::Declaration;
/// use stepscan::parser::parse_file;
/// use stepscan::render::function_signature;
///
/// let src = "@Step(\"Say <hi>\")\nfun   hello( greeting :String ) : Unit {}";
/// let file = parse_file(src, "S.kt").expect("parse");
/// let Some(Declaration::Function(func)) = file.declarations.first() else {
///     panic!("expected function");
/// };
/// assert_eq!(
///     function_signature(func),
///     "@Step(\"Say <hi>\") fun hello(greeting: String): Unit"
/// );
/// ```
#[must_use]
pub fn function_signature(func: &FunctionDecl) -> String {
    let mut out = String::new();
    for set in &func.annotations {
        out.push_str(&set.to_string());
        out.push(' ');
    }
    for modifier in &func.modifiers {
        out.push_str(modifier);
        out.push(' ');
    }
    out.push_str("fun ");
    if let Some(type_parameters) = &func.type_parameters {
        out.push_str(type_parameters);
        out.push(' ');
    }
    if let Some(receiver) = &func.receiver {
        out.push_str(receiver.as_str());
        out.push('.');
    }
    out.push_str(&func.name);
    out.push('(');
    out.push_str(&func.parameters.iter().map(render_parameter).join(", "));
    out.push(')');
    if let Some(return_type) = &func.return_type {
        out.push_str(": ");
        out.push_str(return_type.as_str());
    }
    out
}

fn render_parameter(param: &Parameter) -> String {
    let mut out = String::new();
    for set in &param.annotations {
        out.push_str(&set.to_string());
        out.push(' ');
    }
    for modifier in &param.modifiers {
        out.push_str(modifier);
        out.push(' ');
    }
    out.push_str(&param.name);
    out.push_str(": ");
    out.push_str(param.ty.as_str());
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

impl fmt::Display for AnnotationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@")?;
        if let Some(target) = &self.target {
            write!(f, "{target}:")?;
        }
        if self.bracketed {
            write!(f, "[{}]", self.annotations.iter().join(" "))
        } else {
            write!(f, "{}", self.annotations.iter().join(" "))
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join("."))?;
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, "({})", self.args.iter().join(", "))
    }
}

impl fmt::Display for ValueArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} = ")?;
        }
        if self.spread {
            f.write_str("*")?;
        }
        write!(f, "{}", self.expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StringTemplate(template) => write!(f, "{template}"),
            Self::BinaryOp { lhs, op, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Self::Unary { op, expr } => write!(f, "{op}{expr}"),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Name(segments) => f.write_str(&segments.join(".")),
            Self::Constant(text) | Self::Other(text) => f.write_str(text),
            Self::Call { callee, args } => write!(f, "{callee}({})", args.iter().join(", ")),
            Self::Member { receiver, name } => write!(f, "{receiver}.{name}"),
            Self::Reference { receiver, name } => match receiver {
                Some(receiver) => write!(f, "{receiver}::{name}"),
                None => write!(f, "::{name}"),
            },
            Self::Collection(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}

impl fmt::Display for StringTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quotes = if self.raw { "\"\"\"" } else { "\"" };
        f.write_str(quotes)?;
        for element in &self.elements {
            match element {
                TemplateElement::Regular(text) => f.write_str(text)?,
                TemplateElement::Escape(ch) => f.write_str(&escape(*ch))?,
                TemplateElement::ShortTemplate(name) => write!(f, "${name}")?,
                TemplateElement::LongTemplate(body) => write!(f, "${{{body}}}")?,
            }
        }
        f.write_str(quotes)
    }
}

fn escape(ch: char) -> String {
    match ch {
        '\t' => String::from("\\t"),
        '\u{8}' => String::from("\\b"),
        '\n' => String::from("\\n"),
        '\r' => String::from("\\r"),
        '"' | '\'' | '\\' | '$' => format!("\\{ch}"),
        other if other.is_control() => format!("\\u{:04x}", u32::from(other)),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Declaration;
    use crate::parser::parse_file;
    use rstest::rstest;

    fn first_function(source: &str) -> FunctionDecl {
        let file = parse_file(source, "Render.kt").expect("parse");
        match file.declarations.into_iter().next() {
            Some(Declaration::Function(func)) => func,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[rstest]
    #[case(
        "@Step(\"Say <hello> to <world>\", \"Greet <hello>, <world>\")\nfun helloWorld(greeting: String, name: Int): String { return \"\" }",
        "@Step(\"Say <hello> to <world>\", \"Greet <hello>, <world>\") fun helloWorld(greeting: String, name: Int): String"
    )]
    #[case(
        "override suspend fun <T> List<T>.go(vararg items: T, limit: Int = 10 ) = Unit",
        "override suspend fun <T> List<T>.go(vararg items: T, limit: Int = 10)"
    )]
    #[case(
        "@Step(\"Pay \\$${amount}\\n\" + NAME)\nfun pay(@Named(\"a\") amount: Map<String,   Int>) {}",
        "@Step(\"Pay \\$${amount}\\n\" + NAME) fun pay(@Named(\"a\") amount: Map<String, Int>)"
    )]
    #[case(
        "@[Step(\"\"\"raw \"text\"\"\"\") Tag]\nfun raw() {}",
        "@[Step(\"\"\"raw \"text\"\"\"\") Tag] fun raw()"
    )]
    fn renders_signatures(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(function_signature(&first_function(source)), expected);
    }
}
