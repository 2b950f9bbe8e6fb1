//! Step registry data model.
//!
//! A [`StepValue`] is the canonical registry key derived from a step text: each
//! `<name>` placeholder is replaced by `{}` so that texts differing only in
//! placeholder names map to the same signature. [`StepRegistryEntry`] carries
//! everything an execution engine needs to bind a step to its function.

use crate::position::SourceSpan;
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Canonical placeholder written in place of each `<name>`.
pub const PLACEHOLDER: &str = "{}";

/// Canonicalised step signature.
///
/// Equality and hashing consider [`Self::step_text`] only.
///
/// ```rust
/// use stepscan::step::StepValue;
///
/// let value = StepValue::new("Say <hello> to <world>");
/// assert_eq!(value.step_text, "Say {} to {}");
/// assert_eq!(value.parameters, ["hello", "world"]);
/// assert_eq!(value, StepValue::new("Say <a> to <b>"));
/// ```
#[derive(Debug, Clone, Eq, Serialize)]
pub struct StepValue {
    /// Step text with placeholders replaced by [`PLACEHOLDER`].
    pub step_text: String,
    /// Step text as declared.
    pub parameterized_step_text: String,
    /// Placeholder names in order of appearance.
    pub parameters: Vec<String>,
}

impl StepValue {
    /// Canonicalise a declared step text.
    ///
    /// A placeholder runs from `<` to the next `>`. An unmatched `<` is kept
    /// as literal text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut step_text = String::with_capacity(text.len());
        let mut parameters = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find('<') {
            let (before, from_open) = rest.split_at(open);
            let Some(close) = from_open.find('>') else {
                break;
            };
            step_text.push_str(before);
            step_text.push_str(PLACEHOLDER);
            let (placeholder, after) = from_open.split_at(close + 1);
            let name = placeholder
                .strip_prefix('<')
                .and_then(|inner| inner.strip_suffix('>'))
                .unwrap_or_default();
            parameters.push(name.to_owned());
            rest = after;
        }
        step_text.push_str(rest);
        Self {
            step_text,
            parameterized_step_text: text.to_owned(),
            parameters,
        }
    }
}

impl PartialEq for StepValue {
    fn eq(&self, other: &Self) -> bool {
        self.step_text == other.step_text
    }
}

impl Hash for StepValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.step_text.hash(state);
    }
}

/// One formal parameter of a step function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterDescriptor {
    /// Parameter name.
    pub name: String,
    /// Type text as written in the source.
    #[serde(rename = "type")]
    pub declared_type: String,
}

impl ParameterDescriptor {
    /// Describe a parameter of type `declared_type` named `name`.
    #[must_use]
    pub fn new(declared_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// A step implementation registered under one of its declared texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRegistryEntry {
    /// Rendered signature of the implementing function.
    pub name: String,
    /// Declared text this entry is registered under.
    pub step_text: String,
    /// Canonical form of [`Self::step_text`].
    pub step_value: StepValue,
    /// Other texts declared on the same annotation, in declaration order.
    pub aliases: Vec<String>,
    /// Whether [`Self::aliases`] is non-empty.
    pub has_alias: bool,
    /// Formal parameters of the function in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// Extent of the function declaration.
    pub span: SourceSpan,
    /// Path of the file declaring the function.
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("A step", "A step", &[])]
    #[case("Say <hello> to <world>", "Say {} to {}", &["hello", "world"])]
    #[case("<a><b>", "{}{}", &["a", "b"])]
    #[case("Compare a < b", "Compare a < b", &[])]
    #[case("Empty <>", "Empty {}", &[""])]
    #[case("Nested <a <b>>", "Nested {}>", &["a <b"])]
    #[case("Unicode <naïve> ok", "Unicode {} ok", &["naïve"])]
    fn canonicalises_placeholders(
        #[case] text: &str,
        #[case] canonical: &str,
        #[case] parameters: &[&str],
    ) {
        let value = StepValue::new(text);
        assert_eq!(value.step_text, canonical);
        assert_eq!(value.parameterized_step_text, text);
        assert_eq!(value.parameters, parameters);
    }

    #[test]
    fn equality_ignores_placeholder_names() {
        let values: HashSet<_> = [
            StepValue::new("Greet <hello>, <world>"),
            StepValue::new("Greet <a>, <b>"),
        ]
        .into_iter()
        .collect();
        assert_eq!(values.len(), 1);
        assert_ne!(StepValue::new("Greet <a>"), StepValue::new("Greet a"));
    }

    #[test]
    fn parameter_descriptor_takes_type_first() {
        let param = ParameterDescriptor::new("Int", "count");
        assert_eq!(param.name, "count");
        assert_eq!(param.declared_type, "Int");
    }
}
