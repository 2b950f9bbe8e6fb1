//! Step text reconstruction from annotation argument expressions.
//!
//! Only literal content survives decoding. Escape sequences count as literal
//! text and contribute the character they denote; `$name` and `${expr}`
//! interpolations are dropped without error, since their value is unknown
//! until runtime.

use crate::ast::{Expr, StringTemplate, TemplateElement};

/// Decode `expr` into step text.
///
/// String literals decode to their literal content. A `+` whose operands
/// both decode yields their concatenation, so chains such as
/// `"a" + "b" + "c"` decode as a whole, and parentheses are transparent.
/// Any other expression shape yields `None`.
///
/// ```rust
/// use stepscan::ast::{Declaration, ValueArg};
/// use stepscan::decode::decode_step_text;
/// use stepscan::parser::parse_file;
///
/// let file = parse_file("@Step(\"This is \" + \"a step\")\nfun f() {}", "S.kt")
///     .expect("parse");
/// let Some(Declaration::Function(func)) = file.declarations.first() else {
///     panic!("expected function");
/// };
/// let arg: &ValueArg = &func.annotations[0].annotations[0].args[0];
/// assert_eq!(decode_step_text(&arg.expr).as_deref(), Some("This is a step"));
/// ```
#[must_use]
pub fn decode_step_text(expr: &Expr) -> Option<String> {
    let mut literal = Literal::default();
    append_literal(expr, &mut literal).then(|| literal.finish())
}

/// Decoded text, remembering whether its ends came from escape sequences.
///
/// Quote trimming only applies to literal `"` characters, never to a `\"`
/// escape at either end.
#[derive(Debug, Default)]
struct Literal {
    text: String,
    head_escaped: Option<bool>,
    tail_escaped: bool,
}

impl Literal {
    fn push_regular(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.head_escaped.get_or_insert(false);
        self.tail_escaped = false;
        self.text.push_str(text);
    }

    fn push_escape(&mut self, ch: char) {
        self.head_escaped.get_or_insert(true);
        self.tail_escaped = true;
        self.text.push(ch);
    }

    fn append(&mut self, other: Self) {
        let Some(head_escaped) = other.head_escaped else {
            return;
        };
        self.head_escaped.get_or_insert(head_escaped);
        self.tail_escaped = other.tail_escaped;
        self.text.push_str(&other.text);
    }

    fn finish(self) -> String {
        let text = self.text.as_str();
        let trimmed = match (self.head_escaped == Some(true), self.tail_escaped) {
            (false, false) => trim_quotes(text),
            (true, false) => text.strip_suffix('"').unwrap_or(text),
            (false, true) => text.strip_prefix('"').unwrap_or(text),
            (true, true) => text,
        };
        trimmed.to_owned()
    }
}

fn append_literal(expr: &Expr, out: &mut Literal) -> bool {
    match expr {
        Expr::StringTemplate(template) => {
            append_template(template, out);
            true
        }
        Expr::BinaryOp { lhs, op, rhs } if op == "+" => {
            let mut left = Literal::default();
            let mut right = Literal::default();
            if append_literal(lhs, &mut left) && append_literal(rhs, &mut right) {
                out.append(left);
                out.append(right);
                true
            } else {
                false
            }
        }
        Expr::Paren(inner) => append_literal(inner, out),
        _ => false,
    }
}

fn append_template(template: &StringTemplate, out: &mut Literal) {
    for element in &template.elements {
        match element {
            TemplateElement::Regular(text) => out.push_regular(text),
            TemplateElement::Escape(ch) => out.push_escape(*ch),
            TemplateElement::ShortTemplate(_) | TemplateElement::LongTemplate(_) => {}
        }
    }
}

/// Strip one leading and one trailing `"` from `text`, when present.
///
/// ```rust
/// use stepscan::decode::trim_quotes;
///
/// assert_eq!(trim_quotes("\"quoted\""), "quoted");
/// assert_eq!(trim_quotes("\"\"twice\"\""), "\"twice\"");
/// assert_eq!(trim_quotes("bare"), "bare");
/// ```
#[must_use]
pub fn trim_quotes(text: &str) -> &str {
    let head = text.strip_prefix('"').unwrap_or(text);
    head.strip_suffix('"').unwrap_or(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn literal(elements: Vec<TemplateElement>) -> Expr {
        Expr::StringTemplate(StringTemplate {
            elements,
            raw: false,
        })
    }

    fn regular(text: &str) -> TemplateElement {
        TemplateElement::Regular(text.to_owned())
    }

    fn plus(lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinaryOp {
            lhs: Box::new(lhs),
            op: String::from("+"),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn concatenates_two_literals() {
        let expr = plus(literal(vec![regular("A")]), literal(vec![regular("B")]));
        assert_eq!(decode_step_text(&expr).as_deref(), Some("AB"));
    }

    #[test]
    fn concatenates_nested_chains_and_parentheses() {
        let expr = plus(
            plus(literal(vec![regular("a ")]), literal(vec![regular("b ")])),
            Expr::Paren(Box::new(literal(vec![regular("c")]))),
        );
        assert_eq!(decode_step_text(&expr).as_deref(), Some("a b c"));
    }

    #[test]
    fn drops_interpolations_and_keeps_escapes() {
        let expr = literal(vec![
            regular("Pay "),
            TemplateElement::ShortTemplate(String::from("amount")),
            TemplateElement::Escape('$'),
            TemplateElement::LongTemplate(String::from("a.b")),
            regular(" now"),
        ]);
        assert_eq!(decode_step_text(&expr).as_deref(), Some("Pay $ now"));
    }

    #[rstest]
    #[case(
        vec![regular("Say "), TemplateElement::Escape('"'), regular("hi"), TemplateElement::Escape('"')],
        "Say \"hi\""
    )]
    #[case(
        vec![TemplateElement::Escape('"'), regular("quoted"), TemplateElement::Escape('"'), regular(" word")],
        "\"quoted\" word"
    )]
    #[case(vec![TemplateElement::Escape('"')], "\"")]
    fn keeps_escaped_quotes_at_either_end(
        #[case] elements: Vec<TemplateElement>,
        #[case] expected: &str,
    ) {
        assert_eq!(decode_step_text(&literal(elements)).as_deref(), Some(expected));
    }

    #[test]
    fn trims_literal_quotes_around_escaped_ones() {
        let expr = literal(vec![
            regular("\""),
            TemplateElement::Escape('"'),
            regular("raw"),
            TemplateElement::Escape('"'),
            regular("\""),
        ]);
        assert_eq!(decode_step_text(&expr).as_deref(), Some("\"raw\""));
    }

    #[test]
    fn escaped_quote_in_a_concatenation_survives() {
        let expr = plus(
            literal(vec![regular("end with ")]),
            literal(vec![TemplateElement::Escape('"')]),
        );
        assert_eq!(decode_step_text(&expr).as_deref(), Some("end with \""));
    }

    #[test]
    fn empty_literal_decodes_to_empty_text() {
        assert_eq!(decode_step_text(&literal(Vec::new())).as_deref(), Some(""));
    }

    #[rstest]
    #[case(Expr::Name(vec![String::from("STEP")]))]
    #[case(Expr::Constant(String::from("1")))]
    #[case(plus(literal(vec![regular("a")]), Expr::Name(vec![String::from("B")])))]
    #[case(Expr::BinaryOp {
        lhs: Box::new(literal(vec![regular("a")])),
        op: String::from("-"),
        rhs: Box::new(literal(vec![regular("b")])),
    })]
    fn rejects_non_literal_shapes(#[case] expr: Expr) {
        assert_eq!(decode_step_text(&expr), None);
    }

    #[rstest]
    #[case("\"a\"", "a")]
    #[case("\"a", "a")]
    #[case("a\"", "a")]
    #[case("\"", "")]
    #[case("", "")]
    #[case("a \"b\" c", "a \"b\" c")]
    fn trims_a_single_quote_from_each_end(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(trim_quotes(input), expected);
    }
}
