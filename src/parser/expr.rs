//! Annotation argument expressions.
//!
//! Binary operators are parsed by precedence climbing over the table below.
//! Lambdas and other statement-level constructs are kept as source text in
//! [`Expr::Other`].

use super::lexer::TokenKind;
use super::{ParseError, Parser};
use crate::ast::{Expr, ValueArg};

/// Binary operators and their binding power; higher binds tighter.
const BINARY_OPERATORS: &[(&str, u8)] = &[
    ("||", 1),
    ("&&", 2),
    ("==", 3),
    ("!=", 3),
    ("===", 3),
    ("!==", 3),
    ("<", 4),
    (">", 4),
    ("<=", 4),
    (">=", 4),
    ("?:", 5),
    ("..", 6),
    ("..<", 6),
    ("+", 7),
    ("-", 7),
    ("*", 8),
    ("/", 8),
    ("%", 8),
];

const PREFIX_OPERATORS: &[&str] = &["-", "+", "!"];

impl Parser<'_> {
    /// Parse a parenthesised argument list, allowing a trailing comma.
    pub(super) fn value_arguments(&mut self) -> Result<Vec<ValueArg>, ParseError> {
        self.expect_symbol("(")?;
        let mut args = Vec::new();
        while !self.eat_symbol(")") {
            args.push(self.value_argument()?);
            if !self.eat_symbol(",") {
                self.expect_symbol(")")?;
                break;
            }
        }
        Ok(args)
    }

    fn value_argument(&mut self) -> Result<ValueArg, ParseError> {
        let name = match self.peek_identifier() {
            Some(name) if self.peek_at(1).is_some_and(|token| token.is_symbol("=")) => {
                self.bump();
                self.bump();
                Some(name)
            }
            _ => None,
        };
        let spread = self.eat_symbol("*");
        let expr = self.expression()?;
        Ok(ValueArg { name, spread, expr })
    }

    pub(super) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.binary(0)
    }

    fn binary_operator(&self) -> Option<(&'static str, u8)> {
        match self.peek()?.kind {
            TokenKind::Symbol(symbol) => BINARY_OPERATORS
                .iter()
                .copied()
                .find(|&(op, _)| op == symbol),
            _ => None,
        }
    }

    fn binary(&mut self, min_power: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.prefix()?;
        while let Some((op, power)) = self.binary_operator() {
            if power <= min_power {
                break;
            }
            self.bump();
            let rhs = self.binary(power)?;
            lhs = Expr::BinaryOp {
                lhs: Box::new(lhs),
                op: op.to_owned(),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = PREFIX_OPERATORS.iter().find(|op| self.at_symbol(op)) {
            self.bump();
            let operand = self.prefix()?;
            return Ok(Expr::Unary {
                op: (*op).to_owned(),
                expr: Box::new(operand),
            });
        }
        let mut expr = self.primary()?;
        loop {
            if self.at_symbol(".") || self.at_symbol("?.") {
                let safe = self.at_symbol("?.");
                let Some(member) = self
                    .peek_at(1)
                    .and_then(|token| token.identifier())
                    .map(str::to_owned)
                else {
                    break;
                };
                self.bump();
                self.bump();
                expr = match expr {
                    Expr::Name(mut segments) if !safe => {
                        segments.push(member);
                        Expr::Name(segments)
                    }
                    receiver => Expr::Member {
                        receiver: Box::new(receiver),
                        name: member,
                    },
                };
            } else if self.at_symbol("(") {
                let args = self.value_arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat_symbol("::") {
                let name = self.expect_identifier("a member reference")?;
                expr = Expr::Reference {
                    receiver: Some(Box::new(expr)),
                    name,
                };
            } else {
                return Ok(expr);
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(kind) = self.peek().map(|token| token.kind.clone()) else {
            return Err(self.unexpected("an expression"));
        };
        match kind {
            TokenKind::String(template) => {
                self.bump();
                Ok(Expr::StringTemplate(template))
            }
            TokenKind::Number(text) | TokenKind::Char(text) => {
                self.bump();
                Ok(Expr::Constant(text))
            }
            TokenKind::Identifier(name) => {
                self.bump();
                if matches!(name.as_str(), "true" | "false" | "null") {
                    Ok(Expr::Constant(name))
                } else {
                    Ok(Expr::Name(vec![name]))
                }
            }
            TokenKind::Symbol("(") => {
                self.bump();
                let inner = self.expression()?;
                self.expect_symbol(")")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::Symbol("[") => {
                self.bump();
                let mut items = Vec::new();
                while !self.eat_symbol("]") {
                    items.push(self.expression()?);
                    if !self.eat_symbol(",") {
                        self.expect_symbol("]")?;
                        break;
                    }
                }
                Ok(Expr::Collection(items))
            }
            TokenKind::Symbol("::") => {
                self.bump();
                let name = self.expect_identifier("a member reference")?;
                Ok(Expr::Reference {
                    receiver: None,
                    name,
                })
            }
            TokenKind::Symbol("{") => {
                let start = self.pos;
                self.skip_balanced("{", "}")?;
                Ok(Expr::Other(self.source_text(start, self.pos)))
            }
            TokenKind::Symbol(_) => Err(self.unexpected("an expression")),
        }
    }
}
