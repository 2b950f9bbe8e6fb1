//! Declarations, annotations, parameters, and type references.

use super::lexer::TokenKind;
use super::{ParseError, ParseErrorKind, Parser};
use crate::ast::{
    Annotation, AnnotationSet, ClassDecl, ClassKind, Declaration, FunctionDecl, KotlinFile,
    Parameter, TypeRef,
};

/// Soft keywords treated as modifiers when another name or annotation
/// follows them.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "abstract",
    "final",
    "open",
    "override",
    "sealed",
    "data",
    "enum",
    "inner",
    "annotation",
    "companion",
    "lateinit",
    "const",
    "suspend",
    "inline",
    "noinline",
    "crossinline",
    "tailrec",
    "operator",
    "infix",
    "external",
    "vararg",
    "reified",
    "expect",
    "actual",
    "value",
];

const DECLARATION_KEYWORDS: &[&str] = &[
    "fun",
    "class",
    "interface",
    "object",
    "val",
    "var",
    "typealias",
    "init",
    "constructor",
];

type Modifiers = (Vec<AnnotationSet>, Vec<String>);

impl Parser<'_> {
    pub(super) fn file(mut self) -> Result<KotlinFile, ParseError> {
        let mut file = KotlinFile::default();
        while self.at_symbol("@")
            && self.peek_at(1).is_some_and(|token| token.is_identifier("file"))
            && self.peek_at(2).is_some_and(|token| token.is_symbol(":"))
        {
            self.annotation_set()?;
        }
        if self.eat_identifier("package") {
            file.package = Some(self.qualified_name()?);
            self.eat_symbol(";");
        }
        while self.eat_identifier("import") {
            let mut name = self.qualified_name()?;
            if self.eat_identifier("as") {
                name.push_str(" as ");
                name.push_str(&self.expect_identifier("an import alias")?);
            }
            file.imports.push(name);
            self.eat_symbol(";");
        }
        file.declarations = self.declarations(false)?;
        Ok(file)
    }

    fn qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier("a name")?;
        while self.at_symbol(".") {
            let Some(next) = self.peek_at(1) else { break };
            let segment = if next.is_symbol("*") {
                String::from("*")
            } else if let Some(ident) = next.identifier() {
                ident.to_owned()
            } else {
                break;
            };
            self.bump();
            self.bump();
            name.push('.');
            name.push_str(&segment);
        }
        Ok(name)
    }

    /// Parse declarations until end of input, or until the closing `}` of
    /// the enclosing body when `nested` is set.
    fn declarations(&mut self, nested: bool) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        while let Some(token) = self.peek() {
            if token.is_symbol("}") {
                if nested {
                    break;
                }
                return Err(self.unexpected("a declaration"));
            }
            if token.is_symbol(";") {
                self.bump();
                continue;
            }
            declarations.push(self.declaration()?);
        }
        Ok(declarations)
    }

    fn declaration(&mut self) -> Result<Declaration, ParseError> {
        let first = self.pos;
        let modifiers = self.modifiers()?;
        let keyword = self.peek_identifier().unwrap_or_default();
        match keyword.as_str() {
            "fun" if self.peek_at(1).is_some_and(|token| token.is_identifier("interface")) => {
                self.bump();
                Ok(Declaration::Class(self.class(modifiers)?))
            }
            "fun" => Ok(Declaration::Function(self.function(first, modifiers)?)),
            "class" | "interface" | "object" => Ok(Declaration::Class(self.class(modifiers)?)),
            "val" | "var" => self.property(),
            "typealias" => {
                self.bump();
                let name = self.expect_identifier("an alias name")?;
                self.skip_statement()?;
                Ok(Declaration::TypeAlias { name })
            }
            "init" | "constructor" => {
                self.bump();
                self.skip_statement()?;
                Ok(Declaration::Other)
            }
            _ => {
                if self.pos == first {
                    self.skip_token_tree()?;
                }
                self.skip_statement()?;
                Ok(Declaration::Other)
            }
        }
    }

    /// Whether the current token opens a new declaration.
    fn starts_declaration(&self) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        if token.is_symbol("@") {
            return true;
        }
        token.identifier().is_some_and(|name| {
            DECLARATION_KEYWORDS.contains(&name) || (MODIFIERS.contains(&name) && self.modifier_follows())
        })
    }

    fn modifier_follows(&self) -> bool {
        self.peek_at(1)
            .is_some_and(|next| next.identifier().is_some() || next.is_symbol("@"))
    }

    /// Skip to the end of the current statement: a `;`, the enclosing `}`, or
    /// a new declaration at the start of a line.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        while let Some(token) = self.peek() {
            if token.is_symbol("}") || token.is_symbol(";") {
                break;
            }
            if token.line_start && self.starts_declaration() {
                break;
            }
            self.skip_token_tree()?;
        }
        Ok(())
    }

    fn modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            if self.at_symbol("@") {
                annotations.push(self.annotation_set()?);
                continue;
            }
            match self.peek_identifier() {
                Some(name) if MODIFIERS.contains(&name.as_str()) && self.modifier_follows() => {
                    modifiers.push(name);
                    self.bump();
                }
                _ => return Ok((annotations, modifiers)),
            }
        }
    }

    fn annotation_set(&mut self) -> Result<AnnotationSet, ParseError> {
        self.expect_symbol("@")?;
        let target = match self.peek_identifier() {
            Some(name) if self.peek_at(1).is_some_and(|token| token.is_symbol(":")) => {
                self.bump();
                self.bump();
                Some(name)
            }
            _ => None,
        };
        if self.at_symbol("[") {
            let opening = self.pos;
            self.bump();
            let mut annotations = Vec::new();
            while !self.eat_symbol("]") {
                if self.peek().is_none() {
                    return Err(self.error_at(opening, ParseErrorKind::Unclosed { open: "[" }));
                }
                annotations.push(self.annotation()?);
            }
            return Ok(AnnotationSet {
                target,
                annotations,
                bracketed: true,
            });
        }
        Ok(AnnotationSet {
            target,
            annotations: vec![self.annotation()?],
            bracketed: false,
        })
    }

    fn annotation(&mut self) -> Result<Annotation, ParseError> {
        let mut names = vec![self.expect_identifier("an annotation name")?];
        while self.at_symbol(".") && self.peek_at(1).and_then(|token| token.identifier()).is_some()
        {
            self.bump();
            names.push(self.expect_identifier("an annotation name")?);
        }
        if self.at_symbol("<") {
            self.skip_balanced("<", ">")?;
        }
        let args = if self.at_symbol("(") {
            self.value_arguments()?
        } else {
            Vec::new()
        };
        Ok(Annotation { names, args })
    }

    fn function(
        &mut self,
        first: usize,
        (annotations, modifiers): Modifiers,
    ) -> Result<FunctionDecl, ParseError> {
        self.bump();
        let type_parameters = if self.at_symbol("<") {
            let start = self.pos;
            self.skip_balanced("<", ">")?;
            Some(self.source_text(start, self.pos))
        } else {
            None
        };
        let (receiver, name) = self.function_name()?;
        let parameters = self.parameters()?;
        let return_type = if self.eat_symbol(":") {
            Some(self.type_ref()?)
        } else {
            None
        };
        if self.eat_identifier("where") {
            self.skip_where_clause();
        }
        let has_body = if self.at_symbol("{") {
            self.skip_balanced("{", "}")?;
            true
        } else if self.eat_symbol("=") {
            self.skip_statement()?;
            true
        } else {
            false
        };
        let span = self.span_from(first)?;
        Ok(FunctionDecl {
            annotations,
            modifiers,
            type_parameters,
            receiver,
            name,
            parameters,
            return_type,
            has_body,
            span,
        })
    }

    /// Read an optional receiver type followed by the function name.
    fn function_name(&mut self) -> Result<(Option<TypeRef>, String), ParseError> {
        let receiver_start = self.pos;
        if self.at_symbol("(") {
            self.skip_balanced("(", ")")?;
        }
        loop {
            let Some(token) = self.peek() else {
                return Err(self.unexpected("a function name"));
            };
            if token.identifier().is_some() && self.peek_at(1).is_some_and(|next| next.is_symbol("(")) {
                break;
            }
            if token.is_symbol("<") {
                self.skip_balanced("<", ">")?;
                continue;
            }
            if ["{", "}", "=", ";", "("].iter().any(|stop| token.is_symbol(stop)) {
                return Err(self.unexpected("a function name"));
            }
            self.bump();
        }
        let name_index = self.pos;
        let name = self.expect_identifier("a function name")?;
        let receiver = match name_index.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(separator) if name_index > receiver_start => {
                let mut text = self.source_text(receiver_start, name_index - 1);
                if separator.is_symbol("?.") {
                    text.push('?');
                }
                Some(TypeRef::new(text))
            }
            _ => None,
        };
        Ok((receiver, name))
    }

    fn skip_where_clause(&mut self) {
        while let Some(token) = self.peek() {
            if ["{", "}", "=", ";"].iter().any(|stop| token.is_symbol(stop))
                || (token.line_start && self.starts_declaration())
            {
                break;
            }
            self.bump();
        }
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.expect_symbol("(")?;
        let mut parameters = Vec::new();
        while !self.eat_symbol(")") {
            parameters.push(self.parameter()?);
            if !self.eat_symbol(",") {
                self.expect_symbol(")")?;
                break;
            }
        }
        Ok(parameters)
    }

    fn parameter(&mut self) -> Result<Parameter, ParseError> {
        let first = self.pos;
        let (annotations, modifiers) = self.modifiers()?;
        let name = self.expect_identifier("a parameter name")?;
        self.expect_symbol(":")?;
        let ty = self.type_ref()?;
        let default = if self.eat_symbol("=") {
            let start = self.pos;
            self.skip_default_value()?;
            Some(self.source_text(start, self.pos))
        } else {
            None
        };
        let span = self.span_from(first)?;
        Ok(Parameter {
            annotations,
            modifiers,
            name,
            ty,
            default,
            span,
        })
    }

    fn skip_default_value(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        while let Some(token) = self.peek() {
            if token.is_symbol(",") || token.is_symbol(")") {
                break;
            }
            if token.is_symbol("<") && self.type_arguments_ahead() {
                self.skip_balanced("<", ">")?;
            } else {
                self.skip_token_tree()?;
            }
        }
        if self.pos == start {
            return Err(self.unexpected("a default value"));
        }
        Ok(())
    }

    /// Whether the `<` at the cursor opens explicit type arguments, as in
    /// `mapOf<String, Int>()`, rather than a comparison.
    fn type_arguments_ahead(&self) -> bool {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match &token.kind {
                TokenKind::Symbol("<") => depth += 1,
                TokenKind::Symbol(">") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.tokens.get(index + 1).is_some_and(|next| {
                            ["(", "{", ".", "?.", "::"]
                                .iter()
                                .any(|symbol| next.is_symbol(symbol))
                        });
                    }
                }
                TokenKind::Identifier(_)
                | TokenKind::Symbol("," | "." | "?" | "*" | "(" | ")" | "->" | "@" | ":") => {}
                _ => return false,
            }
        }
        false
    }

    pub(super) fn type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.pos;
        self.skip_type()?;
        Ok(TypeRef::new(self.source_text(start, self.pos)))
    }

    fn skip_type(&mut self) -> Result<(), ParseError> {
        loop {
            if self.at_symbol("@") {
                self.annotation_set()?;
            } else if self.at_identifier("suspend")
                && self.peek_at(1).is_some_and(|token| token.is_symbol("("))
            {
                self.bump();
            } else {
                break;
            }
        }
        if self.at_symbol("(") {
            self.skip_balanced("(", ")")?;
            if self.eat_symbol("->") {
                return self.skip_type();
            }
        } else {
            self.skip_user_type()?;
            if self.at_symbol(".") && self.peek_at(1).is_some_and(|token| token.is_symbol("(")) {
                self.bump();
                self.skip_balanced("(", ")")?;
                self.expect_symbol("->")?;
                return self.skip_type();
            }
        }
        while self.eat_symbol("?") {}
        Ok(())
    }

    fn skip_user_type(&mut self) -> Result<(), ParseError> {
        if !self.eat_symbol("*") {
            self.expect_identifier("a type")?;
        }
        loop {
            if self.at_symbol("<") {
                self.skip_balanced("<", ">")?;
            }
            if self.at_symbol(".") && self.peek_at(1).and_then(|token| token.identifier()).is_some() {
                self.bump();
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn class(&mut self, (annotations, modifiers): Modifiers) -> Result<ClassDecl, ParseError> {
        let kind = match self.peek_identifier().as_deref() {
            Some("interface") => ClassKind::Interface,
            Some("object") => ClassKind::Object,
            _ => ClassKind::Class,
        };
        self.bump();
        let name = self.peek_identifier();
        if name.is_some() {
            self.bump();
        }
        self.skip_class_header()?;
        let declarations = if self.at_symbol("{") {
            let opening = self.pos;
            self.bump();
            let body = self.declarations(true)?;
            if !self.eat_symbol("}") {
                return Err(self.error_at(opening, ParseErrorKind::Unclosed { open: "{" }));
            }
            body
        } else {
            Vec::new()
        };
        Ok(ClassDecl {
            kind,
            name,
            modifiers,
            annotations,
            declarations,
        })
    }

    /// Skip type parameters, constructors, and supertypes up to the body.
    fn skip_class_header(&mut self) -> Result<(), ParseError> {
        while let Some(token) = self.peek() {
            if ["{", "}", ";"].iter().any(|stop| token.is_symbol(stop))
                || (token.line_start && self.starts_declaration())
            {
                break;
            }
            if token.is_symbol("<") {
                self.skip_balanced("<", ">")?;
            } else {
                self.skip_token_tree()?;
            }
        }
        Ok(())
    }

    fn property(&mut self) -> Result<Declaration, ParseError> {
        self.bump();
        if self.at_symbol("<") {
            self.skip_balanced("<", ">")?;
        }
        let mut name = String::new();
        if self.at_symbol("(") {
            self.skip_balanced("(", ")")?;
        } else {
            while let Some(ident) = self.peek_identifier() {
                self.bump();
                name = ident;
                if self.at_symbol("<") {
                    self.skip_balanced("<", ">")?;
                }
                let receiver_dot = (self.at_symbol(".") || self.at_symbol("?."))
                    && self.peek_at(1).and_then(|token| token.identifier()).is_some();
                if !receiver_dot {
                    break;
                }
                self.bump();
            }
        }
        self.skip_statement()?;
        Ok(Declaration::Property { name })
    }
}
