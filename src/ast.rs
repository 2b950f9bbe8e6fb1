//! Kotlin declaration syntax tree.
//!
//! The parser in [`crate::parser`] produces these structures. They model the
//! declaration level of a Kotlin file: classes and objects, functions with
//! their parameters and annotations, and the constant expressions that may
//! appear as annotation arguments. Function bodies and property initialisers
//! are not represented.
//!
//! Function and parameter nodes carry a [`SourceSpan`] populated while the
//! node is constructed, so consumers never need to revisit the source text to
//! locate them.
//!
//! ```rust
//! use stepscan::ast::Declaration;
//! use stepscan::parser::parse_file;
//!
//! let file = parse_file("class Steps {\n    fun go() {}\n}", "Steps.kt").expect("parse");
//! let Some(Declaration::Class(class)) = file.declarations.first() else {
//!     panic!("expected class");
//! };
//! assert_eq!(class.name.as_deref(), Some("Steps"));
//! ```

use crate::position::SourceSpan;
use std::fmt;

/// A parsed Kotlin source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KotlinFile {
    /// Dotted package name from the `package` header.
    pub package: Option<String>,
    /// Imported names, including any `.*` suffix or `as` alias.
    pub imports: Vec<String>,
    /// Top-level declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// A declaration within a file or class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Class, interface, or object declaration.
    Class(ClassDecl),
    /// Named function declaration.
    Function(FunctionDecl),
    /// Property declared with `val` or `var`.
    Property {
        /// Property name; empty for destructuring declarations.
        name: String,
    },
    /// `typealias` declaration.
    TypeAlias {
        /// Alias name.
        name: String,
    },
    /// `init` block, secondary constructor, enum entries, or script
    /// statements that carry no declaration of interest.
    Other,
}

/// Flavour of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// `class`, including `data`, `enum`, and other modified classes.
    Class,
    /// `interface` or `fun interface`.
    Interface,
    /// `object` or `companion object`.
    Object,
}

/// Class, interface, or object declaration with its member declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Declaration flavour.
    pub kind: ClassKind,
    /// Declared name; absent for anonymous companion objects.
    pub name: Option<String>,
    /// Modifier keywords preceding the declaration keyword.
    pub modifiers: Vec<String>,
    /// Annotations attached to the declaration.
    pub annotations: Vec<AnnotationSet>,
    /// Member declarations from the class body.
    pub declarations: Vec<Declaration>,
}

/// Named function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Annotations attached to the function, in declaration order.
    pub annotations: Vec<AnnotationSet>,
    /// Modifier keywords such as `override` or `suspend`.
    pub modifiers: Vec<String>,
    /// Raw type parameter list including angle brackets, e.g. `<T>`.
    pub type_parameters: Option<String>,
    /// Receiver type of an extension function.
    pub receiver: Option<TypeRef>,
    /// Function name.
    pub name: String,
    /// Formal parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Declared return type.
    pub return_type: Option<TypeRef>,
    /// Whether the function has a block or expression body.
    pub has_body: bool,
    /// Extent of the declaration, annotations included.
    pub span: SourceSpan,
}

/// A formal function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Annotations attached to the parameter.
    pub annotations: Vec<AnnotationSet>,
    /// Parameter modifiers such as `vararg`.
    pub modifiers: Vec<String>,
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Default value source text, whitespace-normalised.
    pub default: Option<String>,
    /// Extent of the parameter declaration.
    pub span: SourceSpan,
}

/// Literal type text as written in the source, whitespace-normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(String);

impl TypeRef {
    /// Wrap normalised type text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// View the type text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `@...` annotation site, which may hold several annotations when the
/// `@[A B]` form is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    /// Use-site target such as `get` or `file`.
    pub target: Option<String>,
    /// Annotations applied at this site.
    pub annotations: Vec<Annotation>,
    /// Whether the bracketed `@[...]` form was used.
    pub bracketed: bool,
}

/// A single annotation invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Dotted name segments, e.g. `["com", "example", "Step"]`.
    pub names: Vec<String>,
    /// Value arguments; empty when the annotation has no argument list.
    pub args: Vec<ValueArg>,
}

/// An argument passed to an annotation or call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueArg {
    /// Argument name for `name = value` arguments.
    pub name: Option<String>,
    /// Whether the argument uses the `*` spread operator.
    pub spread: bool,
    /// Argument expression.
    pub expr: Expr,
}

/// Expressions that may appear as annotation arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// String literal, possibly with template entries.
    StringTemplate(StringTemplate),
    /// Binary operation such as `"a" + "b"`.
    BinaryOp {
        /// Left operand.
        lhs: Box<Self>,
        /// Operator token text.
        op: String,
        /// Right operand.
        rhs: Box<Self>,
    },
    /// Prefix operation such as `-1` or `!flag`.
    Unary {
        /// Operator token text.
        op: String,
        /// Operand.
        expr: Box<Self>,
    },
    /// Parenthesised expression.
    Paren(Box<Self>),
    /// Possibly qualified name reference.
    Name(Vec<String>),
    /// Numeric, character, boolean, or `null` literal, as written.
    Constant(String),
    /// Call expression such as `arrayOf("a")`.
    Call {
        /// Called expression.
        callee: Box<Self>,
        /// Call arguments.
        args: Vec<ValueArg>,
    },
    /// Member access on a non-name receiver.
    Member {
        /// Receiver expression.
        receiver: Box<Self>,
        /// Accessed member.
        name: String,
    },
    /// Callable or class reference such as `Foo::class`.
    Reference {
        /// Receiver, absent for `::name`.
        receiver: Option<Box<Self>>,
        /// Referenced member.
        name: String,
    },
    /// Collection literal `[a, b]`.
    Collection(Vec<Self>),
    /// Any other expression, kept as whitespace-normalised source text.
    Other(String),
}

/// A string literal split into its template elements.
///
/// Delimiting quotes are not part of any element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTemplate {
    /// Elements in source order.
    pub elements: Vec<TemplateElement>,
    /// Whether the literal is a raw `"""` string.
    pub raw: bool,
}

/// One element of a string template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateElement {
    /// Literal text.
    Regular(String),
    /// Escape sequence, stored as the character it denotes.
    Escape(char),
    /// `$name` interpolation.
    ShortTemplate(String),
    /// `${expression}` interpolation, holding the expression source text.
    LongTemplate(String),
}
