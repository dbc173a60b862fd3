//! The abstract syntax tree (AST).
//!
//! The tree is built bottom-up by the parser and never mutated afterwards.
//! Every node owns its children. Leaves are the tokens they were parsed from.
//!
//! The most important definitions are [`Item`], [`Statement`] and [`Expression`].

use lexer::Token;
use std::fmt;

pub use render::Render;

pub mod render;

/// The root of a compilation unit.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Posh {
    pub items: Vec<Item>,
}

impl Posh {
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            Item::Import(_) => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(import) => Some(import),
            Item::Function(_) => None,
        })
    }
}

/// A top-level declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Item {
    Function(Function),
    Import(Import),
}

/// A function declaration.
///
/// # Examples
///
/// ```posh
/// fn add(a int, b int) int {
///     return a + b
/// }
/// ```
///
/// * `add` is the *name*
/// * `a int` and `b int` are the *parameters*
/// * `int` following the parameters is the *return type*
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Function {
    pub name: Token,
    pub parameters: Parameters,
    pub return_type: Option<Token>,
    pub body: FunctionBody,
}

impl Function {
    pub fn is_program_entry(&self) -> bool {
        self.name.image == utility::PROGRAM_ENTRY
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Parameters {
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Parameter {
    pub name: Token,
    pub type_: Token,
}

/// An import of another module.
///
/// # Examples
///
/// ```posh
/// from "/lib/util.posh" import helper, other as alias
/// from "/lib/util.posh" import * as util
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Import {
    /// The text literal naming the module.
    pub path: Token,
    pub bindings: ImportBindings,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ImportBindings {
    All { alias: Token },
    Items(Vec<ImportItem>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportItem {
    pub name: Token,
    pub alias: Option<Token>,
}

impl ImportItem {
    /// The name the item is bound to in the importing module.
    pub fn binder(&self) -> &Token {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// The body of a function or of a branch of an if statement.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct FunctionBody {
    pub statements: Vec<Statement>,
}

/// The body of a for loop which may additionally contain loop control statements.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ForBody {
    pub statements: Vec<Statement>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    Assignment(Assignment),
    Call(FunctionCall),
    Return(ReturnStatement),
    If(IfStatement),
    For(ForLoop),
    Control(ForControl),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assignment {
    pub target: Token,
    pub value: Expression,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IfStatement {
    pub condition: Boolean,
    pub body: FunctionBody,
    pub elifs: Vec<Elif>,
    pub else_: Option<Else>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Elif {
    pub condition: Boolean,
    pub body: FunctionBody,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Else {
    pub body: FunctionBody,
}

/// A for loop.
///
/// # Examples
///
/// ```posh
/// for index, line in lines { }
/// for i in 0, 2..10 { }
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ForLoop {
    pub key: Token,
    pub value: Option<Token>,
    pub iterable: Iterable,
    pub body: ForBody,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Iterable {
    Range(Range),
    Expression(Expression),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ForControl {
    Break,
    Continue,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expression {
    Pipe(Pipe),
    Range(Range),
    Simple(SimpleExpression),
}

/// A chain of commands each receiving the output of the previous one.
///
/// # Examples
///
/// ```posh
/// echo("hi") | tr("a", "b") | lolcat()
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Pipe {
    pub source: SimpleExpression,
    /// There is at least one stage.
    pub stages: Vec<FunctionCall>,
}

/// A lazy sequence of numbers.
///
/// The step defaults to one. Without an end, the range is unbounded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Range {
    pub start: Numeric,
    pub step: Option<Numeric>,
    pub end: Option<Numeric>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SimpleExpression {
    Arithmetic(Box<Arithmetic>),
    Call(FunctionCall),
    Numeric(Numeric),
    String(Token),
    Boolean(Boolean),
}

/// A left-leaning chain of arithmetic operations.
///
/// All operators share the same precedence: `a + b * c` means `(a + b) * c`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Arithmetic {
    pub left: ArithmeticOperand,
    pub operator: ArithmeticOperator,
    pub right: Numeric,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ArithmeticOperand {
    Numeric(Numeric),
    Arithmetic(Box<Arithmetic>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Comparison {
    pub left: Numeric,
    pub operator: ComparisonOperator,
    pub right: Numeric,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComparisonOperator {
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl ComparisonOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Logical {
    pub left: Boolean,
    pub operator: LogicalOperator,
    pub right: Boolean,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Negation {
    pub operand: Boolean,
}

/// A value in boolean position.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Boolean {
    Comparison(Box<Comparison>),
    /// A logical connective or a folded comparison chain.
    Logical(Box<Logical>),
    Negation(Box<Negation>),
    Numeric(Numeric),
    Literal(bool),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Numeric {
    /// A parenthesized arithmetic expression.
    Wrapped(Box<Arithmetic>),
    DotNotation(DotNotation),
    Integer(Token),
    Float(Token),
    Identifier(Token),
}

/// A path of at least two identifiers separated by dots.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DotNotation {
    pub segments: Vec<Token>,
}

impl DotNotation {
    pub fn head(&self) -> &Token {
        &self.segments[0]
    }
}

impl fmt::Display for DotNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use joinery::JoinableIterator;

        write!(
            f,
            "{}",
            self.segments
                .iter()
                .map(|segment| &segment.image)
                .join_with(".")
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FunctionCall {
    pub callee: Callee,
    pub arguments: Vec<Argument>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Callee {
    DotNotation(DotNotation),
    Identifier(Token),
}

impl Callee {
    /// The first identifier of the callee.
    pub fn head(&self) -> &Token {
        match self {
            Self::DotNotation(path) => path.head(),
            Self::Identifier(identifier) => identifier,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Argument {
    Expression(SimpleExpression),
    Flag(Flag),
}

/// A command line flag like `-l` or `--all`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Flag {
    pub long: bool,
    pub name: Token,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dashes = if self.long { "--" } else { "-" };
        write!(f, "{dashes}{}", self.name.image)
    }
}
