//! A model of the subset of Go syntax the generator emits.
//!
//! The tree is printed to source text by the [printer](crate::printer).

/// A Go source file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    /// The package-level variables, printed as a single `var` block.
    pub variables: Vec<ValueSpec>,
    pub functions: Vec<FunctionDeclaration>,
}

impl File {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            imports: Vec::new(),
            variables: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Add an import unless an identical one exists.
    pub fn import(&mut self, import: ImportSpec) {
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportSpec {
    /// The local package name, if it differs from the default one.
    pub name: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
        }
    }

    pub fn named(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: path.into(),
        }
    }

    /// Test if the imported package is part of the Go standard library.
    ///
    /// Like `goimports`, this is approximated by the absence of a dot in the first segment.
    pub fn is_standard(&self) -> bool {
        let first = self.path.split('/').next().unwrap_or_default();
        !first.contains('.')
    }
}

/// `name = value`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValueSpec {
    pub name: String,
    pub value: Expression,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Field>,
    pub result: Option<String>,
    pub body: Block,
}

/// `name type`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    pub name: String,
    pub type_: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    Expression(Expression),
    /// `name := value`
    Define {
        name: String,
        value: Expression,
    },
    /// `name := value` followed by `_ = name`.
    ///
    /// The binding shadows one of an enclosing block and may never be read.
    Shadow {
        name: String,
        value: Expression,
    },
    /// `name = value`
    Assign {
        name: String,
        value: Expression,
    },
    /// `var name type`
    VarDeclaration {
        name: String,
        type_: String,
    },
    Return(Option<Expression>),
    If(If),
    /// `for key, value := range iterable { … }`
    Range {
        key: String,
        value: Option<String>,
        iterable: Expression,
        body: Block,
    },
    Branch(Branch),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct If {
    pub condition: Expression,
    pub body: Block,
    pub else_: Option<Else>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Else {
    If(Box<If>),
    Block(Block),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Branch {
    Break,
    Continue,
}

impl Branch {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expression {
    Identifier(String),
    /// A literal in its exact source form, e.g. `42`, `1.5` or `"text"`.
    BasicLiteral(String),
    Selector {
        operand: Box<Expression>,
        selector: String,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    /// An empty composite literal `Type{}`.
    CompositeLiteral { type_: String },
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// A string literal with the given content which must not need escaping.
    pub fn string(content: impl std::fmt::Display) -> Self {
        Self::BasicLiteral(format!("\"{content}\""))
    }

    pub fn select(self, selector: impl Into<String>) -> Self {
        Self::Selector {
            operand: Box::new(self),
            selector: selector.into(),
        }
    }

    pub fn call(self, arguments: Vec<Expression>) -> Self {
        Self::Call {
            callee: Box::new(self),
            arguments,
        }
    }

    /// `package.member`
    pub fn qualified(package: &str, member: &str) -> Self {
        Self::identifier(package).select(member)
    }

    pub fn binary(left: Self, operator: BinaryOperator, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Self) -> Self {
        Self::Unary {
            operator,
            operand: Box::new(operand),
        }
    }
}

/// A binary operator named after its token in the Go standard library package `go/token`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Quo,
    Gtr,
    Lss,
    Geq,
    Leq,
    Eql,
    Neq,
    LAnd,
    LOr,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Gtr => ">",
            Self::Lss => "<",
            Self::Geq => ">=",
            Self::Leq => "<=",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::LAnd => "&&",
            Self::LOr => "||",
        }
    }

    /// The binding strength of the operator as defined by the Go language.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::LOr => 1,
            Self::LAnd => 2,
            Self::Gtr | Self::Lss | Self::Geq | Self::Leq | Self::Eql | Self::Neq => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Quo => 5,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `&`
    AddressOf,
}

impl UnaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::AddressOf => "&",
        }
    }
}
