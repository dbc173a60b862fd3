//! The structured textual representation of the AST.

use lexer::{Token, TokenKind};
use std::io::{self, Write};
use struct_::Struct;
use utility::paint::{AnsiColor, Painter};

pub use indent::Indent;

mod indent {
    use std::fmt;

    const INDENT_IN_SPACES: Repr = 4;
    type Repr = usize;

    #[derive(Clone, Copy, Default)]
    pub struct Indent(Repr);

    impl Indent {
        pub(super) fn increased(self) -> Self {
            Self(self.0 + INDENT_IN_SPACES)
        }
    }

    impl fmt::Display for Indent {
        fn fmt(&self, p: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(p, "{}", " ".repeat(self.0))
        }
    }
}

mod struct_ {
    use super::{Indent, Render, palette};
    use std::io::{self, Write};
    use utility::paint::Painter;

    pub(super) struct Struct<'p> {
        p: &'p mut Painter,
        indent: Indent,
        has_fields: bool,
        result: io::Result<()>,
    }

    impl<'p> Struct<'p> {
        pub(super) fn new(indent: Indent, p: &'p mut Painter) -> Self {
            Self {
                p,
                indent,
                has_fields: false,
                result: Ok(()),
            }
        }

        pub(super) fn name(mut self, name: &str) -> Self {
            self.result = self.result.and_then(|()| {
                self.p.set(palette::NAME.on_default().bold())?;
                write!(self.p, "{name}")?;
                self.p.unset()
            });

            self
        }

        pub(super) fn field(mut self, name: &str, field: &impl Render) -> Self {
            if !self.has_fields {
                self.has_fields = true;
                self.indent = self.indent.increased();
            }

            self.result = self.result.and_then(|()| {
                writeln!(self.p)?;
                write!(self.p, "{}", self.indent)?;
                self.p.set(palette::FIELD)?;
                write!(self.p, "{name}")?;
                self.p.unset()?;
                write!(self.p, ": ")?;
                field.render(self.indent, self.p)
            });

            self
        }

        pub(super) fn finish(self) -> io::Result<()> {
            self.result
        }
    }
}

pub trait Render {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()>;
}

impl<T: Render> Render for Option<T> {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Some(value) => value.render(indent, p),
            None => {
                p.set(palette::SPECIAL_SYMBOL)?;
                write!(p, "none")?;
                p.unset()
            }
        }
    }
}

impl<T: Render> Render for [T] {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        if self.is_empty() {
            p.set(palette::SPECIAL_SYMBOL)?;
            write!(p, "empty")?;
            return p.unset();
        }

        let mut struct_ = Struct::new(indent, p);

        for (index, element) in self.iter().enumerate() {
            struct_ = struct_.field(&index.to_string(), element);
        }

        struct_.finish()
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        (**self).render(indent, p)
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        (**self).render(indent, p)
    }
}

impl Render for bool {
    fn render(&self, _: Indent, p: &mut Painter) -> io::Result<()> {
        p.set(palette::SPECIAL_SYMBOL)?;
        write!(p, "{self}")?;
        p.unset()
    }
}

impl Render for Token {
    fn render(&self, _: Indent, p: &mut Painter) -> io::Result<()> {
        p.set(palette::SPAN)?;
        write!(p, "{} ", self.position)?;
        p.unset()?;

        let color = match self.kind {
            TokenKind::Identifier => palette::IDENTIFIER,
            _ => palette::VERBATIM,
        };
        p.set(color)?;
        write!(p, "{}", self.image)?;
        p.unset()
    }
}

impl Render for super::Posh {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Posh")
            .field("items", &self.items)
            .finish()
    }
}

impl Render for super::Item {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Function(function) => function.render(indent, p),
            Self::Import(import) => import.render(indent, p),
        }
    }
}

impl Render for super::Function {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters.parameters)
            .field("return-type", &self.return_type)
            .field("body", &self.body.statements)
            .finish()
    }
}

impl Render for super::Parameter {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Parameter")
            .field("name", &self.name)
            .field("type", &self.type_)
            .finish()
    }
}

impl Render for super::Import {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        let struct_ = Struct::new(indent, p)
            .name("Import")
            .field("path", &self.path);

        match &self.bindings {
            super::ImportBindings::All { alias } => struct_.field("all-as", alias),
            super::ImportBindings::Items(items) => struct_.field("items", items),
        }
        .finish()
    }
}

impl Render for super::ImportItem {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Import-Item")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .finish()
    }
}

impl Render for super::Statement {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Assignment(assignment) => Struct::new(indent, p)
                .name("Assignment")
                .field("target", &assignment.target)
                .field("value", &assignment.value)
                .finish(),
            Self::Call(call) => call.render(indent, p),
            Self::Return(return_) => Struct::new(indent, p)
                .name("Return")
                .field("value", &return_.value)
                .finish(),
            Self::If(if_) => if_.render(indent, p),
            Self::For(for_) => for_.render(indent, p),
            Self::Control(super::ForControl::Break) => {
                Struct::new(indent, p).name("Break").finish()
            }
            Self::Control(super::ForControl::Continue) => {
                Struct::new(indent, p).name("Continue").finish()
            }
        }
    }
}

impl Render for super::IfStatement {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("If")
            .field("condition", &self.condition)
            .field("body", &self.body.statements)
            .field("elifs", &self.elifs)
            .field("else", &self.else_.as_ref().map(|else_| &else_.body.statements))
            .finish()
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        (**self).render(indent, p)
    }
}

impl Render for super::Elif {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Elif")
            .field("condition", &self.condition)
            .field("body", &self.body.statements)
            .finish()
    }
}

impl Render for super::ForLoop {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        let struct_ = Struct::new(indent, p)
            .name("For")
            .field("key", &self.key)
            .field("value", &self.value);

        match &self.iterable {
            super::Iterable::Range(range) => struct_.field("range", range),
            super::Iterable::Expression(expression) => struct_.field("iterable", expression),
        }
        .field("body", &self.body.statements)
        .finish()
    }
}

impl Render for super::Expression {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Pipe(pipe) => Struct::new(indent, p)
                .name("Pipe")
                .field("source", &pipe.source)
                .field("stages", &pipe.stages)
                .finish(),
            Self::Range(range) => range.render(indent, p),
            Self::Simple(expression) => expression.render(indent, p),
        }
    }
}

impl Render for super::Range {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Range")
            .field("start", &self.start)
            .field("step", &self.step)
            .field("end", &self.end)
            .finish()
    }
}

impl Render for super::SimpleExpression {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Arithmetic(arithmetic) => arithmetic.render(indent, p),
            Self::Call(call) => call.render(indent, p),
            Self::Numeric(numeric) => numeric.render(indent, p),
            Self::String(text) => Struct::new(indent, p)
                .name("Text")
                .field("literal", text)
                .finish(),
            Self::Boolean(boolean) => boolean.render(indent, p),
        }
    }
}

impl Render for super::Arithmetic {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Arithmetic")
            .field("left", &self.left)
            .field("operator", &Symbol(self.operator.symbol()))
            .field("right", &self.right)
            .finish()
    }
}

impl Render for super::ArithmeticOperand {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Numeric(numeric) => numeric.render(indent, p),
            Self::Arithmetic(arithmetic) => arithmetic.render(indent, p),
        }
    }
}

impl Render for super::Boolean {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Comparison(comparison) => Struct::new(indent, p)
                .name("Comparison")
                .field("left", &comparison.left)
                .field("operator", &Symbol(comparison.operator.symbol()))
                .field("right", &comparison.right)
                .finish(),
            Self::Logical(logical) => Struct::new(indent, p)
                .name("Logical")
                .field("left", &logical.left)
                .field("operator", &Symbol(logical.operator.keyword()))
                .field("right", &logical.right)
                .finish(),
            Self::Negation(negation) => Struct::new(indent, p)
                .name("Negation")
                .field("operand", &negation.operand)
                .finish(),
            Self::Numeric(numeric) => numeric.render(indent, p),
            Self::Literal(value) => value.render(indent, p),
        }
    }
}

impl Render for super::Numeric {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Wrapped(arithmetic) => Struct::new(indent, p)
                .name("Wrapped")
                .field("arithmetic", arithmetic)
                .finish(),
            Self::DotNotation(path) => path.render(indent, p),
            Self::Integer(token) | Self::Float(token) | Self::Identifier(token) => {
                token.render(indent, p)
            }
        }
    }
}

impl Render for super::DotNotation {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        Struct::new(indent, p)
            .name("Dot-Notation")
            .field("segments", &self.segments)
            .finish()
    }
}

impl Render for super::FunctionCall {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        let struct_ = Struct::new(indent, p).name("Call");

        match &self.callee {
            super::Callee::DotNotation(path) => struct_.field("callee", path),
            super::Callee::Identifier(identifier) => struct_.field("callee", identifier),
        }
        .field("arguments", &self.arguments)
        .finish()
    }
}

impl Render for super::Argument {
    fn render(&self, indent: Indent, p: &mut Painter) -> io::Result<()> {
        match self {
            Self::Expression(expression) => expression.render(indent, p),
            Self::Flag(flag) => {
                p.set(palette::VERBATIM)?;
                write!(p, "{flag}")?;
                p.unset()
            }
        }
    }
}

struct Symbol(&'static str);

impl Render for Symbol {
    fn render(&self, _: Indent, p: &mut Painter) -> io::Result<()> {
        p.set(palette::SPECIAL_SYMBOL)?;
        write!(p, "{}", self.0)?;
        p.unset()
    }
}

mod palette {
    use super::AnsiColor;

    pub(super) const FIELD: AnsiColor = AnsiColor::BrightWhite;
    pub(super) const IDENTIFIER: AnsiColor = AnsiColor::BrightGreen;
    pub(super) const NAME: AnsiColor = AnsiColor::BrightCyan;
    pub(super) const SPAN: AnsiColor = AnsiColor::BrightBlack;
    pub(super) const SPECIAL_SYMBOL: AnsiColor = AnsiColor::BrightCyan;
    pub(super) const VERBATIM: AnsiColor = AnsiColor::Yellow;
}

#[cfg(test)]
mod test {
    use super::{Indent, Render};
    use lexer::{Token, TokenKind};
    use span::Position;
    use utility::paint::{ColorChoice, paint_to_string};

    fn render(node: &impl Render) -> String {
        paint_to_string(|p| node.render(Indent::default(), p), ColorChoice::Never)
    }

    fn identifier(image: &str, line: u32, column: u32) -> Token {
        Token::new(TokenKind::Identifier, image, Position::new(line, column))
    }

    #[test]
    fn render_assignment() {
        let assignment = crate::Statement::Assignment(crate::Assignment {
            target: identifier("x", 1, 4),
            value: crate::Expression::Simple(crate::SimpleExpression::Arithmetic(Box::new(
                crate::Arithmetic {
                    left: crate::ArithmeticOperand::Numeric(crate::Numeric::Integer(Token::new(
                        TokenKind::Integer,
                        "1",
                        Position::new(1, 8),
                    ))),
                    operator: crate::ArithmeticOperator::Add,
                    right: crate::Numeric::Identifier(identifier("y", 1, 12)),
                },
            ))),
        });

        assert_eq!(
            render(&assignment),
            "\
Assignment
    target: 2:5 x
    value: Arithmetic
        left: 2:9 1
        operator: +
        right: 2:13 y"
        );
    }

    #[test]
    fn render_empty_function() {
        let function = crate::Function {
            name: identifier("main", 0, 3),
            parameters: crate::Parameters::default(),
            return_type: None,
            body: crate::FunctionBody::default(),
        };

        assert_eq!(
            render(&function),
            "\
Function
    name: 1:4 main
    parameters: empty
    return-type: none
    body: empty"
        );
    }
}
