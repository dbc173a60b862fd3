//! The printer serializing a [Go syntax tree](crate::go) to source text.
//!
//! The output is laid out the way `gofmt` lays out declarations and statements.
//! Binary operators are always surrounded by single spaces and parentheses are only
//! inserted where the precedence of the operators requires them.

use crate::go::{
    Block, Else, Expression, Field, File, FunctionDeclaration, If, ImportSpec, Statement,
    ValueSpec,
};
use joinery::JoinableIterator;
use std::fmt::{self, Display, Formatter};

impl Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.package)?;

        if !self.imports.is_empty() {
            writeln!(f)?;
            write_imports(&self.imports, f)?;
        }

        if !self.variables.is_empty() {
            writeln!(f)?;
            write_variables(&self.variables, f)?;
        }

        for function in &self.functions {
            writeln!(f)?;
            write_function(function, f)?;
        }

        Ok(())
    }
}

fn write_imports(imports: &[ImportSpec], f: &mut Formatter<'_>) -> fmt::Result {
    let mut groups: [Vec<&ImportSpec>; 2] = [Vec::new(), Vec::new()];

    for import in imports {
        groups[usize::from(!import.is_standard())].push(import);
    }

    writeln!(f, "import (")?;

    let groups = groups.iter_mut().filter(|group| !group.is_empty());

    for (index, group) in groups.enumerate() {
        if index != 0 {
            writeln!(f)?;
        }

        group.sort_by(|left, right| left.path.cmp(&right.path));

        for import in group.iter() {
            match &import.name {
                Some(name) => writeln!(f, "\t{name} \"{}\"", import.path)?,
                None => writeln!(f, "\t\"{}\"", import.path)?,
            }
        }
    }

    writeln!(f, ")")
}

fn write_variables(variables: &[ValueSpec], f: &mut Formatter<'_>) -> fmt::Result {
    let width = variables
        .iter()
        .map(|variable| variable.name.chars().count())
        .max()
        .unwrap_or_default();

    writeln!(f, "var (")?;

    for variable in variables {
        writeln!(f, "\t{:width$} = {}", variable.name, variable.value)?;
    }

    writeln!(f, ")")
}

fn write_function(function: &FunctionDeclaration, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
        f,
        "func {}({})",
        function.name,
        function.parameters.iter().join_with(", ")
    )?;

    if let Some(result) = &function.result {
        write!(f, " {result}")?;
    }

    write!(f, " ")?;
    write_block(&function.body, 0, f)?;
    writeln!(f)
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_)
    }
}

/// Write a block whose opening brace is on the current line.
///
/// The closing brace is indented by the given level, the statements one level deeper.
fn write_block(block: &Block, indentation: usize, f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "{{")?;

    for statement in &block.statements {
        write_statement(statement, indentation + 1, f)?;
    }

    write_indentation(indentation, f)?;
    write!(f, "}}")
}

fn write_statement(
    statement: &Statement,
    indentation: usize,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    write_indentation(indentation, f)?;

    match statement {
        Statement::Expression(expression) => write!(f, "{expression}")?,
        Statement::Define { name, value } => write!(f, "{name} := {value}")?,
        Statement::Shadow { name, value } => {
            writeln!(f, "{name} := {value}")?;
            write_indentation(indentation, f)?;
            write!(f, "_ = {name}")?;
        }
        Statement::Assign { name, value } => write!(f, "{name} = {value}")?,
        Statement::VarDeclaration { name, type_ } => write!(f, "var {name} {type_}")?,
        Statement::Return(None) => write!(f, "return")?,
        Statement::Return(Some(value)) => write!(f, "return {value}")?,
        Statement::If(if_) => write_if(if_, indentation, f)?,
        Statement::Range {
            key,
            value,
            iterable,
            body,
        } => {
            write!(f, "for {key}")?;
            if let Some(value) = value {
                write!(f, ", {value}")?;
            }
            write!(f, " := range {iterable} ")?;
            write_block(body, indentation, f)?;
        }
        Statement::Branch(branch) => write!(f, "{}", branch.keyword())?,
    }

    writeln!(f)
}

fn write_if(if_: &If, indentation: usize, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "if {} ", if_.condition)?;
    write_block(&if_.body, indentation, f)?;

    match &if_.else_ {
        Some(Else::If(if_)) => {
            write!(f, " else ")?;
            write_if(if_, indentation, f)
        }
        Some(Else::Block(block)) => {
            write!(f, " else ")?;
            write_block(block, indentation, f)
        }
        None => Ok(()),
    }
}

fn write_indentation(indentation: usize, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", "\t".repeat(indentation))
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{name}"),
            Self::BasicLiteral(literal) => write!(f, "{literal}"),
            Self::Selector { operand, selector } => {
                write!(f, "{}.{selector}", Operand(operand))
            }
            Self::Call { callee, arguments } => write!(
                f,
                "{}({})",
                Operand(callee),
                arguments.iter().join_with(", ")
            ),
            Self::Binary {
                left,
                operator,
                right,
            } => {
                let precedence = operator.precedence();

                match binary_precedence(left) {
                    Some(left_precedence) if left_precedence < precedence => {
                        write!(f, "({left})")?
                    }
                    _ => write!(f, "{left}")?,
                }

                write!(f, " {} ", operator.symbol())?;

                match binary_precedence(right) {
                    Some(right_precedence) if right_precedence <= precedence => {
                        write!(f, "({right})")
                    }
                    _ => write!(f, "{right}"),
                }
            }
            Self::Unary { operator, operand } => match **operand {
                Self::Binary { .. } => write!(f, "{}({operand})", operator.symbol()),
                _ => write!(f, "{}{operand}", operator.symbol()),
            },
            Self::CompositeLiteral { type_ } => write!(f, "{type_}{{}}"),
        }
    }
}

fn binary_precedence(expression: &Expression) -> Option<u8> {
    match expression {
        Expression::Binary { operator, .. } => Some(operator.precedence()),
        _ => None,
    }
}

/// An expression in the position of a primary expression, parenthesized if it is not one.
struct Operand<'a>(&'a Expression);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Expression::Binary { .. } | Expression::Unary { .. } => write!(f, "({})", self.0),
            expression => write!(f, "{expression}"),
        }
    }
}
