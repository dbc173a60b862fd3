//! The Go backend.
//!
//! The [generator](generate) translates an analyzed module into a [Go syntax tree](go::File)
//! one node at a time, the [printer](printer) serializes that tree and the [toolchain]
//! module builds the printed files into a binary.
//!
//! Notable lowerings:
//!
//! * The parameters of `main` become command line flags.
//! * A call of an external command receives a run context as its first argument.
//!   Used as a value, its output is awaited and read as text.
//! * A pipe `a(x) | b(y)` nests the calls passing the context of each stage to the next:
//!   `b(a(&exec.RunContext{}, x), y)`.
//! * Functions of modules other than the program entry are capitalized to be exported.

use ast::{
    Argument, Arithmetic, ArithmeticOperand, ArithmeticOperator, Boolean, Callee,
    ComparisonOperator, DotNotation, Expression, ForControl, Function, FunctionCall,
    IfStatement, ImportBindings, Iterable, LogicalOperator, Numeric, Pipe, Posh, Range,
    SimpleExpression, Statement,
};
use go::{BinaryOperator, ImportSpec, UnaryOperator, ValueSpec};
use resolver::{is_external_call, FlagType, ECHO};
use session::{
    environment::{Environment, Label},
    module::ModulePath,
    Binding, CompilationUnit,
};
use utility::{capitalize, HashSet};

pub mod go;
mod printer;
#[cfg(test)]
mod test;
pub mod toolchain;

/// Generate the Go file of an analyzed module.
pub fn generate(posh: &Posh, unit: &mut CompilationUnit) -> go::File {
    Generator::new(posh, unit).generate(posh)
}

/// Turn a posh identifier into a valid Go identifier.
///
/// posh allows hyphens inside of identifiers, Go does not.
pub fn go_identifier(identifier: &str) -> String {
    identifier.replace('-', "_")
}

/// Turn the content of a posh text literal into a Go string literal.
///
/// Escape sequences of Go are kept. Line breaks and backslashes not starting
/// such a sequence are escaped.
fn go_text_literal(content: &str) -> String {
    let mut literal = String::from("\"");
    let mut rest = content;

    while let Some(character) = rest.chars().next() {
        let escape = match character {
            '\\' => escape_sequence_length(rest),
            _ => None,
        };

        match (character, escape) {
            (_, Some(length)) => literal.push_str(&rest[..length]),
            ('\\', None) => literal.push_str("\\\\"),
            ('\n', _) => literal.push_str("\\n"),
            ('\r', _) => literal.push_str("\\r"),
            (character, _) => literal.push(character),
        }

        rest = &rest[escape.unwrap_or(character.len_utf8())..];
    }

    literal.push('"');
    literal
}

/// The length in bytes of the Go escape sequence at the start of the text if there is one.
fn escape_sequence_length(text: &str) -> Option<usize> {
    let sequence = text.strip_prefix('\\')?;

    let introducer = sequence.chars().next()?;

    let (prefix, digits, radix) = match introducer {
        'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '"' => return Some(2),
        'x' => (1, 2, 16),
        'u' => (1, 4, 16),
        'U' => (1, 8, 16),
        '0'..='3' => (0, 3, 8),
        _ => return None,
    };

    let number = sequence.get(prefix..prefix + digits)?;

    if !number.chars().all(|digit| digit.is_digit(radix)) {
        return None;
    }

    // `\u` and `\U` have to denote a valid code point
    if matches!(introducer, 'u' | 'U') {
        char::from_u32(u32::from_str_radix(number, radix).ok()?)?;
    }

    Some(1 + prefix + digits)
}

struct Generator<'u> {
    unit: &'u mut CompilationUnit,
    /// The functions declared in the module being generated.
    local_functions: HashSet<String>,
}

impl<'u> Generator<'u> {
    fn new(posh: &Posh, unit: &'u mut CompilationUnit) -> Self {
        Self {
            unit,
            local_functions: posh
                .functions()
                .map(|function| function.name.image.clone())
                .collect(),
        }
    }

    fn generate(mut self, posh: &Posh) -> go::File {
        let mut file = go::File::new(go_identifier(&self.unit.package));

        self.imports(posh, &mut file);
        self.variables(&mut file);

        for function in posh.functions() {
            let function = self.function(function);
            file.functions.push(function);
        }

        file
    }

    fn imports(&self, posh: &Posh, file: &mut go::File) {
        for import in posh.imports() {
            let literal = import.path.text();

            let spec = match (ModulePath::parse(literal), &import.bindings) {
                (Some(path), ImportBindings::All { alias }) => {
                    ImportSpec::named(go_identifier(&alias.image), path.go_import_path())
                }
                (Some(path), ImportBindings::Items(_)) => {
                    ImportSpec::named(go_identifier(path.package()), path.go_import_path())
                }
                (None, ImportBindings::All { alias }) => {
                    ImportSpec::named(go_identifier(&alias.image), literal)
                }
                (None, ImportBindings::Items(_)) => ImportSpec::new(literal),
            };

            file.import(spec);
        }

        for module in &self.unit.std_modules {
            file.import(ImportSpec::new(module.import_path()));
        }
    }

    fn variables(&self, file: &mut go::File) {
        for binding in &self.unit.bindings {
            let variable = match binding {
                Binding::External { name } => ValueSpec {
                    name: go_identifier(name),
                    value: go::Expression::qualified("exec", "ExternalCommand")
                        .call(vec![go::Expression::string(name)]),
                },
                Binding::Imported {
                    binder,
                    qualifier,
                    item,
                } => ValueSpec {
                    name: go_identifier(binder),
                    value: go::Expression::qualified(
                        &go_identifier(qualifier),
                        &go_identifier(item),
                    ),
                },
            };

            file.variables.push(variable);
        }
    }

    fn function(&mut self, function: &Function) -> go::FunctionDeclaration {
        let name = self.function_name(&function.name.image);
        let mut this = Environment::enter(self);

        let mut parameters = Vec::new();
        let mut statements = Vec::new();

        for parameter in &function.parameters.parameters {
            let binder = &parameter.name.image;
            let type_ = &parameter.type_.image;

            this.unit.environment.declare(
                binder,
                Label::Parameter {
                    type_: type_.clone(),
                },
            );

            if function.is_program_entry() {
                statements.extend(command_line_flag(binder, type_));
            } else {
                parameters.push(go::Field {
                    name: go_identifier(binder),
                    type_: type_.clone(),
                });
            }
        }

        if function.is_program_entry() && !function.parameters.parameters.is_empty() {
            statements.push(go::Statement::Expression(
                go::Expression::qualified("flag", "Parse").call(Vec::new()),
            ));
        }

        statements.extend(this.statements(&function.body.statements));

        go::FunctionDeclaration {
            name,
            parameters,
            result: function
                .return_type
                .as_ref()
                .map(|type_| type_.image.clone()),
            body: go::Block { statements },
        }
    }

    fn function_name(&self, name: &str) -> String {
        if self.unit.is_program_entry() {
            go_identifier(name)
        } else {
            capitalize(&go_identifier(name))
        }
    }

    /// Lower the statements of a block in a new scope.
    fn block(&mut self, statements: &[Statement]) -> go::Block {
        let mut this = Environment::enter(self);

        go::Block {
            statements: this.statements(statements),
        }
    }

    fn statements(&mut self, statements: &[Statement]) -> Vec<go::Statement> {
        statements
            .iter()
            .map(|statement| self.statement(statement))
            .collect()
    }

    fn statement(&mut self, statement: &Statement) -> go::Statement {
        match statement {
            Statement::Assignment(assignment) => {
                let binder = &assignment.target.image;
                let value = self.expression(&assignment.value);
                let name = go_identifier(binder);

                let environment = &mut self.unit.environment;
                let is_variable = matches!(
                    environment.look_up(binder),
                    Some(Label::Variable | Label::Parameter { .. })
                );

                if is_variable && environment.is_bound_locally(binder) {
                    return go::Statement::Assign { name, value };
                }

                environment.declare(binder, Label::Variable);

                if is_variable {
                    go::Statement::Shadow { name, value }
                } else {
                    go::Statement::Define { name, value }
                }
            }
            Statement::Call(call) => go::Statement::Expression(self.call(call, Usage::Statement)),
            Statement::Return(return_) => go::Statement::Return(
                return_
                    .value
                    .as_ref()
                    .map(|value| self.expression(value)),
            ),
            Statement::If(if_) => go::Statement::If(self.if_(if_)),
            Statement::For(for_) => {
                let iterable = match &for_.iterable {
                    Iterable::Range(range) => self.range(range),
                    Iterable::Expression(expression) => self.expression(expression),
                };

                let mut this = Environment::enter(self);

                this.unit.environment.declare(&for_.key.image, Label::Variable);
                if let Some(value) = &for_.value {
                    this.unit.environment.declare(&value.image, Label::Variable);
                }

                go::Statement::Range {
                    key: go_identifier(&for_.key.image),
                    value: for_.value.as_ref().map(|value| go_identifier(&value.image)),
                    iterable,
                    body: go::Block {
                        statements: this.statements(&for_.body.statements),
                    },
                }
            }
            Statement::Control(ForControl::Break) => go::Statement::Branch(go::Branch::Break),
            Statement::Control(ForControl::Continue) => {
                go::Statement::Branch(go::Branch::Continue)
            }
        }
    }

    /// Lower an if statement with its elifs to a chain of Go if statements.
    fn if_(&mut self, if_: &IfStatement) -> go::If {
        let condition = self.boolean(&if_.condition);
        let body = self.block(&if_.body.statements);

        let elifs: Vec<_> = if_
            .elifs
            .iter()
            .map(|elif| {
                (
                    self.boolean(&elif.condition),
                    self.block(&elif.body.statements),
                )
            })
            .collect();

        let else_ = if_
            .else_
            .as_ref()
            .map(|else_| go::Else::Block(self.block(&else_.body.statements)));

        let else_ = elifs
            .into_iter()
            .rev()
            .fold(else_, |else_, (condition, body)| {
                Some(go::Else::If(Box::new(go::If {
                    condition,
                    body,
                    else_,
                })))
            });

        go::If {
            condition,
            body,
            else_,
        }
    }

    fn expression(&mut self, expression: &Expression) -> go::Expression {
        match expression {
            Expression::Pipe(pipe) => self.pipe(pipe),
            Expression::Range(range) => self.range(range),
            Expression::Simple(expression) => self.simple_expression(expression),
        }
    }

    fn pipe(&mut self, pipe: &Pipe) -> go::Expression {
        let source = match &pipe.source {
            SimpleExpression::Call(call) if is_external_call(&pipe.source, self.unit) => {
                self.command(call, run_context())
            }
            source => {
                let value = self.simple_expression(source);
                go::Expression::identifier(ECHO).call(vec![run_context(), value])
            }
        };

        let output = pipe
            .stages
            .iter()
            .fold(source, |input, stage| self.command(stage, input));

        finalize(output)
    }

    fn range(&mut self, range: &Range) -> go::Expression {
        let mut arguments = vec![
            self.numeric(&range.start),
            match &range.step {
                Some(step) => self.numeric(step),
                None => go::Expression::BasicLiteral("1".into()),
            },
        ];

        if let Some(end) = &range.end {
            arguments.push(self.numeric(end));
        }

        go::Expression::qualified("std", "LazyRange").call(arguments)
    }

    fn simple_expression(&mut self, expression: &SimpleExpression) -> go::Expression {
        match expression {
            SimpleExpression::Arithmetic(arithmetic) => self.arithmetic(arithmetic),
            SimpleExpression::Call(call) => self.call(call, Usage::Value),
            SimpleExpression::Numeric(numeric) => self.numeric(numeric),
            SimpleExpression::String(text) => {
                go::Expression::BasicLiteral(go_text_literal(text.text()))
            }
            SimpleExpression::Boolean(boolean) => self.boolean(boolean),
        }
    }

    fn call(&mut self, call: &FunctionCall, usage: Usage) -> go::Expression {
        let is_external = match &call.callee {
            Callee::Identifier(callee) => self.unit.is_external(&callee.image),
            Callee::DotNotation(_) => false,
        };

        if is_external {
            let command = self.command(call, run_context());

            return match usage {
                Usage::Value => finalize(command),
                Usage::Statement => command,
            };
        }

        let callee = self.callee(&call.callee);
        let arguments = self.arguments(&call.arguments);

        callee.call(arguments)
    }

    /// Lower a call of an external command passing it the given run context.
    fn command(&mut self, call: &FunctionCall, input: go::Expression) -> go::Expression {
        let callee = self.callee(&call.callee);

        let mut arguments = vec![input];
        arguments.extend(self.arguments(&call.arguments));

        callee.call(arguments)
    }

    fn callee(&self, callee: &Callee) -> go::Expression {
        match callee {
            Callee::Identifier(callee) => self.identifier(&callee.image),
            Callee::DotNotation(path) => self.dot_notation(path),
        }
    }

    fn arguments(&mut self, arguments: &[Argument]) -> Vec<go::Expression> {
        arguments
            .iter()
            .map(|argument| match argument {
                Argument::Expression(expression) => self.simple_expression(expression),
                Argument::Flag(flag) => go::Expression::string(flag),
            })
            .collect()
    }

    fn identifier(&self, name: &str) -> go::Expression {
        let refers_to_local_function = self.local_functions.contains(name)
            && matches!(self.unit.environment.look_up(name), Some(Label::Function));

        if refers_to_local_function {
            go::Expression::Identifier(self.function_name(name))
        } else {
            go::Expression::Identifier(go_identifier(name))
        }
    }

    fn dot_notation(&self, path: &DotNotation) -> go::Expression {
        let head = &path.head().image;
        let is_local_module = matches!(self.unit.environment.look_up(head), Some(Label::Module(_)));

        path.segments
            .iter()
            .enumerate()
            .skip(1)
            .fold(
                go::Expression::identifier(go_identifier(head)),
                |operand, (index, segment)| {
                    let selector = go_identifier(&segment.image);

                    operand.select(if index == 1 && is_local_module {
                        capitalize(&selector)
                    } else {
                        selector
                    })
                },
            )
    }

    fn arithmetic(&mut self, arithmetic: &Arithmetic) -> go::Expression {
        let left = match &arithmetic.left {
            ArithmeticOperand::Numeric(numeric) => self.numeric(numeric),
            ArithmeticOperand::Arithmetic(left) => self.arithmetic(left),
        };

        let operator = match arithmetic.operator {
            ArithmeticOperator::Add => BinaryOperator::Add,
            ArithmeticOperator::Subtract => BinaryOperator::Sub,
            ArithmeticOperator::Multiply => BinaryOperator::Mul,
            ArithmeticOperator::Divide => BinaryOperator::Quo,
        };

        go::Expression::binary(left, operator, self.numeric(&arithmetic.right))
    }

    fn boolean(&mut self, boolean: &Boolean) -> go::Expression {
        match boolean {
            Boolean::Comparison(comparison) => {
                let operator = match comparison.operator {
                    ComparisonOperator::Greater => BinaryOperator::Gtr,
                    ComparisonOperator::Less => BinaryOperator::Lss,
                    ComparisonOperator::GreaterOrEqual => BinaryOperator::Geq,
                    ComparisonOperator::LessOrEqual => BinaryOperator::Leq,
                    ComparisonOperator::Equal => BinaryOperator::Eql,
                    ComparisonOperator::NotEqual => BinaryOperator::Neq,
                };

                go::Expression::binary(
                    self.numeric(&comparison.left),
                    operator,
                    self.numeric(&comparison.right),
                )
            }
            Boolean::Logical(logical) => {
                let operator = match logical.operator {
                    LogicalOperator::And => BinaryOperator::LAnd,
                    LogicalOperator::Or => BinaryOperator::LOr,
                };

                go::Expression::binary(
                    self.boolean(&logical.left),
                    operator,
                    self.boolean(&logical.right),
                )
            }
            Boolean::Negation(negation) => {
                go::Expression::unary(UnaryOperator::Not, self.boolean(&negation.operand))
            }
            Boolean::Numeric(numeric) => self.numeric(numeric),
            Boolean::Literal(value) => go::Expression::Identifier(value.to_string()),
        }
    }

    fn numeric(&mut self, numeric: &Numeric) -> go::Expression {
        match numeric {
            Numeric::Wrapped(arithmetic) => self.arithmetic(arithmetic),
            Numeric::DotNotation(path) => self.dot_notation(path),
            Numeric::Integer(literal) | Numeric::Float(literal) => {
                go::Expression::BasicLiteral(literal.image.clone())
            }
            Numeric::Identifier(identifier) => self.identifier(&identifier.image),
        }
    }
}

impl AsMut<Environment> for Generator<'_> {
    fn as_mut(&mut self) -> &mut Environment {
        &mut self.unit.environment
    }
}

/// The position a call appears in.
#[derive(Clone, Copy)]
enum Usage {
    /// The call is evaluated for its effects only.
    Statement,
    /// The result of the call is used.
    Value,
}

/// `var name type` followed by the registration of the flag of the same name.
fn command_line_flag(binder: &str, type_: &str) -> Vec<go::Statement> {
    let name = go_identifier(binder);

    // the analyzer rejects unsupported types
    let Some(flag) = FlagType::of(type_) else {
        return Vec::new();
    };

    vec![
        go::Statement::VarDeclaration {
            name: name.clone(),
            type_: type_.to_owned(),
        },
        go::Statement::Expression(go::Expression::qualified("flag", flag.function).call(vec![
            go::Expression::unary(UnaryOperator::AddressOf, go::Expression::Identifier(name)),
            go::Expression::string(binder),
            go::Expression::BasicLiteral(flag.default.into()),
            go::Expression::string(""),
        ])),
    ]
}

/// `&exec.RunContext{}`, the context of a fresh pipeline.
fn run_context() -> go::Expression {
    go::Expression::unary(
        UnaryOperator::AddressOf,
        go::Expression::CompositeLiteral {
            type_: "exec.RunContext".into(),
        },
    )
}

/// Wait for a command to finish and read its output as text.
fn finalize(command: go::Expression) -> go::Expression {
    command
        .select("Wait")
        .call(Vec::new())
        .select("ToString")
        .call(Vec::new())
}
