//! The static analyzer.
//!
//! It walks a parsed module and fills its [compilation unit](CompilationUnit):
//! It registers top-level bindings, tracks local bindings in a scope stack,
//! synthesizes bindings for external commands, collects the standard modules
//! the generated code depends on and resolves imports of other posh modules
//! through a [`ModuleLoader`].
//!
//! Analysis annotates the unit, never the tree. Apart from imports of undefined
//! bindings and command line flags of unsupported types, there are no errors:
//! Unbound identifiers are left to the Go compiler.

use ast::{
    Argument, Arithmetic, ArithmeticOperand, Boolean, Callee, DotNotation, Expression,
    FunctionCall, Import, ImportBindings, Iterable, Numeric, Posh, Range, SimpleExpression,
    Statement,
};
use diagnostics::{Diagnostic, ErrorCode};
use lexer::Token;
use session::{
    environment::{Environment, Label},
    module::{foreign_package_name, ModulePath, StdModule},
    Binding, CompilationUnit, Export, Exports, Parameter,
};
use span::SourceFileIndex;
use std::fmt;
use utility::{capitalize, ListingExt, QuoteExt, PROGRAM_ENTRY};

#[cfg(test)]
mod test;

/// Functions of the Go language which are callable without an import.
pub const BUILT_IN_FUNCTIONS: [&str; 5] = ["append", "len", "panic", "print", "println"];

/// A type the parameters of `main` may have.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FlagType {
    pub name: &'static str,
    /// The function of the Go package `flag` registering a flag of this type.
    pub function: &'static str,
    /// The default value in Go syntax.
    pub default: &'static str,
}

impl FlagType {
    pub const ELEMENTS: [Self; 4] = [
        Self::new("string", "StringVar", "\"\""),
        Self::new("int", "IntVar", "0"),
        Self::new("bool", "BoolVar", "false"),
        Self::new("float64", "Float64Var", "0"),
    ];

    const fn new(name: &'static str, function: &'static str, default: &'static str) -> Self {
        Self {
            name,
            function,
            default,
        }
    }

    pub fn of(type_: &str) -> Option<Self> {
        Self::ELEMENTS.into_iter().find(|flag| flag.name == type_)
    }
}

/// A provider of the exports of other posh modules.
pub trait ModuleLoader {
    type Error: From<ResolutionError>;

    /// Compile the module at the given path unless it already is and return its exports.
    ///
    /// The `import` is the text literal naming the module and is used for error reporting.
    fn load(&mut self, path: &ModulePath, import: &Token) -> Result<Exports, Self::Error>;
}

/// Analyze a whole module.
pub fn analyze<L: ModuleLoader>(
    posh: &Posh,
    unit: &mut CompilationUnit,
    loader: &mut L,
) -> Result<(), L::Error> {
    register_functions(posh, unit);

    for import in posh.imports() {
        resolve_import(import, unit, loader)?;
    }

    for function in posh.functions() {
        let mut unit = Environment::enter(unit);

        if function.is_program_entry() && !function.parameters.parameters.is_empty() {
            unit.require(StdModule::Flag);

            for parameter in &function.parameters.parameters {
                if FlagType::of(&parameter.type_.image).is_none() {
                    return Err(ResolutionError::UnsupportedFlagType {
                        type_: parameter.type_.clone(),
                    }
                    .into());
                }
            }
        }

        for parameter in &function.parameters.parameters {
            unit.environment.declare(
                &parameter.name.image,
                Label::Parameter {
                    type_: parameter.type_.image.clone(),
                },
            );
        }

        analyze_statements(&function.body.statements, &mut unit);
    }

    Ok(())
}

/// Register all top-level functions in the root scope and export them.
///
/// This happens before any body is analyzed allowing functions to refer to each other
/// regardless of their order.
fn register_functions(posh: &Posh, unit: &mut CompilationUnit) {
    for function in posh.functions() {
        let name = &function.name.image;

        unit.environment.declare_global(name, Label::Function);
        unit.exports.insert(
            name,
            Export {
                label: Label::Function,
                is_function: true,
                parameters: function
                    .parameters
                    .parameters
                    .iter()
                    .map(|parameter| Parameter {
                        name: parameter.name.image.clone(),
                        type_: parameter.type_.image.clone(),
                    })
                    .collect(),
            },
        );
    }
}

fn resolve_import<L: ModuleLoader>(
    import: &Import,
    unit: &mut CompilationUnit,
    loader: &mut L,
) -> Result<(), L::Error> {
    let literal = import.path.text();

    let Some(path) = ModulePath::parse(literal) else {
        let package = foreign_package_name(literal);

        match &import.bindings {
            ImportBindings::All { alias } => unit.environment.declare_global(
                &alias.image,
                Label::Package {
                    path: literal.to_owned(),
                },
            ),
            ImportBindings::Items(items) => {
                for item in items {
                    let binder = &item.binder().image;

                    unit.environment.declare_global(binder, Label::Unknown);
                    unit.bindings.push(Binding::Imported {
                        binder: binder.clone(),
                        qualifier: package.to_owned(),
                        item: item.name.image.clone(),
                    });
                }
            }
        }

        return Ok(());
    };

    match &import.bindings {
        ImportBindings::All { alias } => {
            unit.environment
                .declare_global(&alias.image, Label::Module(path.clone()));
        }
        ImportBindings::Items(items) => {
            let exports = loader.load(&path, &import.path)?;

            for item in items {
                let Some(export) = exports.get(&item.name.image) else {
                    return Err(ResolutionError::UndefinedImport {
                        name: item.name.clone(),
                        module: path,
                        lookalike: find_similarly_named(&item.name.image, &exports),
                    }
                    .into());
                };

                let binder = &item.binder().image;

                unit.environment
                    .declare_global(binder, export.label.clone());
                unit.bindings.push(Binding::Imported {
                    binder: binder.clone(),
                    qualifier: path.package().to_owned(),
                    item: capitalize(&item.name.image),
                });
            }
        }
    }

    if path.package() == PROGRAM_ENTRY {
        return Err(ResolutionError::ReservedModuleName {
            module: path,
            import: import.path.clone(),
        }
        .into());
    }

    unit.discover(path);

    Ok(())
}

fn find_similarly_named(name: &str, exports: &Exports) -> Option<String> {
    exports
        .iter()
        .map(|(export, _)| export)
        .find(|export| is_similar(name, export))
        .map(ToOwned::to_owned)
}

fn is_similar(identifier: &str, other_identifier: &str) -> bool {
    strsim::levenshtein(other_identifier, identifier) <= std::cmp::max(identifier.len(), 3) / 3
}

fn analyze_statements(statements: &[Statement], unit: &mut CompilationUnit) {
    for statement in statements {
        analyze_statement(statement, unit);
    }
}

fn analyze_statement(statement: &Statement, unit: &mut CompilationUnit) {
    match statement {
        Statement::Assignment(assignment) => {
            unit.environment
                .declare(&assignment.target.image, Label::Variable);
            analyze_expression(&assignment.value, unit);
        }
        Statement::Call(call) => analyze_call(call, unit),
        Statement::Return(return_) => {
            if let Some(value) = &return_.value {
                analyze_expression(value, unit);
            }
        }
        Statement::If(if_) => {
            analyze_boolean(&if_.condition, unit);
            analyze_statements(&if_.body.statements, &mut Environment::enter(unit));

            for elif in &if_.elifs {
                analyze_boolean(&elif.condition, unit);
                analyze_statements(&elif.body.statements, &mut Environment::enter(unit));
            }

            if let Some(else_) = &if_.else_ {
                analyze_statements(&else_.body.statements, &mut Environment::enter(unit));
            }
        }
        Statement::For(for_) => {
            match &for_.iterable {
                Iterable::Range(range) => analyze_range(range, unit),
                Iterable::Expression(expression) => analyze_expression(expression, unit),
            }

            let mut unit = Environment::enter(unit);

            unit.environment.declare(&for_.key.image, Label::Variable);
            if let Some(value) = &for_.value {
                unit.environment.declare(&value.image, Label::Variable);
            }

            analyze_statements(&for_.body.statements, &mut unit);
        }
        Statement::Control(_) => {}
    }
}

fn analyze_expression(expression: &Expression, unit: &mut CompilationUnit) {
    match expression {
        Expression::Pipe(pipe) => {
            analyze_simple_expression(&pipe.source, unit);

            if !is_external_call(&pipe.source, unit) {
                unit.bind_external(ECHO);
            }

            for stage in &pipe.stages {
                analyze_call(stage, unit);
            }
        }
        Expression::Range(range) => analyze_range(range, unit),
        Expression::Simple(expression) => analyze_simple_expression(expression, unit),
    }
}

/// The external command used to feed plain values into a pipe.
pub const ECHO: &str = "echo";

/// Test if the expression is a call of an external command.
///
/// Such a call can be the source of a pipe as is. Any other value is fed through [`ECHO`].
pub fn is_external_call(expression: &SimpleExpression, unit: &CompilationUnit) -> bool {
    match expression {
        SimpleExpression::Call(FunctionCall {
            callee: Callee::Identifier(callee),
            ..
        }) => unit.is_external(&callee.image),
        _ => false,
    }
}

fn analyze_range(range: &Range, unit: &mut CompilationUnit) {
    unit.require(StdModule::Std);

    analyze_numeric(&range.start, unit);
    for numeric in range.step.iter().chain(&range.end) {
        analyze_numeric(numeric, unit);
    }
}

fn analyze_simple_expression(expression: &SimpleExpression, unit: &mut CompilationUnit) {
    match expression {
        SimpleExpression::Arithmetic(arithmetic) => analyze_arithmetic(arithmetic, unit),
        SimpleExpression::Call(call) => analyze_call(call, unit),
        SimpleExpression::Numeric(numeric) => analyze_numeric(numeric, unit),
        SimpleExpression::String(_) => {}
        SimpleExpression::Boolean(boolean) => analyze_boolean(boolean, unit),
    }
}

fn analyze_call(call: &FunctionCall, unit: &mut CompilationUnit) {
    match &call.callee {
        Callee::Identifier(callee) => {
            let name = &callee.image;

            if !unit.environment.is_bound(name) && !BUILT_IN_FUNCTIONS.contains(&name.as_str()) {
                unit.bind_external(name);
            }
        }
        Callee::DotNotation(path) => analyze_dot_notation(path, unit),
    }

    for argument in &call.arguments {
        match argument {
            Argument::Expression(expression) => analyze_simple_expression(expression, unit),
            Argument::Flag(_) => {}
        }
    }
}

fn analyze_dot_notation(path: &DotNotation, unit: &mut CompilationUnit) {
    let head = &path.head().image;

    if !unit.environment.is_bound(head) {
        if let Ok(module) = head.parse() {
            unit.require(module);
        }
    }
}

fn analyze_arithmetic(arithmetic: &Arithmetic, unit: &mut CompilationUnit) {
    match &arithmetic.left {
        ArithmeticOperand::Numeric(numeric) => analyze_numeric(numeric, unit),
        ArithmeticOperand::Arithmetic(left) => analyze_arithmetic(left, unit),
    }

    analyze_numeric(&arithmetic.right, unit);
}

fn analyze_boolean(boolean: &Boolean, unit: &mut CompilationUnit) {
    match boolean {
        Boolean::Comparison(comparison) => {
            analyze_numeric(&comparison.left, unit);
            analyze_numeric(&comparison.right, unit);
        }
        Boolean::Logical(logical) => {
            analyze_boolean(&logical.left, unit);
            analyze_boolean(&logical.right, unit);
        }
        Boolean::Negation(negation) => analyze_boolean(&negation.operand, unit),
        Boolean::Numeric(numeric) => analyze_numeric(numeric, unit),
        Boolean::Literal(_) => {}
    }
}

fn analyze_numeric(numeric: &Numeric, unit: &mut CompilationUnit) {
    match numeric {
        Numeric::Wrapped(arithmetic) => analyze_arithmetic(arithmetic, unit),
        Numeric::DotNotation(path) => analyze_dot_notation(path, unit),
        Numeric::Integer(_) | Numeric::Float(_) | Numeric::Identifier(_) => {}
    }
}

/// An error found during static analysis.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ResolutionError {
    /// The imported binding is not exported by the module.
    UndefinedImport {
        name: Token,
        module: ModulePath,
        /// An exported binding with a similar name.
        lookalike: Option<String>,
    },
    /// The module is (transitively) imported by itself.
    CircularImport {
        module: ModulePath,
        /// The text literal naming the module.
        import: Token,
    },
    /// The imported module would be compiled to the package of the program entry.
    ReservedModuleName {
        module: ModulePath,
        /// The text literal naming the module.
        import: Token,
    },
    /// A parameter of `main` has a type no command line flag can have.
    UnsupportedFlagType { type_: Token },
}

impl ResolutionError {
    pub fn diagnostic(&self, file: SourceFileIndex) -> Diagnostic {
        match self {
            Self::UndefinedImport {
                name,
                module,
                lookalike,
            } => Diagnostic::error()
                .code(ErrorCode::E021)
                .message(format!(
                    "the binding {} is not defined in module {}",
                    name.image.as_str().quote(),
                    module.to_string().quote(),
                ))
                .span(name.span(file), "undefined binding")
                .with(|error| match lookalike {
                    Some(lookalike) => error.help(format!(
                        "a binding with a similar name exists in the module: {}",
                        lookalike.quote(),
                    )),
                    None => error,
                }),
            Self::CircularImport { module, import } => Diagnostic::error()
                .code(ErrorCode::E024)
                .message(format!(
                    "the module {} imports itself",
                    module.to_string().quote()
                ))
                .span(import.span(file), "circular import"),
            Self::ReservedModuleName { module, import } => Diagnostic::error()
                .code(ErrorCode::E025)
                .message(format!(
                    "the module {} cannot be imported",
                    module.to_string().quote()
                ))
                .span(import.span(file), "reserved module name")
                .note(format!(
                    "the package name {} is reserved for the entry module",
                    PROGRAM_ENTRY.quote()
                ))
                .help("rename the file of the module"),
            Self::UnsupportedFlagType { type_ } => Diagnostic::error()
                .code(ErrorCode::E030)
                .message(format!(
                    "the type {} is not supported for command line flags",
                    type_.image.as_str().quote()
                ))
                .span(type_.span(file), "unsupported type")
                .note(format!(
                    "the parameters of {} are lowered to command line flags",
                    utility::quoted!("main")
                ))
                .help(format!(
                    "use one of {}",
                    FlagType::ELEMENTS
                        .iter()
                        .map(|flag| flag.name.quote())
                        .list_alternatives()
                )),
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedImport { name, module, .. } => write!(
                f,
                "imported name {} not found in module {module}",
                name.image
            ),
            Self::CircularImport { module, .. } => write!(f, "circular import of module {module}"),
            Self::ReservedModuleName { module, .. } => {
                write!(f, "import of module {module} with a reserved name")
            }
            Self::UnsupportedFlagType { type_ } => {
                write!(f, "unsupported command line flag type {}", type_.image)
            }
        }
    }
}

impl std::error::Error for ResolutionError {}
