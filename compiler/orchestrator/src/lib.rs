//! The compilation of a whole program.
//!
//! Starting from the entry module, every module of the program is lexed, parsed,
//! analyzed and lowered to a Go file exactly once. Local imports whose bindings
//! are needed during analysis are compiled on demand through the [`ModuleLoader`]
//! implementation of the [`Compiler`], all other discovered modules are queued
//! in a worklist. Finally, the Go files are written to a temporary directory in
//! which the Go toolchain builds the binary.

use ast::Render;
use codegen_go::{
    go,
    toolchain::{self, ToolchainError},
};
use diagnostics::{Diagnostic, ErrorCode};
use lexer::Token;
use resolver::{analyze, ModuleLoader, ResolutionError};
use session::{module::ModulePath, CompilationUnit, Exports};
use span::{SourceFileIndex, SourceMap, Span};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use utility::{
    default,
    paint::{epaint, paint, AnsiColor, ColorChoice},
    FormatError, QuoteExt, PROGRAM_ENTRY,
};

#[cfg(test)]
mod test;

/// Measure the duration of a computation and print it if requested.
macro_rules! time {
    ($timing:expr, $pass:literal, $computation:expr) => {{
        let start = Instant::now();
        let result = $computation;

        if $timing {
            println!("  {:<30}{:?}", $pass, start.elapsed());
        }

        result
    }};
}

#[derive(Clone, Debug, Default)]
pub struct Options {
    /// The version of the Go module containing the posh runtime library.
    pub runtime_version: String,
    /// Print the syntax tree of every module.
    pub emit_ast: bool,
    /// Print the generated Go code and skip building.
    pub emit_go: bool,
    /// Suppress the status lines.
    pub quiet: bool,
    /// Print the time spent in each pass.
    pub timing: bool,
    pub color: ColorChoice,
}

/// A module lowered to Go.
#[derive(Debug)]
pub struct GeneratedUnit {
    pub path: ModulePath,
    /// The path of the Go file relative to the directory of the Go module.
    pub output_path: PathBuf,
    pub file: go::File,
}

/// Compile the program whose entry module is at the given path to a binary.
pub fn compile(
    entry: &Path,
    output: &Path,
    options: &Options,
    map: &Arc<RwLock<SourceMap>>,
) -> Result<(), CompileError> {
    let units = generate(entry, options, map)?;

    if options.emit_go {
        let rendered = render(&units);
        paint(|painter| write!(painter, "{rendered}"), options.color)
            .map_err(CompileError::Print)?;
        return Ok(());
    }

    let directory = TemporaryDirectory::create()?;

    for unit in &units {
        write(directory.path(), unit)?;
    }

    status("Building", output.display(), options)?;

    time!(
        options.timing,
        "Building",
        toolchain::build(directory.path(), output, &options.runtime_version)
    )?;

    status("Finished", output.display(), options)?;

    Ok(())
}

/// Lower every module of the program whose entry module is at the given path to Go.
///
/// The units are returned in the order in which they were completed, imported
/// modules needed during analysis precede their importers.
pub fn generate(
    entry: &Path,
    options: &Options,
    map: &Arc<RwLock<SourceMap>>,
) -> Result<Vec<GeneratedUnit>, CompileError> {
    let base_directory = match entry.parent() {
        Some(directory) if !directory.as_os_str().is_empty() => directory.to_owned(),
        _ => PathBuf::from("."),
    };
    let entry = ModulePath::entry(
        &entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );

    let mut compiler = Compiler {
        map,
        options,
        base_directory,
        entry: entry.clone(),
        cache: BTreeMap::new(),
        in_progress: Vec::new(),
        worklist: VecDeque::from([entry]),
        units: Vec::new(),
    };

    if options.timing {
        println!("Execution times by pass:");
    }

    while let Some(path) = compiler.worklist.pop_front() {
        if !compiler.cache.contains_key(&path) {
            compiler.compile_unit(path)?;
        }
    }

    Ok(compiler.units)
}

/// Render the generated Go files, each preceded by a comment containing its path.
pub fn render(units: &[GeneratedUnit]) -> String {
    let mut rendered = String::new();

    for (index, unit) in units.iter().enumerate() {
        if index != 0 {
            rendered += "\n";
        }

        rendered += &format!("// {}\n{}", unit.output_path.display(), unit.file);
    }

    rendered
}

/// Write the Go file of a unit into the directory of the Go module.
pub fn write(directory: &Path, unit: &GeneratedUnit) -> Result<(), CompileError> {
    let path = directory.join(&unit.output_path);
    let io_error = |error| CompileError::Io {
        path: path.clone(),
        error,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    fs::write(&path, unit.file.to_string()).map_err(io_error)
}

struct Compiler<'a> {
    map: &'a Arc<RwLock<SourceMap>>,
    options: &'a Options,
    /// The directory of the entry module, the root of all local import paths.
    base_directory: PathBuf,
    entry: ModulePath,
    /// The exports of all completed units.
    cache: BTreeMap<ModulePath, Exports>,
    /// The units currently being compiled together with their source file,
    /// the innermost one last.
    in_progress: Vec<(ModulePath, SourceFileIndex)>,
    worklist: VecDeque<ModulePath>,
    units: Vec<GeneratedUnit>,
}

impl Compiler<'_> {
    fn compile_unit(&mut self, path: ModulePath) -> Result<Exports, CompileError> {
        let package = if path == self.entry {
            PROGRAM_ENTRY
        } else {
            path.package()
        }
        .to_owned();

        let mut unit = CompilationUnit::new(path.clone(), package, &self.base_directory);
        let source_path = unit.source_path();

        let file = write_lock(self.map)
            .load(&source_path)
            .map_err(|error| CompileError::Load {
                path: source_path,
                error,
                import: None,
            })?;

        status(
            "Compiling",
            format_args!("{} ({})", unit.package, path.relative()),
            self.options,
        )?;

        let tokens = time!(
            self.options.timing,
            "Lexing",
            lexer::lex(read_lock(self.map)[file].content())
        )
        .map_err(|error| CompileError::Lex { file, error })?;

        let posh = time!(self.options.timing, "Parsing", parser::parse(&tokens))
            .map_err(|error| CompileError::Parse { file, error })?;

        if self.options.emit_ast {
            epaint(
                |painter| {
                    posh.render(default(), painter)?;
                    writeln!(painter)
                },
                self.options.color,
            )
            .map_err(CompileError::Print)?;
        }

        self.in_progress.push((path.clone(), file));

        time!(
            self.options.timing,
            "Analysis",
            analyze(&posh, &mut unit, self)
        )
        .map_err(|error| error.in_file(file))?;

        self.in_progress.pop();

        let generated = time!(
            self.options.timing,
            "Code Generation",
            codegen_go::generate(&posh, &mut unit)
        );

        self.worklist.extend(unit.local_imports.iter().cloned());
        self.cache.insert(path.clone(), unit.exports.clone());
        self.units.push(GeneratedUnit {
            path,
            output_path: unit.output_path(),
            file: generated,
        });

        Ok(unit.exports)
    }
}

impl ModuleLoader for Compiler<'_> {
    type Error = CompileError;

    fn load(&mut self, path: &ModulePath, import: &Token) -> Result<Exports, Self::Error> {
        if let Some(exports) = self.cache.get(path) {
            return Ok(exports.clone());
        }

        if self.in_progress.iter().any(|(module, _)| module == path) {
            return Err(ResolutionError::CircularImport {
                module: path.clone(),
                import: import.clone(),
            }
            .into());
        }

        let importer = self.in_progress.last().map(|&(_, file)| file);

        self.compile_unit(path.clone()).map_err(|error| match error {
            CompileError::Load {
                path,
                error,
                import: None,
            } => CompileError::Load {
                path,
                error,
                import: importer.map(|file| import.span(file)),
            },
            error => error,
        })
    }
}

fn read_lock(map: &RwLock<SourceMap>) -> RwLockReadGuard<'_, SourceMap> {
    map.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock(map: &RwLock<SourceMap>) -> RwLockWriteGuard<'_, SourceMap> {
    map.write().unwrap_or_else(PoisonError::into_inner)
}

fn status(
    label: &str,
    message: impl fmt::Display,
    options: &Options,
) -> Result<(), CompileError> {
    if options.quiet {
        return Ok(());
    }

    paint(
        |painter| {
            painter.set(AnsiColor::Green.on_default().bold())?;
            write!(painter, "{label:>12} ")?;
            painter.unset()?;
            writeln!(painter, "{message}")
        },
        options.color,
    )
    .map_err(CompileError::Print)
}

/// A fresh directory removed together with its contents on drop.
struct TemporaryDirectory(PathBuf);

impl TemporaryDirectory {
    fn create() -> Result<Self, CompileError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.subsec_nanos());
        let path =
            std::env::temp_dir().join(format!("posh-{}-{nanos}", std::process::id()));

        fs::create_dir_all(&path).map_err(|error| CompileError::Io {
            path: path.clone(),
            error,
        })?;

        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TemporaryDirectory {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[derive(Debug)]
pub enum CompileError {
    Lex {
        file: SourceFileIndex,
        error: lexer::Error,
    },
    Parse {
        file: SourceFileIndex,
        error: parser::ParseError,
    },
    Resolution {
        /// The file containing the erroneous code, unknown until the error
        /// leaves the analysis of its unit.
        file: Option<SourceFileIndex>,
        error: ResolutionError,
    },
    /// A module could not be read.
    Load {
        path: PathBuf,
        error: io::Error,
        /// The text literal of the import naming the module.
        import: Option<Span>,
    },
    /// The generated code could not be written.
    Io { path: PathBuf, error: io::Error },
    /// Output meant for the terminal could not be written.
    Print(io::Error),
    Toolchain(ToolchainError),
}

impl CompileError {
    fn in_file(self, file: SourceFileIndex) -> Self {
        match self {
            Self::Resolution { file: None, error } => Self::Resolution {
                file: Some(file),
                error,
            },
            error => error,
        }
    }

    pub fn diagnostic(self) -> Diagnostic {
        match self {
            Self::Lex { file, error } => error.diagnostic(file),
            Self::Parse { file, error } => error.diagnostic(file),
            Self::Resolution {
                file: Some(file),
                error,
            } => error.diagnostic(file),
            Self::Resolution { file: None, error } => Diagnostic::bug()
                .message(error.to_string())
                .note("the error was not attributed to any source file"),
            Self::Load {
                path,
                error,
                import,
            } => Diagnostic::error()
                .code(ErrorCode::E016)
                .message(format!("could not load module {}", path.display().quote()))
                .with(|diagnostic| match import {
                    Some(import) => diagnostic.span(import, "imported here"),
                    None => diagnostic.path(path),
                })
                .note(error.format()),
            Self::Io { path, error } => Diagnostic::error()
                .message(format!("could not write to {}", path.display().quote()))
                .path(path)
                .note(error.format()),
            Self::Print(error) => Diagnostic::error()
                .message("could not write to the terminal")
                .note(error.format()),
            Self::Toolchain(error) => error.diagnostic(),
        }
    }
}

impl From<ResolutionError> for CompileError {
    fn from(error: ResolutionError) -> Self {
        Self::Resolution { file: None, error }
    }
}

impl From<ToolchainError> for CompileError {
    fn from(error: ToolchainError) -> Self {
        Self::Toolchain(error)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex { error, .. } => write!(f, "{error}"),
            Self::Parse { error, .. } => write!(f, "{error}"),
            Self::Resolution { error, .. } => write!(f, "{error}"),
            Self::Load { path, error, .. } => {
                write!(f, "could not load module {}: {error}", path.display())
            }
            Self::Io { path, error } => {
                write!(f, "could not write to {}: {error}", path.display())
            }
            Self::Print(error) => write!(f, "could not write to the terminal: {error}"),
            Self::Toolchain(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CompileError {}
