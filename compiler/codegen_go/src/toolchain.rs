//! Building generated Go code with the Go toolchain.
//!
//! The generated files form a Go module called `main` depending on the posh runtime module.

use diagnostics::{Diagnostic, ErrorCode};
use std::{
    fmt, io,
    path::{Path, PathBuf},
    process::Command,
};
use utility::{FormatError, QuoteExt};

/// The Go module containing the runtime library of generated programs.
pub const RUNTIME_MODULE: &str = "github.com/pouya-eghbali/posh";

/// The name of the Go module formed by the generated files.
const MODULE: &str = "main";
const BINARY: &str = "main";

/// Build the Go module in the given directory and move the binary to the output path.
pub fn build(directory: &Path, output: &Path, runtime_version: &str) -> Result<(), ToolchainError> {
    let runtime = format!("{RUNTIME_MODULE}@v{runtime_version}");

    for step in [
        Step::Initialize,
        Step::Fetch(runtime),
        Step::Tidy,
        Step::Build,
    ] {
        run(&step, directory)?;
    }

    relocate(&directory.join(BINARY), output)
}

fn run(step: &Step, directory: &Path) -> Result<(), ToolchainError> {
    let output = Command::new("go")
        .args(step.arguments())
        .current_dir(directory)
        .output()
        .map_err(|error| ToolchainError::Command {
            step: step.clone(),
            output: error.format(),
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined += &String::from_utf8_lossy(&output.stderr);

        return Err(ToolchainError::Command {
            step: step.clone(),
            output: combined.trim_end().to_owned(),
        });
    }

    Ok(())
}

/// Move the binary out of the build directory.
///
/// Renaming fails if the paths are on different file systems, copying does not.
fn relocate(binary: &Path, output: &Path) -> Result<(), ToolchainError> {
    let relocation_error = |error| ToolchainError::Relocation {
        path: output.to_owned(),
        error,
    };

    if std::fs::rename(binary, output).is_err() {
        std::fs::copy(binary, output).map_err(relocation_error)?;
        std::fs::remove_file(binary).map_err(relocation_error)?;
    }

    Ok(())
}

/// An invocation of the `go` command.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Step {
    Initialize,
    /// Fetch the given module version.
    Fetch(String),
    Tidy,
    Build,
}

impl Step {
    fn arguments(&self) -> Vec<&str> {
        match self {
            Self::Initialize => vec!["mod", "init", MODULE],
            Self::Fetch(module) => vec!["get", module.as_str()],
            Self::Tidy => vec!["mod", "tidy"],
            Self::Build => vec!["build", "-ldflags", "-s -w", "-o", BINARY],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "go")?;

        for argument in self.arguments() {
            if argument.contains(' ') {
                write!(f, " \"{argument}\"")?;
            } else {
                write!(f, " {argument}")?;
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum ToolchainError {
    /// A step failed or the `go` command could not be run.
    Command {
        step: Step,
        /// The combined standard output and standard error of the step.
        output: String,
    },
    /// The binary could not be moved to the output path.
    Relocation { path: PathBuf, error: io::Error },
}

impl ToolchainError {
    pub fn diagnostic(self) -> Diagnostic {
        match self {
            Self::Command { step, output } => Diagnostic::error()
                .code(ErrorCode::E050)
                .message(format!("the Go toolchain failed to run {}", step.quote()))
                .with(|error| {
                    if output.is_empty() {
                        error
                    } else {
                        error.note(output)
                    }
                }),
            Self::Relocation { path, error } => Diagnostic::error()
                .code(ErrorCode::E050)
                .message(format!(
                    "could not move the binary to {}",
                    path.display().quote()
                ))
                .note(error.format()),
        }
    }
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { step, .. } => write!(f, "failed to run `{step}`"),
            Self::Relocation { path, error } => {
                write!(f, "could not move the binary to {}: {error}", path.display())
            }
        }
    }
}

impl std::error::Error for ToolchainError {}
