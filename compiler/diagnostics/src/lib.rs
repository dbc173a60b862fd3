//! The diagnostics system.

use reporter::ErasedReportedError;
use span::Spanning;
use std::{collections::BTreeSet, path::PathBuf};
use utility::Str;

pub use code::ErrorCode;
pub use reporter::Reporter;

mod code;
mod render;

pub mod error;
pub mod reporter;

/// A complex diagnostic message, optionally with source locations.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
#[must_use]
pub struct Diagnostic(UntaggedDiagnostic);

impl Diagnostic {
    fn new(severity: Severity) -> Self {
        Self(Box::new(UnboxedUntaggedDiagnostic::new(severity)))
    }

    /// Create a diagnostic for a user error.
    pub fn error() -> Self {
        Self::new(Severity::Error)
    }

    /// Create a diagnostic for an internal compiler error (ICE).
    pub fn bug() -> Self {
        Self::new(Severity::Bug)
    }

    /// Create a diagnostic for a warning.
    pub fn warning() -> Self {
        Self::new(Severity::Warning)
    }

    pub fn code(mut self, code: ErrorCode) -> Self {
        self.0.code = Some(code);
        self
    }

    /// Add a text message describing the issue.
    ///
    /// # Strict Guidelines
    ///
    /// * The message should not contain any line breaks (beware when embedding source code snippets!)
    /// * The message should not start with an upper case letter
    /// * The message should not end in a punctuation mark (like a period)
    /// * Surround source code snippets with (directional) single quotation marks,
    ///   i.e. `‘` (U+2018) to the left and `’` (U+2019) to the right
    pub fn message(mut self, message: impl Into<Str>) -> Self {
        self.0.message = Some(message.into());
        self
    }

    /// Reference and label a code snippet as one of the focal points of the diagnostic.
    pub fn span(mut self, spanning: impl Spanning, label: impl Into<Str>) -> Self {
        self.0.highlights.insert(Highlight {
            span: spanning.span(),
            label: label.into(),
        });
        self
    }

    fn subdiagnostic(mut self, severity: Subseverity, message: Str) -> Self {
        self.0
            .subdiagnostics
            .push(Subdiagnostic { severity, message });
        self
    }

    /// Add further clarifying information.
    ///
    /// Same rules as for [`Self::message`] apply except that it may span multiple lines.
    pub fn note(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Note, message.into())
    }

    /// Add steps or tips to solve the diagnosed issue.
    ///
    /// Same rules as for [`Self::message`] apply. Do not pose a question like `did you mean …?`.
    pub fn help(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Help, message.into())
    }

    /// Reference a path in the diagnostic.
    ///
    /// Useful if the given path is not registered in the [source map](span::SourceMap),
    /// e.g. if it points to a file that could not be opened.
    /// Calling this function again overwrites the previous path.
    pub fn path(mut self, path: PathBuf) -> Self {
        self.0.path = Some(path);
        self
    }

    pub fn with(self, builder: impl FnOnce(Self) -> Self) -> Self {
        builder(self)
    }

    /// Report the diagnostic.
    pub fn report(self, reporter: &Reporter) -> ErasedReportedError {
        reporter.report(self.0)
    }
}

impl std::ops::Deref for Diagnostic {
    type Target = UnboxedUntaggedDiagnostic;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub type UntaggedDiagnostic = Box<UnboxedUntaggedDiagnostic>;

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct UnboxedUntaggedDiagnostic {
    pub path: Option<PathBuf>,
    // Highlights come first since they should have the highest priority when ordering.
    // This places diagnostics close to “source order” with buffered reporters.
    pub highlights: BTreeSet<Highlight>,
    pub subdiagnostics: Vec<Subdiagnostic>,
    pub code: Option<ErrorCode>,
    pub message: Option<Str>,
    pub severity: Severity,
}

impl UnboxedUntaggedDiagnostic {
    fn new(severity: Severity) -> Self {
        Self {
            path: None,
            highlights: BTreeSet::new(),
            subdiagnostics: Vec::new(),
            code: None,
            message: None,
            severity,
        }
    }
}

/// A highlighted code snippet.
#[derive(PartialEq, Eq, Debug, Clone, PartialOrd, Ord)]
pub struct Highlight {
    pub span: span::Span,
    pub label: Str,
}

/// Part of a [complex error message](Diagnostic) providing extra text messages.
#[derive(PartialEq, Eq, Clone, PartialOrd, Ord, Debug)]
pub struct Subdiagnostic {
    pub severity: Subseverity,
    pub message: Str,
}

/// Level of severity of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Severity {
    /// An internal compiler error (ICE).
    Bug,
    /// A user error.
    Error,
    Warning,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Subseverity {
    /// An auxiliary note.
    Note,
    /// A message containing steps to solve an issue.
    Help,
}

impl Subseverity {
    const fn name(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Help => "help",
        }
    }
}
