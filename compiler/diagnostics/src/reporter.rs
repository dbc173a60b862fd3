//! The diagnostic reporter.

use super::{Diagnostic, Severity, UntaggedDiagnostic};
use span::SourceMap;
use std::{
    collections::BTreeSet,
    io::Write,
    mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError, RwLock, RwLockReadGuard,
    },
};
use utility::{
    default,
    paint::{epaint, paint_to_string, ColorChoice},
    pluralize,
};

/// A diagnostic reporter.
pub struct Reporter {
    kind: ReporterKind,
    map: Option<Arc<RwLock<SourceMap>>>,
    color: ColorChoice,
}

impl Reporter {
    fn new(kind: ReporterKind) -> Self {
        Self { kind, map: None, color: default() }
    }

    pub fn stderr() -> Self {
        Self::new(ReporterKind::Stderr)
    }

    pub fn buffered_stderr(reported_any_errors: Arc<AtomicBool>) -> Self {
        Self::new(ReporterKind::BufferedStderr(StderrBuffer {
            errors: default(),
            warnings: default(),
            reported_any_errors,
        }))
    }

    #[must_use]
    pub fn with_map(mut self, map: Arc<RwLock<SourceMap>>) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    fn map(&self) -> Option<RwLockReadGuard<'_, SourceMap>> {
        self.map
            .as_ref()
            .map(|map| map.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(super) fn report(&self, diagnostic: UntaggedDiagnostic) -> ErasedReportedError {
        match &self.kind {
            ReporterKind::Stderr => {
                stderr_print(&diagnostic, self.map().as_deref(), self.color);
            }
            ReporterKind::BufferedStderr(buffer) => match diagnostic.severity {
                Severity::Bug | Severity::Error => {
                    lock(&buffer.errors).insert(diagnostic);
                }
                Severity::Warning => {
                    lock(&buffer.warnings).insert(diagnostic);
                }
            },
        }

        ErasedReportedError::new()
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let ReporterKind::BufferedStderr(buffer) = &self.kind {
            buffer.report(self.map().as_deref(), self.color);
        }
    }
}

enum ReporterKind {
    Stderr,
    BufferedStderr(StderrBuffer),
}

struct StderrBuffer {
    errors: Mutex<BTreeSet<UntaggedDiagnostic>>,
    warnings: Mutex<BTreeSet<UntaggedDiagnostic>>,
    reported_any_errors: Arc<AtomicBool>,
}

impl StderrBuffer {
    fn report(&self, map: Option<&SourceMap>, color: ColorChoice) {
        let warnings = mem::take(&mut *lock(&self.warnings));

        for warning in &warnings {
            stderr_print(warning, map, color);
        }

        if !warnings.is_empty() {
            let summary = Diagnostic::warning().message(format!(
                "emitted {} {}",
                warnings.len(),
                pluralize!(warnings.len(), "warning")
            ));
            stderr_print(&summary, map, color);
        }

        let errors = mem::take(&mut *lock(&self.errors));

        for error in &errors {
            stderr_print(error, map, color);
        }

        if !errors.is_empty() {
            self.reported_any_errors.store(true, Ordering::SeqCst);
            stderr_print(&error_summary(&errors), map, color);
        }
    }
}

fn error_summary(errors: &BTreeSet<UntaggedDiagnostic>) -> Diagnostic {
    let explained_codes: BTreeSet<_> = errors
        .iter()
        .filter_map(|error| error.code)
        .filter(|code| code.explanation().is_some())
        .collect();

    Diagnostic::error()
        .message(pluralize!(
            errors.len(),
            "aborting due to previous error",
            format!("aborting due to {} previous errors", errors.len()),
        ))
        .with(|it| {
            explained_codes.iter().fold(it, |it, code| {
                let explanation = code.explanation().unwrap_or_default();
                it.note(format!("{code}: {explanation}"))
            })
        })
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn stderr_print(
    diagnostic: &super::UnboxedUntaggedDiagnostic,
    map: Option<&SourceMap>,
    color: ColorChoice,
) {
    let _ = epaint(
        |painter| {
            diagnostic.render(map, painter)?;
            writeln!(painter)?;
            writeln!(painter)
        },
        color,
    );
}

/// Render a diagnostic to a string without any colors.
pub fn render_to_string(diagnostic: &Diagnostic, map: Option<&SourceMap>) -> String {
    paint_to_string(|painter| diagnostic.render(map, painter), ColorChoice::Never)
}

/// A witness to / token for a [reported](Diagnostic::report) error.
///
/// A value of this type is a proof that an error was reported (neglecting buffering).
/// Using this as an error type instead of let's say `()` makes it a bit harder to
/// accidentally return an error without reporting anything since such a witness
/// can only be constructed by [`Diagnostic::report`] or by [`Self::new_unchecked`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErasedReportedError(());

impl ErasedReportedError {
    const fn new() -> Self {
        Self(())
    }

    pub const fn new_unchecked() -> Self {
        Self::new()
    }
}
