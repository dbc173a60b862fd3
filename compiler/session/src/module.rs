//! Modules referenced by a posh program.

use std::{fmt, str::FromStr};
use utility::FILE_EXTENSION;

/// A module of the posh runtime library or of the Go standard library
/// implicitly imported by generated programs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum StdModule {
    Exec,
    Io,
    Flag,
    Std,
}

impl StdModule {
    pub const ELEMENTS: [Self; 4] = [Self::Exec, Self::Io, Self::Flag, Self::Std];

    /// The qualifier under which the module is accessible from posh and Go code.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Io => "io",
            Self::Flag => "flag",
            Self::Std => "std",
        }
    }

    pub const fn import_path(self) -> &'static str {
        match self {
            Self::Exec => "github.com/pouya-eghbali/posh/pkg/exec",
            Self::Io => "github.com/pouya-eghbali/posh/pkg/io",
            Self::Flag => "flag",
            Self::Std => "github.com/pouya-eghbali/posh/pkg/std",
        }
    }
}

impl FromStr for StdModule {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ELEMENTS
            .into_iter()
            .find(|module| module.name() == source)
            .ok_or(())
    }
}

impl fmt::Display for StdModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The path of a posh module relative to the directory of the entry module.
///
/// In source code, such paths are written as text literals like `"/lib/util.posh"`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ModulePath(String);

impl ModulePath {
    /// Parse the contents of the text literal of an import.
    ///
    /// Returns `None` if the import does not refer to a posh module but to a Go package.
    pub fn parse(literal: &str) -> Option<Self> {
        let path = literal.strip_prefix('/')?;
        let stem = path.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;

        if stem.is_empty() || stem.ends_with('/') {
            return None;
        }

        Some(Self(normalize(path)))
    }

    /// The module path of the entry module given its file name.
    pub fn entry(file_name: &str) -> Self {
        Self(file_name.to_owned())
    }

    /// The path relative to the directory of the entry module.
    pub fn relative(&self) -> &str {
        &self.0
    }

    /// The name of the Go package the module is compiled to.
    pub fn package(&self) -> &str {
        let file_name = self.0.rsplit('/').next().unwrap_or(&self.0);
        file_name
            .strip_suffix(FILE_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .unwrap_or(file_name)
    }

    /// The directory containing the module relative to the directory of the entry module.
    pub fn directory(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(directory, _)| directory)
    }

    /// The path under which the Go package of the module can be imported.
    ///
    /// The generated Go module is always called `main`.
    pub fn go_import_path(&self) -> String {
        match self.directory() {
            "" => format!("main/{}", self.package()),
            directory => format!("main/{directory}/{}", self.package()),
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// Resolve the segments `.` and `..` and remove empty segments.
fn normalize(path: &str) -> String {
    let mut segments = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    segments.join("/")
}

/// The Go package name of an import of a non-posh module, the last segment of its path.
pub fn foreign_package_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
