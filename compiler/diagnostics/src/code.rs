use std::fmt;

/// An error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[forbid(missing_docs)]
pub enum ErrorCode {
    /// _Permanently unassigned_ (used in tests).
    E000,
    /// Invalid character.
    E001,
    /// Unterminated text literal.
    E002,
    /// Unexpected token.
    E010,
    /// Unable to load a module.
    E016,
    /// Undefined binding in an imported module.
    E021,
    /// Circular import.
    E024,
    /// Import of a module named like the program entry.
    E025,
    /// Unsupported type of a command line flag.
    E030,
    /// Failure of the Go toolchain.
    E050,
}

impl ErrorCode {
    pub const fn explanation(self) -> Option<&'static str> {
        match self {
            Self::E024 => Some(
                "Modules may not import each other in a cycle since every module is \
                 compiled in full before its exports become available to its importers.",
            ),
            Self::E025 => Some(
                "Every module is compiled to a Go package named after its file. The package \
                 `main` is reserved for the entry module and cannot be imported.",
            ),
            Self::E050 => Some(
                "Building a program requires a Go toolchain on the PATH and network \
                 access for fetching the posh runtime module.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
