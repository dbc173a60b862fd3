//! Utility functionality and definitions.

use difference::{Changeset, Difference};
use std::{ffi::OsStr, fmt, path::Path};

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub mod paint;

pub const FILE_EXTENSION: &str = "posh";
pub const PROGRAM_ENTRY: &str = "main";

pub type Str = std::borrow::Cow<'static, str>;

pub type SmallVec<T, const N: usize> = smallvec::SmallVec<[T; N]>;

pub fn has_file_extension(path: &Path, required_extension: &str) -> bool {
    path.extension().and_then(OsStr::to_str) == Some(required_extension)
}

pub fn default<T: Default>() -> T {
    T::default()
}

/// Upper-case the first character of the given identifier.
///
/// # Examples
///
/// ```
/// # use utility::capitalize;
/// assert_eq!(capitalize("greet"), "Greet");
/// assert_eq!(capitalize("_x"), "_x");
/// ```
pub fn capitalize(identifier: &str) -> String {
    let mut characters = identifier.chars();

    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

/// A line-based difference between two texts, used by tests to report mismatches.
pub fn difference(original: &str, edit: &str, split: &str) -> String {
    use anstyle::{AnsiColor, Style};
    use std::fmt::Write;

    let marker = |text: &str, color: Option<AnsiColor>| match color {
        Some(color) => {
            let style = Style::new()
                .fg_color(Some(AnsiColor::Black.into()))
                .bg_color(Some(color.into()));
            format!("{}{text}{}", style.render(), style.render_reset())
        }
        None => {
            let style = Style::new().bg_color(Some(AnsiColor::BrightWhite.into()));
            format!("{} {}", style.render(), style.render_reset())
        }
    };

    let mut buffer = String::new();

    // the provided Display implementation for Changesets is unreadable when whitespace differs
    for difference in Changeset::new(original, edit, split).diffs {
        match difference {
            Difference::Same(lines) => {
                for line in lines.lines() {
                    let _ = writeln!(buffer, "{} {line}", marker(" ", None));
                }
            }
            Difference::Add(lines) => {
                for line in lines.lines().chain(lines.is_empty().then_some("")) {
                    let _ = writeln!(buffer, "{} {line}", marker("+", Some(AnsiColor::Green)));
                }
            }
            Difference::Rem(lines) => {
                for line in lines.lines().chain(lines.is_empty().then_some("")) {
                    let _ = writeln!(buffer, "{} {line}", marker("-", Some(AnsiColor::Red)));
                }
            }
        }
    }

    buffer
}

pub trait ListingExt {
    /// List the items as alternatives: `a, b or c`.
    fn list_alternatives(self) -> String;
}

impl<I> ListingExt for I
where
    I: Iterator<Item: fmt::Display>,
{
    fn list_alternatives(self) -> String {
        let mut items = self.enumerate().peekable();
        let mut result = String::new();

        while let Some((index, item)) = items.next() {
            if index > 0 {
                result += if items.peek().is_some() { ", " } else { " or " };
            }

            result += &item.to_string();
        }

        result
    }
}

/// Use the singular or the plural form of the given word depending on the given amount.
///
/// # Examples
///
/// ```
/// # use utility::pluralize;
/// assert_eq!(pluralize!(1, "module"), "module");
/// assert_eq!(pluralize!(15, "module"), "modules");
/// assert_eq!(pluralize!(0, "child", "children"), "children");
/// ```
#[macro_export]
macro_rules! pluralize {
    ($amount:expr, $singular:expr, $plural:expr $(,)?) => {
        match $amount {
            1 => std::borrow::Cow::<'_, str>::from($singular),
            _ => $plural.into(),
        }
    };
    ($amount:expr, $singular:literal $(,)?) => {
        match $amount {
            1 => $singular,
            _ => concat!($singular, "s"),
        }
    };
}

pub trait QuoteExt {
    fn quote(self) -> String;
}

impl<D: fmt::Display> QuoteExt for D {
    fn quote(self) -> String {
        format!("‘{self}’")
    }
}

#[macro_export]
macro_rules! quoted {
    ($code:expr) => {
        concat!("‘", $code, "’")
    };
}

pub trait FormatError {
    fn format(self) -> String;
}

impl FormatError for std::io::Error {
    fn format(self) -> String {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => "no such file or directory".into(),
            ErrorKind::PermissionDenied => "permission denied".into(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listing_no_elements() {
        assert_eq!(std::iter::empty::<u8>().list_alternatives(), "");
    }

    #[test]
    fn listing_one_element() {
        assert_eq!(std::iter::once(1).list_alternatives(), "1");
    }

    #[test]
    fn listing_two_elements() {
        assert_eq!(["exec", "io"].into_iter().list_alternatives(), "exec or io");
    }

    #[test]
    fn listing_many_elements() {
        assert_eq!(
            ["exec", "io", "flag", "std"]
                .into_iter()
                .list_alternatives(),
            "exec, io, flag or std"
        );
    }

    #[test]
    fn capitalize_identifiers() {
        assert_eq!(capitalize("helper"), "Helper");
        assert_eq!(capitalize("Helper"), "Helper");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn file_extension() {
        assert!(has_file_extension(Path::new("/lib/util.posh"), FILE_EXTENSION));
        assert!(!has_file_extension(Path::new("/lib/util.go"), FILE_EXTENSION));
    }
}
