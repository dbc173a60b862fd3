//! Colored output to the terminal or to a buffer.

use crate::SmallVec;
use std::{
    io::{self, BufWriter, StderrLock, StdoutLock, Write},
    str::FromStr,
};
use supports_color::Stream;

pub use anstyle::{AnsiColor, Effects, Style};

/// Paint to a `String` without ever failing.
///
/// Invalid UTF-8 written by the painting function is replaced.
pub fn paint_to_string(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> String {
    let mut painter = Painter::new(Target::Bytes(Vec::new()), choice.resolve(None));
    // writing to bytes cannot fail
    let _ = paint(&mut painter);

    match painter.target {
        Target::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Target::Stdout(_) | Target::Stderr(_) => String::new(),
    }
}

/// Paint to locked and buffered stdout.
pub fn paint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let target = Target::Stdout(BufWriter::new(io::stdout().lock()));
    let mut painter = Painter::new(target, choice.resolve(Some(Stream::Stdout)));

    paint(&mut painter)?;
    painter.flush()
}

/// Paint to locked and buffered stderr.
pub fn epaint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let target = Target::Stderr(BufWriter::new(io::stderr().lock()));
    let mut painter = Painter::new(target, choice.resolve(Some(Stream::Stderr)));

    paint(&mut painter)?;
    painter.flush()
}

/// A writer keeping track of nested styles.
///
/// Unsetting a style restores the styles set before it.
pub struct Painter {
    target: Target,
    colorize: bool,
    styles: SmallVec<Style, 3>,
}

impl Painter {
    fn new(target: Target, colorize: bool) -> Self {
        Self {
            target,
            colorize,
            styles: SmallVec::new(),
        }
    }

    pub fn set(&mut self, style: impl IntoStyle) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        let style = style.into_style();
        self.styles.push(style);
        write!(self.target, "{}", style.render())
    }

    pub fn unset(&mut self) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        if let Some(style) = self.styles.pop() {
            write!(self.target, "{}", style.render_reset())?;
        }

        for style in &self.styles {
            write!(self.target, "{}", style.render())?;
        }

        Ok(())
    }
}

impl Write for Painter {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.target.write(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}

// An enum instead of `dyn Write` to avoid dynamic dispatch in the renderers.
enum Target {
    Stdout(BufWriter<StdoutLock<'static>>),
    Stderr(BufWriter<StderrLock<'static>>),
    Bytes(Vec<u8>),
}

impl Write for Target {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buffer),
            Self::Stderr(stderr) => stderr.write(buffer),
            Self::Bytes(bytes) => bytes.write(buffer),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::Stderr(stderr) => stderr.flush(),
            Self::Bytes(_) => Ok(()),
        }
    }
}

/// When to emit ANSI escape sequences.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorChoice {
    /// Only if the stream is a terminal supporting colors.
    #[default]
    Auto,
    Never,
    Always,
}

impl ColorChoice {
    pub const ELEMENTS: [Self; 3] = [Self::Auto, Self::Never, Self::Always];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Never => "never",
            Self::Always => "always",
        }
    }

    fn resolve(self, stream: Option<Stream>) -> bool {
        match (self, stream) {
            (Self::Auto, Some(stream)) => {
                supports_color::on_cached(stream).is_some_and(|level| level.has_basic)
            }
            (Self::Auto, None) | (Self::Never, _) => false,
            (Self::Always, _) => true,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::ELEMENTS
            .into_iter()
            .find(|choice| choice.name() == source)
            .ok_or(())
    }
}

pub trait IntoStyle {
    fn into_style(self) -> Style;
}

impl IntoStyle for Style {
    fn into_style(self) -> Style {
        self
    }
}

impl IntoStyle for AnsiColor {
    fn into_style(self) -> Style {
        self.on_default()
    }
}

impl IntoStyle for Effects {
    fn into_style(self) -> Style {
        Style::new().effects(self)
    }
}

#[cfg(test)]
mod test {
    use super::{paint_to_string, AnsiColor, ColorChoice, Effects};
    use std::io::Write;

    #[test]
    fn never_colorize() {
        let output = paint_to_string(
            |painter| {
                painter.set(AnsiColor::Red)?;
                write!(painter, "error")?;
                painter.unset()
            },
            ColorChoice::Never,
        );

        assert_eq!(output, "error");
    }

    #[test]
    fn unsetting_restores_the_outer_style() {
        let output = paint_to_string(
            |painter| {
                painter.set(Effects::BOLD)?;
                painter.set(AnsiColor::Green)?;
                write!(painter, "a")?;
                painter.unset()?;
                write!(painter, "b")?;
                painter.unset()
            },
            ColorChoice::Always,
        );

        let bold = Effects::BOLD.render().to_string();
        let green = AnsiColor::Green.on_default().render().to_string();
        let reset = anstyle::Reset.render().to_string();

        assert_eq!(output, format!("{bold}{green}a{reset}{bold}b{reset}"));
    }

    #[test]
    fn color_choices_by_name() {
        assert_eq!("always".parse(), Ok(ColorChoice::Always));
        assert_eq!("sometimes".parse::<ColorChoice>(), Err(()));
    }
}
