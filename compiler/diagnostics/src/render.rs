//! The code responsible for rendering diagnostics.

// @Bug tabs in snippets mess up the alignment of the underline

use super::{Severity, Subseverity, UnboxedUntaggedDiagnostic};
use span::{source_map::LineWithHighlight, FileName, SourceMap};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;
use utility::paint::{AnsiColor, Effects, Painter};

#[cfg(test)]
mod test;

impl UnboxedUntaggedDiagnostic {
    pub fn render(&self, map: Option<&SourceMap>, p: &mut Painter) -> io::Result<()> {
        render_header(self, p)?;

        let (padding, highlights) = resolve_spans(self, map);

        let mut renderer = Renderer {
            diagnostic: self,
            padding,
            p,
        };

        renderer.render_path()?;
        renderer.render_highlights(&highlights)?;

        for subdiagnostic in &self.subdiagnostics {
            renderer.render_subdiagnostic(subdiagnostic.severity, &subdiagnostic.message)?;
        }

        Ok(())
    }
}

fn render_header(diagnostic: &UnboxedUntaggedDiagnostic, p: &mut Painter) -> io::Result<()> {
    diagnostic.severity.render(p)?;

    if let Some(code) = diagnostic.code {
        p.set(diagnostic.severity.color())?;
        write!(p, "[{code}]")?;
        p.unset()?;
    }

    if let Some(message) = &diagnostic.message {
        write!(p, ": ")?;
        p.set(Effects::BOLD)?;
        write!(p, "{message}")?;
        p.unset()?;
    }

    Ok(())
}

fn resolve_spans<'a>(
    diagnostic: &'a UnboxedUntaggedDiagnostic,
    map: Option<&'a SourceMap>,
) -> (String, Vec<ResolvedHighlight<'a>>) {
    // Without a source map, highlights cannot be resolved and are skipped.
    let Some(map) = map.filter(|_| !diagnostic.highlights.is_empty()) else {
        return (" ".into(), Vec::new());
    };

    let highlights: Vec<_> = diagnostic
        .highlights
        .iter()
        .map(|highlight| ResolvedHighlight {
            line: map.line_with_highlight(highlight.span),
            label: &highlight.label,
        })
        .collect();

    let widest_line_number = highlights
        .iter()
        .map(|highlight| highlight.line.number)
        .max()
        .unwrap_or(1);

    let number_of_digits = widest_line_number.ilog10() + 1;
    let padding = " ".repeat(number_of_digits as _);

    (padding, highlights)
}

struct Renderer<'a> {
    diagnostic: &'a UnboxedUntaggedDiagnostic,
    padding: String,
    p: &'a mut Painter,
}

impl Renderer<'_> {
    const BAR: &'static str = Line::Vertical.single();
    const UNDERLINE: &'static str = "═";
    /// Points at the gap a zero-length highlight sits in.
    const EMPTY_UNDERLINE: &'static str = "⟫⟪";

    fn render_path(&mut self) -> io::Result<()> {
        let Some(path) = &self.diagnostic.path else {
            return Ok(());
        };

        let needs_downward_connection = !self.diagnostic.highlights.is_empty()
            || !self.diagnostic.subdiagnostics.is_empty();

        let connector = if needs_downward_connection {
            Line::DownAndRight
        } else {
            Line::Horizontal
        }
        .single();

        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(
            self.p,
            "{} {}{} {}",
            self.padding,
            connector,
            Line::Horizontal.single(),
            path.display(),
        )?;
        self.p.unset()?;

        if needs_downward_connection {
            self.render_bar()?;
        }

        Ok(())
    }

    fn render_highlights(&mut self, highlights: &[ResolvedHighlight<'_>]) -> io::Result<()> {
        let mut needs_upward_connection = self.diagnostic.path.is_some();
        let needs_downward_connection = !self.diagnostic.subdiagnostics.is_empty();

        for (index, highlight) in highlights.iter().enumerate() {
            self.render_location(&highlight.line, needs_upward_connection)?;
            self.render_single_line_highlight(&highlight.line, highlight.label)?;

            if needs_downward_connection || index < highlights.len() - 1 {
                self.render_bar()?;
            }

            needs_upward_connection = true;
        }

        Ok(())
    }

    fn render_location(
        &mut self,
        line: &LineWithHighlight<'_>,
        needs_upward_connection: bool,
    ) -> io::Result<()> {
        let connector = if needs_upward_connection {
            Line::VerticalAndRight
        } else {
            Line::DownAndRight
        }
        .single();

        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(
            self.p,
            "{} {connector}{} ",
            self.padding,
            Line::Horizontal.single()
        )?;
        render_file_name(line.file, self.p)?;
        write!(self.p, ":{}:{}", line.number, line.highlight.start)?;
        self.p.unset()
    }

    fn render_single_line_highlight(
        &mut self,
        line: &LineWithHighlight<'_>,
        label: &str,
    ) -> io::Result<()> {
        let color = self.diagnostic.severity.color();

        self.render_bar()?;
        writeln!(self.p)?;
        self.render_line_number(line.number)?;
        write!(self.p, " ")?;

        let highlight_prefix_width = line.highlight.prefix_width;
        let zero_length_highlight = line.highlight.width == 0;

        if zero_length_highlight && highlight_prefix_width == 0 {
            write!(self.p, " ")?;
        }

        writeln!(self.p, "{}", line.content)?;

        // The underline and the label.
        self.p.set(palette::FRAME)?;
        write!(self.p, "{} {}", self.padding, Self::BAR)?;
        self.p.unset()?;

        let underline_padding = " ".repeat(match zero_length_highlight {
            true => highlight_prefix_width.saturating_sub(1),
            false => highlight_prefix_width,
        });
        self.p.set(color)?;
        write!(self.p, " {underline_padding}")?;
        if zero_length_highlight {
            write!(self.p, "{}", Self::EMPTY_UNDERLINE)?;
        } else {
            write!(self.p, "{}", Self::UNDERLINE.repeat(line.highlight.width))?;
        }
        self.p.unset()?;

        let mut lines_of_label = label.split('\n');

        if let Some(line_of_label) = lines_of_label.next() {
            self.p.set(color)?;
            write!(self.p, " {line_of_label}")?;
            self.p.unset()?;
        }

        let spacing = " ".repeat(
            line.highlight.prefix_width
                + if zero_length_highlight { 1 } else { line.highlight.width },
        );

        for line_of_label in lines_of_label {
            self.render_bar()?;

            if !line_of_label.is_empty() {
                self.p.set(color)?;
                write!(self.p, " {spacing} {line_of_label}")?;
                self.p.unset()?;
            }
        }

        Ok(())
    }

    fn render_subdiagnostic(&mut self, severity: Subseverity, message: &str) -> io::Result<()> {
        writeln!(self.p)?;
        write!(self.p, "{}", self.padding)?;
        severity.render(self.p)?;
        write!(self.p, ": ")?;

        let mut lines = message.split('\n');

        if let Some(line) = lines.next() {
            write!(self.p, "{line}")?;
        }

        let severity_spacing = " ".repeat(severity.name().width() + 1);

        for line in lines {
            if !line.is_empty() {
                writeln!(self.p)?;
                write!(self.p, "{}{severity_spacing} {line}", self.padding)?;
            }
        }

        Ok(())
    }

    fn render_bar(&mut self) -> io::Result<()> {
        writeln!(self.p)?;

        self.p.set(palette::FRAME)?;
        write!(self.p, "{} {}", self.padding, Self::BAR)?;
        self.p.unset()
    }

    fn render_line_number(&mut self, number: u32) -> io::Result<()> {
        let padding = self.padding.len();

        self.p.set(palette::FRAME)?;
        write!(self.p, "{number:>padding$} {}", Self::BAR)?;
        self.p.unset()
    }
}

struct ResolvedHighlight<'a> {
    line: LineWithHighlight<'a>,
    label: &'a str,
}

impl Severity {
    const fn name(self) -> &'static str {
        match self {
            Self::Bug => "internal compiler error",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    const fn color(self) -> AnsiColor {
        match self {
            Self::Bug | Self::Error => palette::ERROR,
            Self::Warning => palette::WARNING,
        }
    }

    fn render(self, p: &mut Painter) -> io::Result<()> {
        p.set(self.color().on_default().bold())?;
        write!(p, "{}", self.name())?;
        p.unset()
    }
}

impl Subseverity {
    const COLOR: AnsiColor = palette::HELP;

    fn render(self, p: &mut Painter) -> io::Result<()> {
        p.set(Self::COLOR.on_default().bold())?;
        write!(p, "{}", self.name())?;
        p.unset()
    }
}

#[derive(Clone, Copy)]
enum Line {
    Horizontal,
    Vertical,
    DownAndRight,
    VerticalAndRight,
}

impl Line {
    const fn single(self) -> &'static str {
        match self {
            Self::Horizontal => "─",
            Self::Vertical => "│",
            Self::DownAndRight => "┌",
            Self::VerticalAndRight => "├",
        }
    }

}

fn render_file_name(name: &FileName, p: &mut Painter) -> io::Result<()> {
    match name {
        FileName::Anonymous => {
            p.set(Effects::ITALIC)?;
            write!(p, "⟨anonymous⟩")?;
            p.unset()
        }
        FileName::Path(path) => write!(p, "{}", path.display()),
        FileName::Virtual(name) => write!(p, "{name}"),
    }
}

mod palette {
    use utility::paint::AnsiColor;

    pub(super) const FRAME: AnsiColor = AnsiColor::BrightBlue;
    pub(super) const ERROR: AnsiColor = AnsiColor::BrightRed;
    pub(super) const WARNING: AnsiColor = AnsiColor::BrightYellow;
    pub(super) const HELP: AnsiColor = AnsiColor::BrightCyan;
}
