use crate::ui::span::{Span, SpanLine};
use crate::ui::style::Color;
use crossterm::style::{
    Attribute, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::tty::IsTty;
use crossterm::{cursor, queue, terminal};
use std::io::{self, Stdout, Write};

const FALLBACK_SIZE: Size = Size {
    width: 80,
    height: 24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// Line-oriented styled writer. Input is read separately, so the terminal stays in
/// cooked mode.
pub struct Terminal<W: Write = Stdout> {
    out: W,
    size: Size,
    interactive: bool,
}

impl Terminal<Stdout> {
    pub fn new() -> io::Result<Self> {
        let out = io::stdout();
        let interactive = out.is_tty();
        let mut terminal = Self {
            out,
            size: FALLBACK_SIZE,
            interactive,
        };
        terminal.refresh_size();
        Ok(terminal)
    }
}

impl<W: Write> Terminal<W> {
    /// Non-interactive terminal over any writer with a fixed size.
    pub fn with_writer(out: W, size: Size) -> Self {
        Self {
            out,
            size,
            interactive: false,
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Re-reads the terminal size; returns whether it changed.
    pub fn refresh_size(&mut self) -> bool {
        if !self.interactive {
            return false;
        }
        let (width, height) = terminal::size().unwrap_or((FALLBACK_SIZE.width, FALLBACK_SIZE.height));
        let size = Size { width, height };
        let changed = size != self.size;
        self.size = size;
        changed
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.interactive {
            queue!(
                self.out,
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }
        Ok(())
    }

    fn render_span(&mut self, span: &Span) -> io::Result<()> {
        let style = span.style;
        if style.is_plain() {
            return write!(self.out, "{}", span.text);
        }

        if let Some(fg) = style.color {
            queue!(self.out, SetForegroundColor(map_color(fg)))?;
        }
        if let Some(bg) = style.background {
            queue!(self.out, SetBackgroundColor(map_color(bg)))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        write!(self.out, "{}", span.text)?;
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }

    pub fn render_line(&mut self, line: &SpanLine) -> io::Result<()> {
        for span in line {
            self.render_span(span)?;
        }
        writeln!(self.out)
    }

    pub fn render_lines(&mut self, lines: &[SpanLine]) -> io::Result<()> {
        for line in lines {
            self.render_line(line)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn map_color(color: Color) -> crossterm::style::Color {
    match color {
        Color::Black => crossterm::style::Color::Black,
        Color::DarkGrey => crossterm::style::Color::DarkGrey,
        Color::Red => crossterm::style::Color::Red,
        Color::Green => crossterm::style::Color::Green,
        Color::Yellow => crossterm::style::Color::Yellow,
        Color::Blue => crossterm::style::Color::Blue,
        Color::Magenta => crossterm::style::Color::Magenta,
        Color::Cyan => crossterm::style::Color::Cyan,
        Color::White => crossterm::style::Color::White,
    }
}
