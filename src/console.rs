//! Colored line output shared by the command loop and the watcher.
//!
//! Every message is written with a single `writeln!` so lines from the two
//! writers never interleave mid-line.

use std::io::{self, Write};

/// Color roles used by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Banner,
    Success,
    Error,
    Warning,
    Rename,
    Path,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Plain => "",
            Tone::Banner => "\x1b[36m",  // Cyan
            Tone::Success => "\x1b[32m", // Green
            Tone::Error => "\x1b[31m",   // Red
            Tone::Warning => "\x1b[33m", // Yellow
            Tone::Rename => "\x1b[35m",  // Magenta
            Tone::Path => "\x1b[94m",    // Light blue
        }
    }
}

pub fn paint(tone: Tone, text: &str, color: bool) -> String {
    if !color || tone == Tone::Plain {
        text.to_string()
    } else {
        format!("{}{}\x1b[0m", tone.ansi(), text)
    }
}

pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn line(&mut self, tone: Tone, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", paint(tone, text, self.color))
    }

    /// Write without a newline and flush, for input prompts.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
