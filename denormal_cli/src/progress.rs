use std::io::{self, Write};

use denormal_core::refresh::Progress;

/// Text progress bar on stderr, redrawn in place.
pub struct ProgressBar<W: Write = io::Stderr> {
    out: W,
    message: String,
    total: usize,
    done: usize,
    width: usize,
    /// Last drawn filled width, to avoid redrawing on every row.
    /// `Some` while a bar line is open.
    drawn: Option<usize>,
}

impl ProgressBar {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            message: String::new(),
            total: 0,
            done: 0,
            width: 32,
            drawn: None,
        }
    }

    fn filled(&self) -> usize {
        if self.total == 0 {
            return self.width;
        }
        self.done.min(self.total) * self.width / self.total
    }

    fn draw(&mut self) {
        let filled = self.filled();
        let line = format!(
            "\r{} |{}{}| {}/{}",
            self.message,
            "#".repeat(filled),
            " ".repeat(self.width - filled),
            self.done,
            self.total
        );
        // Progress output is best effort
        let _ = self.out.write_all(line.as_bytes());
        let _ = self.out.flush();
        self.drawn = Some(filled);
    }

    fn end_line(&mut self) {
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
        self.drawn = None;
    }
}

impl<W: Write> Progress for ProgressBar<W> {
    fn start(&mut self, message: &str, total: usize) {
        self.message = message.to_string();
        self.total = total;
        self.done = 0;
        self.draw();
    }

    fn advance(&mut self, count: usize) {
        self.done += count;
        if self.drawn != Some(self.filled()) || self.done == self.total {
            self.draw();
        }
    }

    fn finish(&mut self) {
        self.draw();
        self.end_line();
    }
}

/// A table that fails part-way never reaches `finish`; terminate its line
/// so the error report starts on a fresh one.
impl<W: Write> Drop for ProgressBar<W> {
    fn drop(&mut self) {
        if self.drawn.is_some() {
            self.end_line();
        }
    }
}
