//! Textual progress bar for a single transfer
//!
//! The bar is 50 markers wide for 0-100%. Each sample is rendered in place
//! with a carriage return; the line is finalized once `done == total`, after
//! which the reporter is ready for the next transfer.
//!
//! The percentage is computed as `((done + 1) * 100) / total`. The `+ 1`
//! makes the bar reach visual completion slightly before the final sample.
//! For very small totals it pushes past 100, so the value is capped there.

use std::io::{self, Write};

/// Width of a complete bar in marker characters
pub const BAR_WIDTH: usize = 50;

const MARKER: char = '#';

/// Renders `(done, total)` samples as an in-place progress line
pub struct ProgressReporter<W: Write = io::Stdout> {
    out: W,
    bar: String,
}

impl ProgressReporter<io::Stdout> {
    /// Reporter writing to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            bar: String::with_capacity(BAR_WIDTH),
        }
    }

    /// Records one sample and re-renders the line
    ///
    /// Rendering failures are ignored; progress output never aborts a
    /// transfer.
    pub fn update(&mut self, done: u64, total: u64) {
        let percent = percent_of(done, total).min(100);
        let target = (percent / 2) as usize;
        while self.bar.len() < target {
            self.bar.push(MARKER);
        }

        let _ = write!(self.out, "\r{:3}% {} |", percent, self.bar);
        let _ = self.out.flush();

        if done >= total {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
            self.reset();
        }
    }

    /// Number of markers currently rendered
    pub fn width(&self) -> usize {
        self.bar.len()
    }

    fn reset(&mut self) {
        self.bar.clear();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn percent_of(done: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    done.saturating_add(1).saturating_mul(100) / total
}
