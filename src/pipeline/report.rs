//! Stage banners for operator visibility.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

/// Width of the separator line around stage banners.
pub const SEPARATOR_WIDTH: usize = 70;

/// Prints bracketed start/finish banners around each stage.
///
/// Purely observational: write failures are ignored so that a closed
/// stdout never changes what the pipeline does.
#[derive(Debug)]
pub struct StageReporter<W: Write> {
    out: W,
}

impl StageReporter<io::Stdout> {
    /// Reporter writing to stdout.
    pub fn stdout() -> Self {
        StageReporter::new(io::stdout())
    }
}

impl<W: Write> StageReporter<W> {
    /// Create a reporter writing to `out`.
    pub fn new(out: W) -> Self {
        StageReporter { out }
    }

    /// Print the banner announcing `title` has started.
    pub fn begin(&mut self, title: &str) {
        self.banner(format_args!("{} - Started", title));
    }

    /// Print the banner announcing `title` has finished after `elapsed`.
    pub fn end(&mut self, title: &str, elapsed: Duration) {
        self.banner(format_args!(
            "{} - Finished - Elapsed: {}",
            title,
            format_duration(elapsed)
        ));
    }

    /// Consume the reporter, returning its sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn banner(&mut self, msg: impl Display) {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let _ = writeln!(self.out, "{}", separator);
        let _ = writeln!(self.out, "{}", msg);
        let _ = writeln!(self.out, "{}", separator);
        let _ = self.out.flush();
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
