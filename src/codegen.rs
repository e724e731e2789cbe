//! Helpers for writing generated shell code.

use std::fmt;

struct ShellEscaper<W: fmt::Write>(W);

impl<W: fmt::Write> fmt::Write for ShellEscaper<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if ch == '\'' {
                write!(self.0, "'\\''")?;
            } else {
                write!(self.0, "{}", ch)?;
            }
        }
        Ok(())
    }
}

/// Displays the value single-quoted for POSIX shells.
pub struct ShellQuoted<D: fmt::Display>(pub D);

impl<D: fmt::Display> fmt::Display for ShellQuoted<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use fmt::Write;

        write!(f, "'")?;
        write!(ShellEscaper(&mut *f), "{}", self.0)?;
        write!(f, "'")
    }
}
