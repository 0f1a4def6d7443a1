// Licensed under the Apache-2.0 license

//! Shared driver utilities.
//!
//! Drivers in this crate take their logger as a type parameter so that a build without
//! diagnostics pays nothing for the log statements sitting in interrupt paths.

use core::fmt::Arguments;
use embedded_io::Write;

/// Diagnostic sink used by drivers.
///
/// Implementations are called from interrupt context and must not block for long.
pub trait Logger {
    fn debug(&mut self, args: Arguments<'_>);
    fn error(&mut self, args: Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: Arguments<'_>) {}
    fn error(&mut self, _args: Arguments<'_>) {}
}

/// Logger writing one line per record to an `embedded_io::Write` sink such as a UART.
pub struct WriteLogger<W: Write> {
    writer: W,
    verbose: bool,
}

impl<W: Write> WriteLogger<W> {
    /// Errors are always written; debug records only when `verbose` is set.
    pub const fn new(writer: W, verbose: bool) -> Self {
        Self { writer, verbose }
    }

    pub fn release(self) -> W {
        self.writer
    }

    fn line(&mut self, prefix: &str, args: Arguments<'_>) {
        // A full sink drops the record; logging never fails a bus operation.
        let _ = self.writer.write_all(prefix.as_bytes());
        let _ = self.writer.write_fmt(args);
        let _ = self.writer.write_all(b"\r\n");
    }
}

impl<W: Write> Logger for WriteLogger<W> {
    fn debug(&mut self, args: Arguments<'_>) {
        if self.verbose {
            self.line("i2c: ", args);
        }
    }

    fn error(&mut self, args: Arguments<'_>) {
        self.line("i2c error: ", args);
    }
}
