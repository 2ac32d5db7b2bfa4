//! REPL (Read-Eval-Print Loop)
//!
//! The main shell loop.
//!
//! Prints the prompt, takes one line of user input, classifies it
//! and runs the program it names, waiting for it to finish before prompting again.
//!
//! # References
//!
//! - [REPL @ Wikipedia](https://en.wikipedia.org/wiki/Read%E2%80%93eval%E2%80%93print_loop)

use crate::cmd::{Launcher, launch_and_wait};
use crate::config::Config;
use crate::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::errors::{InvalidInputError, ReadError, WriteError};
use crate::parse::{Action, classify};
use crate::report;
use std::io::{self, BufRead, Read, Write};
use tracing::{debug, info};

/// Why the loop stopped
///
/// The loop itself never terminates the process; the caller acts on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Exit with the given status
    Exit(i32),
    /// The input stream was closed
    EndOfInput,
    /// The operator asked for the deliberate fault
    Explode,
}

/// One read from the input stream
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// A line, with its `\n` if it had one
    Text(Vec<u8>),
    /// A line longer than allowed; it has been discarded
    TooLong,
    /// Nothing left to read
    Eof,
}

/// Reads one line of at most `max` bytes, not counting the `\n`
///
/// Never buffers more than `max + 1` bytes. The rest of an over-long line
/// is consumed and dropped, so the next read starts on the next line.
pub fn read_line<R: BufRead>(reader: &mut R, max: usize) -> io::Result<Line> {
    let mut line = Vec::with_capacity(max + 1);
    let limit = u64::try_from(max + 1).unwrap_or(u64::MAX);

    if reader.by_ref().take(limit).read_until(b'\n', &mut line)? == 0 {
        return Ok(Line::Eof);
    }

    if line.ends_with(b"\n") || line.len() <= max {
        return Ok(Line::Text(line));
    }

    reader.skip_until(b'\n')?;
    Ok(Line::TooLong)
}

/// The shell session
pub struct Repl<R, O, E, L> {
    config: Config,
    input: R,
    out: O,
    err: E,
    launcher: L,
}

impl<R, O, E, L> Repl<R, O, E, L>
where
    R: BufRead,
    O: Write,
    E: Write,
    L: Launcher,
{
    pub fn new(config: Config, input: R, out: O, err: E, launcher: L) -> Self {
        Self {
            config,
            input,
            out,
            err,
            launcher,
        }
    }

    /// The main shell loop.
    ///
    /// Runs until `exit`, `explode`, end of input or a broken stream.
    pub fn run(&mut self) -> Shutdown {
        loop {
            if let Some(shutdown) = self.step() {
                info!(?shutdown, "leaving the shell loop");
                return shutdown;
            }
        }
    }

    /// One prompt-read-act cycle; `None` means prompt again
    fn step(&mut self) -> Option<Shutdown> {
        // Print prompt; with nowhere to print it, the session is over
        if let Err(err) = self.prompt() {
            report!(self.err, WriteError(err));
            let _ = self.err.flush();
            return Some(Shutdown::Exit(EXIT_FAILURE));
        }

        // Wait for user input
        let line = match read_line(&mut self.input, self.config.max_line_len) {
            Ok(Line::Text(line)) => line,
            Ok(Line::Eof) => return Some(Shutdown::EndOfInput),
            Ok(Line::TooLong) => {
                let error = InvalidInputError {
                    reason: format!("line exceeds {} characters", self.config.max_line_len),
                };
                report!(self.err, error);
                self.flush();
                return None;
            }
            Err(err) => {
                report!(self.err, ReadError(err));
                self.flush();
                return Some(Shutdown::Exit(EXIT_FAILURE));
            }
        };

        let action = match classify(&line, self.config.match_mode) {
            Ok(action) => action,
            Err(error) => {
                report!(self.err, error);
                self.flush();
                return None;
            }
        };
        debug!(%action, "classified input");

        match action {
            Action::Blank => return None,
            Action::Exit => return Some(Shutdown::Exit(EXIT_SUCCESS)),
            Action::Explode => return Some(Shutdown::Explode),
            Action::Run(program) => {
                if let Err(error) = launch_and_wait(&mut self.launcher, &program) {
                    report!(self.err, error);
                }
            }
        }

        self.flush();
        None
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.config.prompt)?;
        self.out.flush()
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}
