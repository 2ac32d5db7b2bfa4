//! Classifier for the user input
//!
//! A command line is never tokenized: the whole line, minus its line ending,
//! is either one of the built-in commands or the name of a program to run.

use crate::config::MatchMode;
use crate::constants::{EXIT, EXPLODE};
use crate::errors::InvalidInputError;
use std::ffi::{CStr, CString};
use std::fmt::{Display, Formatter};

/// Name of an external program, ready to be handed to `exec`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program(CString);

impl Program {
    /// Wraps a command, rejecting it if it contains a NUL byte.
    pub fn new(name: &[u8]) -> Result<Self, InvalidInputError> {
        match CString::new(name) {
            Ok(name) => Ok(Self(name)),
            Err(_) => Err(InvalidInputError {
                reason: "command contains a NUL byte".to_string(),
            }),
        }
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

/// What the loop should do with one line of input
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// The line was only a line ending
    Blank,
    /// Terminate the shell
    Exit,
    /// Fault the shell on purpose
    Explode,
    /// Run an external program and wait for it
    Run(Program),
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Blank => write!(f, "blank"),
            Action::Exit => write!(f, "exit"),
            Action::Explode => write!(f, "explode"),
            Action::Run(program) => write!(f, "run {program}"),
        }
    }
}

/// Classifies one line of input
///
/// The line is expected to still carry its trailing `\n`, if it had one.
/// Only a lone `\n` counts as blank; a line of spaces is a program name like any other.
///
/// # Examples
///
/// ```
/// use prompt_shell::config::MatchMode;
/// use prompt_shell::parse::{classify, Action};
///
/// assert_eq!(Action::Blank, classify(b"\n", MatchMode::Exact).unwrap());
/// assert_eq!(Action::Exit, classify(b"exit\n", MatchMode::Exact).unwrap());
/// ```
pub fn classify(line: &[u8], mode: MatchMode) -> Result<Action, InvalidInputError> {
    if line == b"\n" {
        return Ok(Action::Blank);
    }

    let cmd = strip_line_ending(line);

    if is_builtin(cmd, EXIT, mode) {
        Ok(Action::Exit)
    } else if is_builtin(cmd, EXPLODE, mode) {
        Ok(Action::Explode)
    } else {
        Program::new(cmd).map(Action::Run)
    }
}

/// Removes a single trailing `\n`, if present
fn strip_line_ending(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}

fn is_builtin(cmd: &[u8], name: &[u8], mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => cmd == name,
        MatchMode::Prefix => cmd.starts_with(name),
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Program, classify};
    use crate::config::MatchMode;
    use crate::errors::InvalidInputError;

    fn run(name: &str) -> Action {
        Action::Run(Program::new(name.as_bytes()).unwrap())
    }

    #[test]
    fn blank_line() {
        assert_eq!(Action::Blank, classify(b"\n", MatchMode::Exact).unwrap());
        assert_eq!(Action::Blank, classify(b"\n", MatchMode::Prefix).unwrap());
    }

    #[test]
    fn builtins_exact() {
        assert_eq!(Action::Exit, classify(b"exit\n", MatchMode::Exact).unwrap());
        assert_eq!(
            Action::Explode,
            classify(b"explode\n", MatchMode::Exact).unwrap()
        );
        assert_eq!(run("exitfoo"), classify(b"exitfoo\n", MatchMode::Exact).unwrap());
        assert_eq!(
            run("explodefoo"),
            classify(b"explodefoo\n", MatchMode::Exact).unwrap()
        );
        assert_eq!(run("Exit"), classify(b"Exit\n", MatchMode::Exact).unwrap());
        assert_eq!(run(" exit"), classify(b" exit\n", MatchMode::Exact).unwrap());
    }

    #[test]
    fn builtins_prefix() {
        assert_eq!(Action::Exit, classify(b"exit\n", MatchMode::Prefix).unwrap());
        assert_eq!(Action::Exit, classify(b"exitfoo\n", MatchMode::Prefix).unwrap());
        assert_eq!(
            Action::Explode,
            classify(b"explode now\n", MatchMode::Prefix).unwrap()
        );
        assert_eq!(run("exi"), classify(b"exi\n", MatchMode::Prefix).unwrap());
    }

    #[test]
    fn programs_are_not_tokenized() {
        assert_eq!(run("ls"), classify(b"ls\n", MatchMode::Exact).unwrap());
        assert_eq!(run("ls -l"), classify(b"ls -l\n", MatchMode::Exact).unwrap());
        assert_eq!(run("   "), classify(b"   \n", MatchMode::Exact).unwrap());
    }

    #[test]
    fn missing_line_ending_keeps_the_whole_command() {
        assert_eq!(run("date"), classify(b"date", MatchMode::Exact).unwrap());
        assert_eq!(Action::Exit, classify(b"exit", MatchMode::Exact).unwrap());
    }

    #[test]
    fn only_one_line_ending_is_stripped() {
        assert_eq!(run("ls\r"), classify(b"ls\r\n", MatchMode::Exact).unwrap());
    }

    #[test]
    fn nul_byte_is_invalid_input() {
        let expected = InvalidInputError {
            reason: "command contains a NUL byte".to_string(),
        };
        assert_eq!(
            expected,
            classify(b"l\0s\n", MatchMode::Exact).unwrap_err()
        );
    }

    #[test]
    fn program_display() {
        assert_eq!("ls", Program::new(b"ls").unwrap().to_string());
        assert_eq!("run ls", run("ls").to_string());
    }
}
