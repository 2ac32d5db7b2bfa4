//! # Errors
//!
//! Error types and helper functions used in the library

use crate::constants::INVALID_INPUT_MSG;
use nix::errno::Errno;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Invalid input error
///
/// Contains the reason for the error.
///
/// # Examples
/// - a line longer than the input buffer
/// - a command containing a NUL byte
#[derive(Debug, PartialEq)]
pub struct InvalidInputError {
    pub reason: String,
}

impl Error for InvalidInputError {}

impl Display for InvalidInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{INVALID_INPUT_MSG}: {}", self.reason)
    }
}

/// Failure to run a single command
///
/// Each variant carries the OS error number so that the message
/// includes the reason reported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchError {
    /// The child process could not be created
    Fork(Errno),
    /// The child could not replace itself with the program
    Exec(Errno),
    /// The parent could not wait for the child
    Wait(Errno),
}

impl Error for LaunchError {}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (stage, errno) = match self {
            LaunchError::Fork(errno) => ("Fork", errno),
            LaunchError::Exec(errno) => ("Exec", errno),
            LaunchError::Wait(errno) => ("Wait", errno),
        };

        write!(f, "{stage} failed: {}", errno.desc())
    }
}

/// Startup failures; none of these are recoverable
#[derive(Debug, PartialEq)]
pub enum SetupError {
    /// `sigaction` rejected a handler
    Signal(Errno),
    /// A termination policy is already in place
    AlreadyInstalled,
    /// An environment variable holds an unsupported value
    Config { var: String, value: String },
}

impl Error for SetupError {}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Signal(errno) => {
                write!(f, "Signal installation failed: {}", errno.desc())
            }
            SetupError::AlreadyInstalled => write!(f, "Signal handlers are already installed"),
            SetupError::Config { var, value } => {
                write!(f, "Unsupported value for {var}: {value:?}")
            }
        }
    }
}

/// Failure to read the next command line
#[derive(Debug)]
pub struct ReadError(pub io::Error);

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Read failed: {}", self.0)
    }
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        Self(err)
    }
}

/// Failure to write the prompt
#[derive(Debug)]
pub struct WriteError(pub io::Error);

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Write failed: {}", self.0)
    }
}
