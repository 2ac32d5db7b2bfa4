//! # Constants
//!
//! Constants used throughout the application

/// The prompt written before every read
pub const PROMPT: &str = "prompt> ";

/// Size of the input buffer, including the line ending
pub const BUFF_SIZE: usize = 80;

/// Maximum number of visible characters in a single command line
pub const MAX_LINE_LEN: usize = BUFF_SIZE - 1;

/// Built-in command that terminates the shell
pub const EXIT: &[u8] = b"exit";

/// Built-in command that deliberately faults the shell process
pub const EXPLODE: &[u8] = b"explode";

/// Prefix of every invalid-input diagnostic
pub const INVALID_INPUT_MSG: &str = "Invalid input";

/// Written when the fault signal is caught
pub const FAULT_NOTICE: &str = "A segmentation fault has been detected.\nExiting...\n";

/// Written when the interrupt signal is caught
pub const INTERRUPT_NOTICE: &str = "\nAn interrupt signal has been received.\nExiting...\n";

/// Written when the termination signal is caught
pub const TERMINATION_NOTICE: &str = "\nA termination signal has been received.\nExiting...\n";

/// Exit status for `exit`, end of input, interrupt and termination
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status for a caught fault (255 as seen by the parent)
pub const EXIT_FAULT: i32 = -1;

/// Exit status when the shell cannot start or its input breaks
pub const EXIT_FAILURE: i32 = 1;

/// Environment variable selecting how built-in commands are matched
pub const MATCH_VAR: &str = "PROMPT_SHELL_MATCH";
