//! A Minimal Single-Command Shell in Rust

use prompt_shell::cmd::{ForkExec, explode};
use prompt_shell::config::Config;
use prompt_shell::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use prompt_shell::logging;
use prompt_shell::repl::{Repl, Shutdown};
use prompt_shell::signals::{self, TerminationPolicy};
use std::io;
use std::process;

fn main() {
    logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(EXIT_FAILURE);
        }
    };

    // Handlers must be in place before the first prompt.
    let _governor = match signals::install(TerminationPolicy::default()) {
        Ok(governor) => governor,
        Err(err) => {
            eprintln!("{err}");
            process::exit(EXIT_FAILURE);
        }
    };

    // Output handles stay unlocked: a forked child may still need stderr.
    let mut repl = Repl::new(
        config,
        io::stdin().lock(),
        io::stdout(),
        io::stderr(),
        ForkExec,
    );

    match repl.run() {
        Shutdown::Exit(status) => process::exit(status),
        Shutdown::EndOfInput => process::exit(EXIT_SUCCESS),
        Shutdown::Explode => explode(),
    }
}
