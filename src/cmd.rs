//! Command handlers
//!
//! External programs are started through a [`Launcher`], so the loop never
//! talks to the operating system directly. [`ForkExec`] is the real backend.

use crate::constants::EXIT_SUCCESS;
use crate::errors::LaunchError;
use crate::parse::Program;
use nix::errno::Errno;
use nix::libc;
use nix::sys::mman::{MapFlags, ProtFlags, mmap_anonymous};
use nix::sys::signal::{SigHandler, Signal, raise, signal};
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, execvp, fork};
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Capability to start a program and wait for it
///
/// A handle returned by [`Launcher::spawn`] is consumed by [`Launcher::wait`],
/// so it cannot outlive the command it belongs to.
pub trait Launcher {
    type Handle;

    /// Starts `program` with no arguments.
    fn spawn(&mut self, program: &Program) -> Result<Self::Handle, LaunchError>;

    /// Blocks until the child behind `handle` has finished.
    ///
    /// The child's exit status is discarded.
    fn wait(&mut self, handle: Self::Handle) -> Result<(), LaunchError>;
}

/// Runs one external program to completion
///
/// Nothing is waited on if the program could not be started.
pub fn launch_and_wait<L: Launcher>(launcher: &mut L, program: &Program) -> Result<(), LaunchError> {
    let handle = launcher.spawn(program)?;
    launcher.wait(handle)
}

/// Launcher backed by `fork(2)`, `execvp(3)` and `waitpid(2)`
///
/// The program is looked up on `PATH` and inherits the environment
/// and the standard streams of the shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkExec;

impl Launcher for ForkExec {
    type Handle = Pid;

    fn spawn(&mut self, program: &Program) -> Result<Pid, LaunchError> {
        // SAFETY: the shell is single-threaded, and the child only execs,
        // writes one diagnostic and exits.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!(%program, %child, "spawned child");
                Ok(child)
            }
            Ok(ForkResult::Child) => exec_or_exit(program),
            Err(errno) => Err(LaunchError::Fork(errno)),
        }
    }

    fn wait(&mut self, child: Pid) -> Result<(), LaunchError> {
        loop {
            match waitpid(child, None) {
                Ok(status) => {
                    debug!(?status, "child finished");
                    return Ok(());
                }
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(LaunchError::Wait(errno)),
            }
        }
    }
}

/// Replaces the child with `program`; if that fails, reports why and exits 0
fn exec_or_exit(program: &Program) -> ! {
    // The Rust runtime ignores SIGPIPE, and an ignored disposition survives exec.
    // SAFETY: restores the default action, no handler is involved.
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    let name = program.as_c_str();
    let errno = match execvp(name, &[name]) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };

    eprintln!("{}", LaunchError::Exec(errno));

    // SAFETY: `_exit` leaves the parent's buffered output alone.
    unsafe { libc::_exit(EXIT_SUCCESS) }
}

/// Faults the shell process on purpose.
///
/// Reads from a page mapped without any access rights, which the kernel answers
/// with `SIGSEGV`. With the signal governor installed, that prints the fault notice
/// and exits with the fault status. Raises the signal directly if the page
/// cannot be mapped, and aborts if the process somehow survives both.
pub fn explode() -> ! {
    // SAFETY: a fresh anonymous mapping does not alias any Rust object.
    let page = unsafe {
        mmap_anonymous(
            None,
            NonZeroUsize::MIN,
            ProtFlags::PROT_NONE,
            MapFlags::MAP_PRIVATE,
        )
    };

    match page {
        Ok(page) => {
            // SAFETY: deliberately unsound; the read faults before it produces a value.
            let _ = unsafe { page.cast::<u8>().as_ptr().read_volatile() };
        }
        Err(errno) => warn!(%errno, "could not map a guard page, raising the fault directly"),
    }

    let _ = raise(Signal::SIGSEGV);
    std::process::abort()
}

