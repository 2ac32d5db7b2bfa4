//! Signal Governor
//!
//! Turns the fault, interrupt and termination signals into an orderly shutdown:
//! a fixed message on standard error followed by a fixed exit status.
//!
//! The mapping lives in a [`TerminationPolicy`] that is built like any other value
//! and handed to [`install`] once, before the shell reads its first line.
//! Every other signal keeps its default disposition.
//!
//! # References
//!
//! - [signal-safety(7)](https://man7.org/linux/man-pages/man7/signal-safety.7.html)
//! - [sigaction(2)](https://man7.org/linux/man-pages/man2/sigaction.2.html)

use crate::constants::{
    EXIT_FAULT, EXIT_SUCCESS, FAULT_NOTICE, INTERRUPT_NOTICE, TERMINATION_NOTICE,
};
use crate::errors::SetupError;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, pthread_sigmask, sigaction,
};
use nix::unistd;
use std::os::fd::{BorrowedFd, RawFd};
use std::sync::OnceLock;
use tracing::debug;

/// The policy the handlers consult; set exactly once by [`install`]
static POLICY: OnceLock<TerminationPolicy> = OnceLock::new();

/// How the shell ends when a governed signal arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub signal: Signal,
    /// Written verbatim to standard error
    pub message: &'static str,
    /// Passed to `_exit`
    pub status: i32,
}

/// Mapping from governed signal to shutdown message and exit status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationPolicy {
    rules: Vec<Rule>,
}

impl Default for TerminationPolicy {
    /// Fault exits with -1; interrupt and termination exit with 0.
    fn default() -> Self {
        Self::new()
            .with_rule(Signal::SIGSEGV, FAULT_NOTICE, EXIT_FAULT)
            .with_rule(Signal::SIGINT, INTERRUPT_NOTICE, EXIT_SUCCESS)
            .with_rule(Signal::SIGTERM, TERMINATION_NOTICE, EXIT_SUCCESS)
    }
}

impl TerminationPolicy {
    /// An empty policy governs nothing.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, replacing an earlier rule for the same signal.
    pub fn with_rule(mut self, signal: Signal, message: &'static str, status: i32) -> Self {
        self.rules.retain(|rule| rule.signal != signal);
        self.rules.push(Rule {
            signal,
            message,
            status,
        });
        self
    }

    pub fn rule_for(&self, signal: Signal) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.signal == signal)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The set of governed signals
    pub fn signals(&self) -> SigSet {
        let mut set = SigSet::empty();
        for rule in &self.rules {
            set.add(rule.signal);
        }
        set
    }
}

/// Proof that the handlers are in place
///
/// There is nothing to release: the installed policy stays in force
/// until the process terminates.
#[derive(Debug)]
#[must_use]
pub struct Governor {
    policy: &'static TerminationPolicy,
}

impl Governor {
    pub fn policy(&self) -> &TerminationPolicy {
        self.policy
    }
}

/// Installs a handler for every signal the policy governs.
///
/// Only the first successful call takes effect; later calls return
/// [`SetupError::AlreadyInstalled`] and leave the handlers alone.
/// If any handler is rejected, the ones already installed are rolled back,
/// the policy is not kept, and the call may be retried.
pub fn install(policy: TerminationPolicy) -> Result<Governor, SetupError> {
    if POLICY.get().is_some() {
        return Err(SetupError::AlreadyInstalled);
    }

    // Governed signals are held back until the policy they consult is published.
    let governed = policy.signals();
    let mut previous_mask = SigSet::empty();
    pthread_sigmask(
        SigmaskHow::SIG_BLOCK,
        Some(&governed),
        Some(&mut previous_mask),
    )
    .map_err(SetupError::Signal)?;

    let published = install_handlers(&policy, governed)
        .and_then(|()| POLICY.set(policy).map_err(|_| SetupError::AlreadyInstalled));

    pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&previous_mask), None)
        .map_err(SetupError::Signal)?;
    published?;

    let policy = POLICY.get().ok_or(SetupError::AlreadyInstalled)?;
    Ok(Governor { policy })
}

/// Points every governed signal at [`terminate`]; on failure restores what it replaced
fn install_handlers(policy: &TerminationPolicy, governed: SigSet) -> Result<(), SetupError> {
    let mut replaced: Vec<(Signal, SigAction)> = Vec::with_capacity(policy.rules().len());

    for rule in policy.rules() {
        // Interrupted system calls are restarted, so ordinary I/O is retried.
        let mut flags = SaFlags::SA_RESTART;
        if rule.signal == Signal::SIGSEGV {
            // Lets a stack overflow still reach the handler.
            flags |= SaFlags::SA_ONSTACK;
        }
        // A governed signal cannot interrupt the handler of another one.
        let action = SigAction::new(SigHandler::Handler(terminate), flags, governed);

        // SAFETY: `terminate` only calls async-signal-safe functions.
        match unsafe { sigaction(rule.signal, &action) } {
            Ok(previous) => replaced.push((rule.signal, previous)),
            Err(errno) => {
                for (signal, previous) in replaced.iter().rev() {
                    // SAFETY: reinstates the disposition that was in place before.
                    let _ = unsafe { sigaction(*signal, previous) };
                }
                return Err(SetupError::Signal(errno));
            }
        }
        debug!(signal = %rule.signal, status = rule.status, "installed termination handler");
    }

    Ok(())
}

/// Where the notice for an ungoverned signal goes
const FALLBACK_FD: RawFd = libc::STDOUT_FILENO;

/// The handler for every governed signal; never returns
extern "C" fn terminate(signum: libc::c_int) {
    let rule = Signal::try_from(signum)
        .ok()
        .and_then(|signal| POLICY.get().and_then(|policy| policy.rule_for(signal)));

    let status = match rule {
        Some(rule) => {
            write_fd(libc::STDERR_FILENO, rule.message.as_bytes());
            rule.status
        }
        None => {
            let mut buf = [0u8; 32];
            write_fd(FALLBACK_FD, fallback_notice(signum, &mut buf));
            EXIT_SUCCESS
        }
    };

    // SAFETY: `_exit` is async-signal-safe and skips the atexit machinery.
    unsafe { libc::_exit(status) }
}

/// Writes all bytes to `raw` without taking any locks or allocating
fn write_fd(raw: RawFd, mut bytes: &[u8]) {
    // SAFETY: the standard descriptors stay open for the lifetime of the process.
    let fd = unsafe { BorrowedFd::borrow_raw(raw) };

    while !bytes.is_empty() {
        match unistd::write(fd, bytes) {
            Ok(0) => break,
            Ok(n) => bytes = &bytes[n..],
            Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
}

/// Renders `Caught signal N` and a newline into `buf`, without allocating
fn fallback_notice(signum: libc::c_int, buf: &mut [u8; 32]) -> &[u8] {
    const PREFIX: &[u8] = b"Caught signal ";

    let mut digits = [0u8; 12];
    let digits = format_signum(signum, &mut digits);
    let len = PREFIX.len() + digits.len() + 1;

    buf[..PREFIX.len()].copy_from_slice(PREFIX);
    buf[PREFIX.len()..len - 1].copy_from_slice(digits);
    buf[len - 1] = b'\n';

    &buf[..len]
}

/// Renders a signal number in decimal into `buf`, without allocating
fn format_signum(signum: libc::c_int, buf: &mut [u8; 12]) -> &[u8] {
    let mut value = signum.unsigned_abs();
    let mut start = buf.len();

    loop {
        start -= 1;
        buf[start] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    if signum < 0 {
        start -= 1;
        buf[start] = b'-';
    }

    &buf[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_governs_three_signals() {
        let policy = TerminationPolicy::default();
        assert_eq!(3, policy.rules().len());

        let fault = policy.rule_for(Signal::SIGSEGV).unwrap();
        assert_eq!(
            "A segmentation fault has been detected.\nExiting...\n",
            fault.message
        );
        assert_eq!(-1, fault.status);

        let interrupt = policy.rule_for(Signal::SIGINT).unwrap();
        assert_eq!(
            "\nAn interrupt signal has been received.\nExiting...\n",
            interrupt.message
        );
        assert_eq!(0, interrupt.status);

        let termination = policy.rule_for(Signal::SIGTERM).unwrap();
        assert_eq!(
            "\nA termination signal has been received.\nExiting...\n",
            termination.message
        );
        assert_eq!(0, termination.status);
    }

    #[test]
    fn other_signals_are_not_governed() {
        let policy = TerminationPolicy::default();
        assert!(policy.rule_for(Signal::SIGHUP).is_none());
        assert!(policy.rule_for(Signal::SIGCHLD).is_none());
        assert!(policy.rule_for(Signal::SIGPIPE).is_none());
    }

    #[test]
    fn later_rule_replaces_earlier_one() {
        let policy = TerminationPolicy::new()
            .with_rule(Signal::SIGINT, "first\n", 1)
            .with_rule(Signal::SIGINT, "second\n", 2);
        assert_eq!(1, policy.rules().len());
        assert_eq!(
            &Rule {
                signal: Signal::SIGINT,
                message: "second\n",
                status: 2,
            },
            policy.rule_for(Signal::SIGINT).unwrap()
        );
    }

    #[test]
    fn governed_signals_form_the_handler_mask() {
        let set = TerminationPolicy::default().signals();
        assert!(set.contains(Signal::SIGSEGV));
        assert!(set.contains(Signal::SIGINT));
        assert!(set.contains(Signal::SIGTERM));
        assert!(!set.contains(Signal::SIGHUP));
        assert!(!TerminationPolicy::new().signals().contains(Signal::SIGINT));
    }

    #[test]
    fn fallback_notice_goes_to_stdout() {
        let mut buf = [0u8; 32];
        assert_eq!(b"Caught signal 10\n", fallback_notice(10, &mut buf));
        assert_eq!(b"Caught signal -2147483648\n", fallback_notice(i32::MIN, &mut buf));
        assert_eq!(libc::STDOUT_FILENO, FALLBACK_FD);
    }

    #[test]
    fn empty_policy() {
        assert!(TerminationPolicy::new().rules().is_empty());
    }

    #[test]
    fn signum_rendering() {
        let mut buf = [0u8; 12];
        assert_eq!(b"0", format_signum(0, &mut buf));
        assert_eq!(b"11", format_signum(11, &mut buf));
        assert_eq!(b"-1", format_signum(-1, &mut buf));
        assert_eq!(b"-2147483648", format_signum(i32::MIN, &mut buf));
    }
}
