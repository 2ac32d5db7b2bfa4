//! Macros Used Throughout the Library

/// Writes a diagnostic line to the given error stream
/// and records the same diagnostic as a `warn` event.
///
/// The stream is whatever the caller treats as standard error;
/// a failed write is ignored because there is nowhere left to report it.
///
/// It's meant to be used in the main (repl) loop.
#[macro_export]
macro_rules! report {
    ($err:expr, $error:expr) => {{
        let error = &$error;
        ::tracing::warn!(%error, "reported to operator");
        let _ = ::std::writeln!($err, "{error}");
    }};
}
