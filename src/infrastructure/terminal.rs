use std::io::Write;

use tracing::debug;

use crate::application::{Notifier, Toast, ToastKind};

/// Prints toasts to stderr, one line each, so they never mix with list
/// output on stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, toast: Toast) {
        debug!(is_error = (toast.kind == ToastKind::Error), message = %toast.message, "Toast");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{toast}");
    }
}
