use log::debug;

/// Receives human-readable traces of register traffic and command outcomes.
///
/// Emission is fire-and-forget: a sink never influences control flow and its
/// output carries no machine-readable contract.
pub trait DiagnosticSink {
    fn emit(&mut self, message: &str);
}

impl<F: FnMut(&str)> DiagnosticSink for F {
    fn emit(&mut self, message: &str) {
        self(message);
    }
}

/// Sink forwarding every trace to the `log` crate at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, message: &str) {
        debug!("{message}");
    }
}
