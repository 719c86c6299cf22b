use log::warn;

use crate::ir::Diagnostic;
use crate::parse::pointer::Pointer;

/// Per-item working state for one definition or path being transformed.
///
/// Each parallel task owns its own scope; the caller merges them in input
/// order once the fan-out completes.
#[derive(Debug, Default)]
pub struct Scope {
    subject: String,
    /// External pointer keys currently being inlined, outermost first.
    pub(crate) stack: Vec<String>,
    /// External targets that closed a cycle and need a top-level name.
    pub(crate) promoted: Vec<Pointer>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Scope {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Record and log a recoverable problem.
    pub fn warn(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(self.subject.clone(), message);
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn promote(&mut self, pointer: &Pointer) {
        if !self.promoted.iter().any(|p| p.key() == pointer.key()) {
            self.promoted.push(pointer.clone());
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
