//! Diagnostics for best-effort extraction
//!
//! Optional sub-structures of a Jenkinsfile never abort a conversion. When one
//! of them cannot be translated, the extractor records a [`Diagnostic`] and
//! continues with a documented fallback. [`Extracted`] threads the produced
//! value together with every diagnostic accumulated while producing it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, nothing was lost
    Info,
    /// An element was skipped or replaced by a default
    Warning,
}

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// W001: agent type not recognized, falling back to the default runner
    UnsupportedAgent,
    /// W002: parameter declaration without a `name`
    ParameterMissingName,
    /// W003: parameter declaration of an unsupported kind
    UnsupportedParameter,
    /// W004: parameter name declared more than once
    DuplicateParameter,
    /// W005: more than one cron trigger
    ExtraCronTrigger,
    /// W006: `when` block without a recognized branch condition
    UnsupportedWhen,
    /// W007: job identifier collision resolved by suffixing
    DuplicateJobId,
    /// W008: post block on a parallel stage
    ParallelPostIgnored,
    /// W009: stage without any step to run
    EmptyStage,
    /// W010: block keyword present but its braces never balance
    UnbalancedBlock,
    /// W011: branch pattern only approximated by the guard expression
    ApproximateGuard,
    /// W012: post condition other than always, success, failure or cleanup
    UnsupportedPostCondition,
    /// W013: cron expression rewritten for the target scheduler
    ApproximateSchedule,
    /// W014: stage header whose name or block cannot be read
    MalformedStage,
    /// I001: shared library reference that is not translated
    SharedLibrary,
}

impl DiagnosticCode {
    /// Short code printed in front of diagnostic messages
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::UnsupportedAgent => "W001",
            DiagnosticCode::ParameterMissingName => "W002",
            DiagnosticCode::UnsupportedParameter => "W003",
            DiagnosticCode::DuplicateParameter => "W004",
            DiagnosticCode::ExtraCronTrigger => "W005",
            DiagnosticCode::UnsupportedWhen => "W006",
            DiagnosticCode::DuplicateJobId => "W007",
            DiagnosticCode::ParallelPostIgnored => "W008",
            DiagnosticCode::EmptyStage => "W009",
            DiagnosticCode::UnbalancedBlock => "W010",
            DiagnosticCode::ApproximateGuard => "W011",
            DiagnosticCode::UnsupportedPostCondition => "W012",
            DiagnosticCode::ApproximateSchedule => "W013",
            DiagnosticCode::MalformedStage => "W014",
            DiagnosticCode::SharedLibrary => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::SharedLibrary => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// A recoverable problem found while converting one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub code: DiagnosticCode,

    /// The element concerned, e.g. `stage 'Build'` or `parameter 'ENV'`
    pub element: String,

    /// Human-readable reason, including the applied fallback
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.code(), self.element, self.message)
    }
}

/// A value produced by best-effort extraction, with its diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Extracted<T> {
    /// Wrap a value that was produced without any diagnostic
    pub fn new(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Record an additional diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move the diagnostics of a nested extraction into this one and return
    /// its value
    pub fn absorb<U>(&mut self, other: Extracted<U>) -> U {
        self.diagnostics.extend(other.diagnostics);
        other.value
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Extracted<U> {
        Extracted {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Warning)
    }
}

impl<T: Default> Default for Extracted<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::ParameterMissingName,
            "parameter #2",
            "declaration has no name, skipped",
        );
        assert_eq!(
            diagnostic.to_string(),
            "[W002] parameter #2: declaration has no name, skipped"
        );
    }

    #[test]
    fn test_absorb_moves_diagnostics() {
        let mut outer = Extracted::new(1);
        let inner = Extracted::with_diagnostics(
            "inner",
            vec![Diagnostic::new(DiagnosticCode::SharedLibrary, "library 'x'", "ignored")],
        );

        let value = outer.absorb(inner);
        assert_eq!(value, "inner");
        assert_eq!(outer.diagnostics.len(), 1);
        assert!(!outer.has_warnings());
    }

    #[test]
    fn test_severity_by_code() {
        assert_eq!(DiagnosticCode::SharedLibrary.severity(), Severity::Info);
        assert_eq!(DiagnosticCode::UnsupportedAgent.severity(), Severity::Warning);
    }
}
