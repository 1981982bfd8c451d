pub mod data;

use crate::position::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A diagnostic message template with a stable `TSN` code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticTemplate {
    pub code: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

pub mod codes {
    pub use super::data::codes::*;
}

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable code string, e.g. `TSN5107`
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
            location: None,
            hint: None,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            location: None,
            hint: None,
        }
    }

    /// Build a diagnostic from the static template table, substituting
    /// `{0}`-style placeholders with `args`.
    pub fn from_template(code: &str, args: &[&str]) -> Self {
        let template = data::find_template(code);
        let (severity, message) = match template {
            Some(t) => (t.severity, format_message(t.message, args)),
            None => (Severity::Error, format!("unknown diagnostic {code}")),
        };
        Self {
            code: code.to_string(),
            severity,
            message,
            location: None,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc} {}: {}", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Check whether any diagnostic in the slice is error severity.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitution() {
        assert_eq!(format_message("'{0}' expected.", &["}"]), "'}' expected.");
        assert_eq!(
            format_message("{0} and {1}", &["a", "b"]),
            "a and b"
        );
    }

    #[test]
    fn from_template_resolves_severity() {
        let diag = Diagnostic::from_template(codes::ATTRIBUTE_TARGET_NOT_FOUND, &["Widget"]);
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.message.contains("Widget"));
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let diags = vec![Diagnostic::warning(codes::ATTRIBUTE_TARGET_NOT_FOUND, "w")];
        assert!(!has_errors(&diags));
    }
}
