//! Static diagnostic message data.
//!
//! Every user-facing diagnostic the compiler can emit is declared here with
//! its stable `TSN` code, default severity, and `{0}`-style message template.

use super::DiagnosticTemplate;
use super::Severity;

pub mod codes {
    pub const UNEXPECTED_TOKEN: &str = "TSN1002";
    pub const EXPECTED_TOKEN: &str = "TSN1005";
    pub const UNTERMINATED_STRING: &str = "TSN1010";
    pub const UNSUPPORTED_FEATURE: &str = "TSN2001";
    pub const UNRESOLVED_IMPORT: &str = "TSN2003";
    pub const NAMING_COLLISION: &str = "TSN3003";
    pub const IMPORT_CYCLE: &str = "TSN4005";
    pub const ATTRIBUTE_TARGET_NOT_FOUND: &str = "TSN5002";
    pub const INVALID_DICTIONARY_KEY: &str = "TSN5101";
    pub const GENERIC_DELEGATE_VALUE: &str = "TSN5104";
    pub const INDEX_NOT_INT32: &str = "TSN5107";
    pub const MODULE_LEVEL_TYPE_REQUIRED: &str = "TSN6001";
    pub const UNSUPPORTED_SYNTAX: &str = "TSN7203";
    pub const INTRINSIC_PROVENANCE: &str = "TSN7440";
}

/// All diagnostic message templates, sorted by code.
pub static DIAGNOSTIC_TEMPLATES: &[DiagnosticTemplate] = &[
    DiagnosticTemplate {
        code: codes::UNEXPECTED_TOKEN,
        severity: Severity::Error,
        message: "Unexpected token '{0}'.",
    },
    DiagnosticTemplate {
        code: codes::EXPECTED_TOKEN,
        severity: Severity::Error,
        message: "'{0}' expected.",
    },
    DiagnosticTemplate {
        code: codes::UNTERMINATED_STRING,
        severity: Severity::Error,
        message: "Unterminated string literal.",
    },
    DiagnosticTemplate {
        code: codes::UNSUPPORTED_FEATURE,
        severity: Severity::Error,
        message: "Unsupported language feature: {0}.",
    },
    DiagnosticTemplate {
        code: codes::UNRESOLVED_IMPORT,
        severity: Severity::Error,
        message: "Cannot resolve import '{0}'.",
    },
    DiagnosticTemplate {
        code: codes::NAMING_COLLISION,
        severity: Severity::Error,
        message: "Naming policy maps distinct identifiers to the same name '{0}': {1}.",
    },
    DiagnosticTemplate {
        code: codes::IMPORT_CYCLE,
        severity: Severity::Error,
        message: "Circular import detected: {0}.",
    },
    DiagnosticTemplate {
        code: codes::ATTRIBUTE_TARGET_NOT_FOUND,
        severity: Severity::Warning,
        message: "Attribute target '{0}' was not found in this module; the attribute is dropped.",
    },
    DiagnosticTemplate {
        code: codes::INVALID_DICTIONARY_KEY,
        severity: Severity::Error,
        message: "Index signature key must be 'string' or 'number', found '{0}'.",
    },
    DiagnosticTemplate {
        code: codes::GENERIC_DELEGATE_VALUE,
        severity: Severity::Error,
        message: "Generic function value '{0}' cannot be stored in a delegate; declare it as a function.",
    },
    DiagnosticTemplate {
        code: codes::INDEX_NOT_INT32,
        severity: Severity::Error,
        message: "Index expression is not provably Int32.",
    },
    DiagnosticTemplate {
        code: codes::MODULE_LEVEL_TYPE_REQUIRED,
        severity: Severity::Error,
        message: "Module-level declaration '{0}' requires an explicit type annotation.",
    },
    DiagnosticTemplate {
        code: codes::UNSUPPORTED_SYNTAX,
        severity: Severity::Error,
        message: "Syntax '{0}' has no C# mapping.",
    },
    DiagnosticTemplate {
        code: codes::INTRINSIC_PROVENANCE,
        severity: Severity::Error,
        message: "'{0}' is a core intrinsic and must come from the Tsonic core package.",
    },
];

/// Look up the template for a code, if declared.
pub fn find_template(code: &str) -> Option<&'static DiagnosticTemplate> {
    DIAGNOSTIC_TEMPLATES.iter().find(|t| t.code == code)
}
