use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    InputMalformed,
    VertexOutOfRange,
    InvalidWeight,
    ConfigParseError,
    ConfigInvalid,
    QuotientCyclic,
    DimensionMismatch,
    ExportWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::InputMalformed => "E1002",
            Self::VertexOutOfRange => "E1003",
            Self::InvalidWeight => "E1004",
            Self::ConfigParseError => "E2001",
            Self::ConfigInvalid => "E2002",
            Self::QuotientCyclic => "E3001",
            Self::DimensionMismatch => "E3002",
            Self::ExportWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Input file not found",
            Self::InputMalformed => "Malformed chain description",
            Self::VertexOutOfRange => "Vertex id out of range",
            Self::InvalidWeight => "Invalid transition weight",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigInvalid => "Invalid configuration value",
            Self::QuotientCyclic => "Class graph is not acyclic",
            Self::DimensionMismatch => "Matrix dimension mismatch",
            Self::ExportWriteFailed => "Diagram export failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => Some("Check the input path and read permissions."),
            Self::InputMalformed => {
                Some("Expected a vertex count followed by `from to probability` triples.")
            }
            Self::VertexOutOfRange => {
                Some("Vertex ids must lie in 1..=N, N being the first number.")
            }
            Self::InvalidWeight => Some("Transition probabilities must be finite numbers."),
            Self::ConfigParseError => Some("Fix syntax in strata.toml and retry."),
            Self::ConfigInvalid => {
                Some("Epsilons and tolerances must be positive numbers, max_iter at least 1.")
            },
            Self::QuotientCyclic => None,
            Self::DimensionMismatch => None,
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
