use std::fmt;

use crate::log::LogError;

/// Stable error codes surfaced by the CLI and matched on by agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidInput,
    InvalidSessionName,
    NotFound,
    InvalidStateTransition,
    AmbiguousId,
    CorruptLog,
    LogWriteFailed,
    LockContention,
    Timeout,
}

impl ErrorCode {
    /// The `E####` identifier. Never renumbered once released.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidInput => "E1003",
            Self::InvalidSessionName => "E1004",
            Self::NotFound => "E2001",
            Self::InvalidStateTransition => "E2002",
            Self::AmbiguousId => "E2004",
            Self::CorruptLog => "E3001",
            Self::LogWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::Timeout => "E5003",
        }
    }

    /// One-line summary of the failure class.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidInput => "Invalid input",
            Self::InvalidSessionName => "Invalid session name",
            Self::NotFound => "Entity not found",
            Self::InvalidStateTransition => "Invalid state transition",
            Self::AmbiguousId => "Ambiguous ID prefix",
            Self::CorruptLog => "Corrupt session log",
            Self::LogWriteFailed => "Session log I/O failed",
            Self::LockContention => "Lock contention",
            Self::Timeout => "Operation timed out",
        }
    }

    /// What to try next, when there is something useful to say.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .orbit/config.toml and retry."),
            Self::InvalidInput | Self::NotFound => None,
            Self::InvalidSessionName => {
                Some("Use only ASCII letters, digits, '-' and '_' (max 64 characters).")
            }
            Self::InvalidStateTransition => {
                Some("Check the task's current status; completed tasks can only be reopened.")
            }
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::CorruptLog => Some("Inspect the session file; a hand edit may have broken it."),
            Self::LogWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other orbit process releases its lock."),
            Self::Timeout => Some("Retry with a longer timeout."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Coarse error taxonomy exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed, missing, or out-of-enum input. Nothing was appended.
    Validation,
    /// The referenced entity is absent from replayed state. Nothing was appended.
    NotFound,
    /// A prefix matched more than one candidate. Nothing was appended.
    Ambiguous,
    /// The log failed. The command may or may not have been applied.
    Infrastructure,
}

/// Errors returned by store facade operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("cannot move {id} from {from} to {to}: {reason}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("ambiguous {kind} prefix '{prefix}': matches {}", .matches.join(", "))]
    Ambiguous {
        kind: &'static str,
        prefix: String,
        matches: Vec<String>,
    },

    #[error(transparent)]
    Log(#[from] LogError),
}

impl StoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Which class of failure this is.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::InvalidTransition { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Ambiguous { .. } => ErrorCategory::Ambiguous,
            Self::Log(LogError::InvalidSession { .. }) => ErrorCategory::Validation,
            Self::Log(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Ambiguous { .. } => ErrorCode::AmbiguousId,
            Self::Log(err) => err.code(),
        }
    }

    /// Remediation hint for this error, if its code has one.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
