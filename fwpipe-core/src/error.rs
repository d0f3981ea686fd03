/*!
 * Error types for the visitor pipeline
 *
 * One enum per stage of the pipeline lifecycle: composing the registry,
 * parsing the token stream, executing the stages, plus the errors a single
 * visitor can raise while being constructed or applied.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a visitor, either from its constructor or while it walks
/// the document.
#[derive(Error, Debug)]
pub enum VisitorError {
    #[error("invalid argument '{argument}' for {visitor}: {reason}")]
    InvalidArgument {
        visitor: String,
        argument: String,
        reason: String,
    },

    #[error("{visitor}: no node matched '{pattern}'")]
    NoMatch { visitor: String, pattern: String },

    #[error("{visitor}: {count} nodes matched '{pattern}', expected exactly one")]
    AmbiguousMatch {
        visitor: String,
        pattern: String,
        count: usize,
    },

    #[error("{visitor}: document is invalid: {}", .problems.join("; "))]
    Invalid {
        visitor: String,
        problems: Vec<String>,
    },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("{visitor}: {message}")]
    Failed { visitor: String, message: String },
}

impl VisitorError {
    pub fn invalid_argument(
        visitor: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            visitor: visitor.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running the same pipeline could plausibly succeed, e.g.
    /// after the user fixes a file on disk.
    pub fn is_recoverable(&self) -> bool {
        match self {
            VisitorError::InvalidArgument { .. } => false,
            VisitorError::NoMatch { .. } => false,
            VisitorError::AmbiguousMatch { .. } => false,
            VisitorError::Invalid { .. } => false,
            VisitorError::Io { .. } => true,
            VisitorError::Json(_) => false,
            VisitorError::Failed { .. } => false,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VisitorError::InvalidArgument { .. } => ErrorSeverity::Warning,
            VisitorError::NoMatch { .. } => ErrorSeverity::Warning,
            VisitorError::AmbiguousMatch { .. } => ErrorSeverity::Warning,
            VisitorError::Invalid { .. } => ErrorSeverity::Error,
            VisitorError::Io { .. } => ErrorSeverity::Error,
            VisitorError::Json(_) => ErrorSeverity::Error,
            VisitorError::Failed { .. } => ErrorSeverity::Error,
        }
    }
}

/// Severity levels used when reporting errors to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Warning => "WARN",
            ErrorSeverity::Error => "ERROR",
        }
    }
}

/// Composition-time registry errors. A conflict is a defect in how the
/// extension units were wired together, never a user error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("two visitors registered the same name: '{name}'")]
    Conflict { name: String },
}

/// Errors produced while turning the token stream into a pipeline.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not find visitor '{name}'")]
    UnknownVisitor { name: String },

    #[error("too few arguments for visitor '{name}', got {available}, expected {needed}")]
    InsufficientArguments {
        name: String,
        needed: usize,
        available: usize,
    },

    #[error("failed to construct visitor '{name}'")]
    ConstructionFailed {
        name: String,
        #[source]
        source: VisitorError,
    },
}

/// Errors produced while applying a parsed pipeline.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("stage {stage} ('{name}') failed")]
    StageFailed {
        /// 1-based position of the failing stage in the pipeline.
        stage: usize,
        name: String,
        #[source]
        source: VisitorError,
    },
}

impl ExecutionError {
    pub fn stage(&self) -> usize {
        match self {
            ExecutionError::StageFailed { stage, .. } => *stage,
        }
    }

    pub fn visitor_error(&self) -> &VisitorError {
        match self {
            ExecutionError::StageFailed { source, .. } => source,
        }
    }
}

/// Errors raised while loading or persisting a firmware document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document")]
    Serialize(#[from] serde_json::Error),
}

pub type VisitResult<T> = Result<T, VisitorError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type ExecutionResult<T> = Result<T, ExecutionError>;
pub type DocumentResult<T> = Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_arguments_message() {
        let err = ParseError::InsufficientArguments {
            name: "replace".to_string(),
            needed: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "too few arguments for visitor 'replace', got 1, expected 2"
        );
    }

    #[test]
    fn test_invalid_lists_every_problem() {
        let err = VisitorError::Invalid {
            visitor: "validate".to_string(),
            problems: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "validate: document is invalid: a; b");
    }

    #[test]
    fn test_error_recoverability() {
        let io = VisitorError::io("x.bin", std::io::Error::other("gone"));
        assert!(io.is_recoverable());
        assert_eq!(io.severity().as_str(), "ERROR");

        let arg = VisitorError::invalid_argument("find", "(", "unclosed group");
        assert!(!arg.is_recoverable());
        assert_eq!(arg.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_execution_error_exposes_stage() {
        let err = ExecutionError::StageFailed {
            stage: 2,
            name: "remove".to_string(),
            source: VisitorError::NoMatch {
                visitor: "remove".to_string(),
                pattern: "Dxe.*".to_string(),
            },
        };
        assert_eq!(err.stage(), 2);
        assert!(matches!(err.visitor_error(), VisitorError::NoMatch { .. }));
        assert!(err.to_string().starts_with("stage 2 ('remove') failed"));
    }
}
