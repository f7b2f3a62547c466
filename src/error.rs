//! # Error Handling
//!
//! Domain error type for the pilot library, with classification traits the
//! session loop uses to decide between skipping a tick and aborting the run.
//!
//! ## Error Classification
//!
//! - `Retryable`: errors worth another attempt (capture timeouts mostly)
//! - `Recoverable`: errors the loop can survive by skipping work
//! - `HasSeverity` / `HasRecoverySuggestion`: reporting helpers
//!
//! The session treats transient errors (see [`classify::is_transient`]) as
//! skipped ticks and aborts on everything else.

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Fatal,
}

/// Metadata about when and where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Whether this error is retryable
    pub retryable: bool,
    /// Whether this error is recoverable
    pub recoverable: bool,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            retryable: false,
            recoverable: false,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the pilot library.
#[derive(Debug)]
pub enum PilotError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Capture backend construction failures
    CaptureInit {
        backend: String,
        reason: String,
        context: ErrorContext,
    },
    /// Per-frame capture failures
    FrameCapture {
        reason: String,
        context: ErrorContext,
    },
    /// Input backend construction failures
    ActuatorInit {
        backend: String,
        reason: String,
        context: ErrorContext,
    },
    /// Frame preprocessing failures (scaling, normalization)
    Preprocess {
        stage: String,
        reason: String,
        context: ErrorContext,
    },
    /// Model loading and forward-pass failures
    Inference {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Synthetic key press failures
    Actuation {
        key: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Invalid state transitions (double start, stop while idle)
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Timeout errors
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl PilotError {
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn capture_init(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CaptureInit {
            backend: backend.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn frame_capture(reason: impl Into<String>) -> Self {
        Self::FrameCapture {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn actuator_init(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActuatorInit {
            backend: backend.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn preprocess(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Preprocess {
            stage: stage.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn inference(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inference {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn actuation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Actuation {
            key: key.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
            context: ErrorContext::new(),
        }
    }

    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Mark as retryable
    pub fn retryable(mut self) -> Self {
        self.context_mut().retryable = true;
        self
    }

    /// Mark as recoverable
    pub fn recoverable(mut self) -> Self {
        self.context_mut().recoverable = true;
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::CaptureInit { context, .. } => context,
            Self::FrameCapture { context, .. } => context,
            Self::ActuatorInit { context, .. } => context,
            Self::Preprocess { context, .. } => context,
            Self::Inference { context, .. } => context,
            Self::Actuation { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::CaptureInit { context, .. } => context,
            Self::FrameCapture { context, .. } => context,
            Self::ActuatorInit { context, .. } => context,
            Self::Preprocess { context, .. } => context,
            Self::Inference { context, .. } => context,
            Self::Actuation { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::CaptureInit { .. } => "capture_init",
            Self::FrameCapture { .. } => "frame_capture",
            Self::ActuatorInit { .. } => "actuator_init",
            Self::Preprocess { .. } => "preprocess",
            Self::Inference { .. } => "inference",
            Self::Actuation { .. } => "actuation",
            Self::Io { .. } => "io",
            Self::State { .. } => "state",
            Self::Timeout { .. } => "timeout",
            Self::External { .. } => "external",
        }
    }
}

impl fmt::Display for PilotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PilotError::Config {
                field,
                value,
                reason,
                ..
            } => write!(
                f,
                "Configuration error in '{}': {} (value: {})",
                field, reason, value
            ),
            PilotError::CaptureInit {
                backend, reason, ..
            } => write!(f, "Failed to initialize capture via {}: {}", backend, reason),
            PilotError::FrameCapture { reason, .. } => {
                write!(f, "Frame capture failed: {}", reason)
            }
            PilotError::ActuatorInit {
                backend, reason, ..
            } => write!(f, "Failed to initialize input via {}: {}", backend, reason),
            PilotError::Preprocess { stage, reason, .. } => {
                write!(f, "Preprocessing failed during {}: {}", stage, reason)
            }
            PilotError::Inference {
                operation, reason, ..
            } => write!(f, "Inference failed during {}: {}", operation, reason),
            PilotError::Actuation { key, reason, .. } => {
                write!(f, "Key press '{}' failed: {}", key, reason)
            }
            PilotError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(f, "I/O error during {} on '{}': {}", operation, path, source)
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            PilotError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => write!(
                f,
                "Invalid state transition from '{}' when attempting '{}': {}",
                current_state, attempted_operation, reason
            ),
            PilotError::Timeout {
                operation,
                duration_ms,
                ..
            } => write!(f, "Timeout during {} after {}ms", operation, duration_ms),
            PilotError::External {
                library, source, ..
            } => write!(f, "External library error in {}: {}", library, source),
        }
    }
}

impl StdError for PilotError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type PilotResult<T> = Result<T, PilotError>;

/// Trait for errors that can be retried
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;

    /// Get the recommended retry delay in milliseconds
    fn retry_delay_ms(&self) -> Option<u64> {
        None
    }
}

impl Retryable for PilotError {
    fn is_retryable(&self) -> bool {
        self.context().retryable
            || matches!(
                self,
                Self::Timeout { .. } | Self::FrameCapture { .. } | Self::Io { .. }
            )
    }

    fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            Self::Timeout { .. } => Some(1000),
            Self::FrameCapture { .. } => Some(50),
            Self::Io { .. } => Some(100),
            _ => None,
        }
    }
}

/// Trait for errors the loop can survive by skipping the current tick
pub trait Recoverable {
    /// Check if this error can be recovered from
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for PilotError {
    fn is_recoverable(&self) -> bool {
        self.context().recoverable
            || matches!(
                self,
                Self::Timeout { .. } | Self::FrameCapture { .. } | Self::Preprocess { .. }
            )
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for PilotError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for PilotError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Check if an error is transient (may resolve itself next tick)
    pub fn is_transient(error: &PilotError) -> bool {
        matches!(
            error,
            PilotError::Timeout { .. } | PilotError::FrameCapture { .. }
        )
    }

    /// Check if an error is fatal (cannot be recovered from)
    pub fn is_fatal(error: &PilotError) -> bool {
        matches!(
            error,
            PilotError::Config { .. }
                | PilotError::CaptureInit { .. }
                | PilotError::ActuatorInit { .. }
                | PilotError::State { .. }
        ) || error.severity() == ErrorSeverity::Fatal
    }
}

impl From<std::io::Error> for PilotError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<pilot_prep::PrepError> for PilotError {
    fn from(error: pilot_prep::PrepError) -> Self {
        Self::preprocess("scale", error.to_string())
    }
}
