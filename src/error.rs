//! Error types returned by screen operations.
//!
//! The audio layer reports failures as `anyhow::Error`; screens convert them into
//! [`ClipError`] so the caller can tell a refused permission from a failed device
//! call or an action that made no sense in the current state.

use std::fmt;
use thiserror::Error;

/// A user-facing operation on one of the screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RequestPermission,
    StartRecording,
    StopRecording,
    PlayRecording,
    SaveRecording,
    LoadSound,
    PlaySound,
    PauseSound,
    ResumeSound,
    UnloadSound,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RequestPermission => "request permission",
            Self::StartRecording => "start recording",
            Self::StopRecording => "stop recording",
            Self::PlayRecording => "play recording",
            Self::SaveRecording => "save recording",
            Self::LoadSound => "load sound",
            Self::PlaySound => "play sound",
            Self::PauseSound => "pause sound",
            Self::ResumeSound => "resume sound",
            Self::UnloadSound => "unload sound",
        };
        f.write_str(name)
    }
}

/// Failure of a screen operation.
#[derive(Debug, Error)]
pub enum ClipError {
    /// Microphone access was refused.
    #[error("Permission to access audio is required: {reason}")]
    PermissionDenied {
        /// Why access was refused.
        reason: String,
    },

    /// The audio or filesystem layer rejected the call.
    #[error("Failed to {operation}: {reason}")]
    OperationFailed {
        /// Operation that failed.
        operation: Operation,
        /// Error reported by the underlying layer.
        reason: String,
    },

    /// The operation does not apply to the current state.
    #[error("Cannot {operation}: {reason}")]
    PreconditionUnmet {
        /// Operation that was skipped.
        operation: Operation,
        /// What was missing.
        reason: &'static str,
    },
}

impl ClipError {
    pub fn failed(operation: Operation, err: impl fmt::Display) -> Self {
        Self::OperationFailed {
            operation,
            reason: err.to_string(),
        }
    }

    pub fn unmet(operation: Operation, reason: &'static str) -> Self {
        Self::PreconditionUnmet { operation, reason }
    }

    /// Returns true for errors caused by acting in the wrong state rather than by a failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionUnmet { .. })
    }

    /// Writes the error to the log at a level matching its kind.
    pub fn log(&self) {
        match self {
            Self::PreconditionUnmet { .. } => tracing::info!("{self}"),
            Self::PermissionDenied { .. } => tracing::warn!("{self}"),
            Self::OperationFailed { .. } => tracing::error!("{self}"),
        }
    }
}

/// Result type alias using [`ClipError`].
pub type Result<T> = std::result::Result<T, ClipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failed_message() {
        let err = ClipError::failed(Operation::SaveRecording, "disk full");
        assert_eq!(err.to_string(), "Failed to save recording: disk full");
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_precondition_message() {
        let err = ClipError::unmet(Operation::PlaySound, "sound not loaded yet");
        assert_eq!(err.to_string(), "Cannot play sound: sound not loaded yet");
        assert!(err.is_precondition());
    }
}
