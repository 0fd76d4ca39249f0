use std::io;

use thiserror::Error;

/// Errors raised while parsing or validating a [`Policy`](crate::Policy).
///
/// A policy error is fatal for the whole call that encountered it; no
/// partial scan result is produced.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy document could not be parsed as JSON.
    #[error("policy is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The policy parsed but its directives are inconsistent.
    #[error("policy is invalid: {reason}")]
    Invalid { reason: String },
}

impl PolicyError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PolicyError::Invalid {
            reason: reason.into(),
        }
    }
}

/// Errors raised while scanning a single markup value.
///
/// `Sanitizer::scan` propagates these to the caller. During a batch scan
/// they are caught at the per-value boundary and recorded as error
/// messages instead, so one bad value never aborts the batch.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The input exceeds the policy's `max_input_size` directive.
    #[error("input of {size} bytes exceeds the maximum allowed size of {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    /// The cleaned document could not be written back to text.
    #[error("failed to serialize cleaned markup: {0}")]
    Serialize(#[from] io::Error),

    /// The serialized output was not valid UTF-8.
    #[error("serialized markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
