//! Animation error types

use thiserror::Error;

/// Errors raised while building or realising animations.
///
/// These correspond to invalid authoring input and are returned to the
/// caller immediately rather than degraded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// `repeat` exceeded the configured maximum
    #[error("Repeat count too high, must be less than {max} (got {repeat})")]
    RepeatTooHigh { repeat: u32, max: u32 },

    /// A transition named a generator nobody registered
    #[error("Unknown generator type `{0}`")]
    UnknownGenerator(String),

    /// Physics generators only animate numbers
    #[error("`{generator}` generators need numeric keyframes, found {found:?}")]
    NonNumericKeyframes {
        generator: &'static str,
        found: String,
    },

    /// A value was animated with no keyframes at all
    #[error("No keyframes supplied for `{0}`")]
    EmptyKeyframes(String),

    /// `times` cannot be used with the supplied keyframes
    #[error("Invalid keyframe times for `{property}`: {reason}")]
    InvalidTimes { property: String, reason: String },

    /// An element subject could not be resolved
    #[error("No element registered for subject `{0}`")]
    UnknownSubject(String),

    /// The platform refused to start an accelerated animation
    #[error("Native animation unavailable: {0}")]
    NativeUnavailable(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
