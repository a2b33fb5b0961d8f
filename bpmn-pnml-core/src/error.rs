//! Error taxonomy shared by the transformation core and its HTTP boundary.
//!
//! The core itself never matches on these variants — internal passes
//! propagate with `anyhow::Result` and `?`, the same way the compiler
//! passes this crate is descended from always did. `TransformError` exists
//! at the seam between the core and the HTTP layer, which is the only
//! place that turns a variant into a status code.

use thiserror::Error;

/// Known, user-visible faults: the caller did something the contract
/// disallows and the message is safe to return verbatim.
#[derive(Debug, Error)]
pub enum KnownError {
    #[error("unexpected query parameter: {0}")]
    UnexpectedQueryParameter(String),
    #[error("lane '{0}' has members but no name")]
    UnnamedLane(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("token check unsuccessful")]
    TokenCheckUnsuccessful,
    #[error("no request tokens available")]
    NoRequestTokensAvailable,
}

/// Internal faults: real bugs or unsupported input shapes. The message is
/// logged in full but the caller only sees a generic internal-error body.
#[derive(Debug, Error)]
pub enum PrivateError {
    #[error("internal transformation exception: {0}")]
    InternalTransformationException(String),
    #[error("missing required environment variable: {0}")]
    MissingEnvironmentVariable(String),
    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(String),
}

/// The taxonomy the HTTP layer maps to a response. Every fault the core
/// can raise round-trips through one of these three buckets.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Known(#[from] KnownError),
    #[error(transparent)]
    Private(#[from] PrivateError),
    /// Anything else — a panic-free fault the taxonomy above doesn't name.
    /// The caller gets a canonical message; logs get the real one.
    #[error("unexpected error: {0}")]
    Unexpected(anyhow::Error),
}

impl TransformError {
    /// Classifies an `anyhow::Error` bubbled up from the transformation
    /// passes by downcasting to the known taxonomy members first, falling
    /// back to `Unexpected`. Internal passes raise `KnownError`/`PrivateError`
    /// through `anyhow::bail!`/`.into()` exactly like any other internal
    /// fault; only this boundary ever inspects which one it was.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<KnownError>() {
            Ok(known) => return TransformError::Known(known),
            Err(err) => err,
        };
        match err.downcast::<PrivateError>() {
            Ok(private) => TransformError::Private(private),
            Err(err) => TransformError::Unexpected(err),
        }
    }

    /// `true` for faults safe to show to the caller verbatim.
    pub fn is_known(&self) -> bool {
        matches!(self, TransformError::Known(_))
    }

    /// The message shown to the HTTP caller: verbatim for `Known`, a
    /// generic internal message for `Private`, and a canonical message for
    /// anything `Unexpected`. Full detail always goes to `tracing` at the
    /// call site, never only here.
    pub fn caller_message(&self) -> String {
        match self {
            TransformError::Known(e) => e.to_string(),
            TransformError::Private(_) => "internal error".to_string(),
            TransformError::Unexpected(_) => "Unexpected error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
