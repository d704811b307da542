/// Convenience result type used across themeloop.
pub type ThemeloopResult<T> = Result<T, ThemeloopError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The cache and rotation engine itself never fails: decode problems degrade to empty values.
/// Errors only surface at the edges (configuration, explicit decode helpers, the driver thread).
#[derive(thiserror::Error, Debug)]
pub enum ThemeloopError {
    /// Invalid user-provided values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while reading or parsing show configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors while decoding image or animation bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors from the background maintenance driver.
    #[error("driver error: {0}")]
    Driver(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThemeloopError {
    /// Build a [`ThemeloopError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ThemeloopError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ThemeloopError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ThemeloopError::Driver`] value.
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
