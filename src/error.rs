//! Error type shared by every decoder, hasher and the registry.

use thiserror::Error;

/// Errors produced while decoding, validating or hashing password digests.
#[derive(Debug, Error)]
pub enum Error {
    #[error("encoded digest has an invalid format: {0}")]
    InvalidFormat(String),

    #[error("encoded digest has an invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("encoded digest has an invalid version: {0}")]
    InvalidVersion(String),

    #[error("encoded digest has an invalid option: option '{0}' is invalid")]
    InvalidOption(String),

    #[error("encoded digest has an invalid option key: option '{key}' with value '{value}' is unknown")]
    InvalidOptionKey { key: String, value: String },

    #[error("encoded digest has an invalid option value: option '{key}' has invalid value '{value}': {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("encoded digest has an invalid salt encoding: {0}")]
    InvalidSaltEncoding(String),

    #[error("encoded digest has an invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("parameter '{name}' must be between {min} and {max} but is set to '{value}'")]
    InvalidParameter {
        name: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },

    #[error("salt is invalid: {0}")]
    SaltInvalid(String),

    #[error("password is invalid: {0}")]
    PasswordInvalid(String),

    #[error("failed to derive the key with the provided parameters: {0}")]
    KeyDerivationFailed(String),

    #[error("failed to read random bytes for the salt: {0}")]
    SaltReadFailed(String),

    #[error("decoder registration failed: {0}")]
    DecoderRegistration(String),
}

impl Error {
    pub(crate) fn option_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidOptionValue {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn option_key(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidOptionKey {
            key: key.into(),
            value: value.into(),
        }
    }

    pub(crate) fn parameter(name: &'static str, min: u64, max: u64, value: u64) -> Self {
        Self::InvalidParameter {
            name,
            min,
            max,
            value,
        }
    }

    /// The error is about the encoded form rather than the password or the
    /// hasher configuration.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::InvalidIdentifier(_)
                | Self::InvalidVersion(_)
                | Self::InvalidOption(_)
                | Self::InvalidOptionKey { .. }
                | Self::InvalidOptionValue { .. }
                | Self::InvalidSaltEncoding(_)
                | Self::InvalidKeyEncoding(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_error_carries_bounds() {
        let err = Error::parameter("p", 1, 16777215, 0);
        assert_eq!(
            err.to_string(),
            "parameter 'p' must be between 1 and 16777215 but is set to '0'"
        );
        assert!(!err.is_decode_error());
    }

    #[test]
    fn option_errors_are_decode_errors() {
        assert!(Error::option_key("x", "1").is_decode_error());
        assert!(Error::option_value("m", "abc", "invalid digit").is_decode_error());
        assert!(!Error::KeyDerivationFailed("boom".into()).is_decode_error());
    }
}
