//! Password hashing algorithm families.
//!
//! Every family exposes a closed `Variant` enum, a `decode` function for its
//! encoded form, a concrete digest implementing [`Digest`] and a builder
//! implementing [`Hasher`].

pub mod argon2;
pub mod bcrypt;
pub mod ldap;
pub mod md5crypt;
pub mod pbkdf2;
pub mod plaintext;
pub mod scrypt;
pub mod sha1crypt;
pub mod shacrypt;

use std::fmt;

use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Default salt length in bytes for most hashers.
pub const SALT_LENGTH_DEFAULT: usize = 16;
/// Default key length in bytes for most hashers.
pub const KEY_LENGTH_DEFAULT: usize = 32;

pub(crate) const I32_MAX: u64 = i32::MAX as u64;

/// Decodes a normalized encoded digest.
pub type DecodeFn = fn(&str) -> Result<Box<dyn Digest>>;

/// A hashed password that can be stored and matched against candidates.
pub trait Digest: fmt::Display + fmt::Debug + Send + Sync {
    /// Family name, e.g. `argon2`.
    fn algorithm(&self) -> &'static str;

    /// Canonical encoded form.
    fn encode(&self) -> String;

    /// Matches raw password bytes, reporting why a match could not be attempted.
    ///
    /// # Errors
    ///
    /// Returns an error when the digest carries no key or the key derivation
    /// rejects the stored parameters. A wrong password is `Ok(false)`.
    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool>;

    fn matches_advanced(&self, password: &str) -> Result<bool> {
        self.matches_bytes_advanced(password.as_bytes())
    }

    /// Same as [`Digest::matches_advanced`] with every error treated as a mismatch.
    fn matches(&self, password: &str) -> bool {
        self.matches_bytes(password.as_bytes())
    }

    fn matches_bytes(&self, password: &[u8]) -> bool {
        self.matches_bytes_advanced(password).unwrap_or(false)
    }
}

/// A configured password hasher.
///
/// Defaults are filled in at most once per instance; every method that needs
/// them applies them first.
pub trait Hasher {
    /// Applies defaults and checks every parameter against its bounds.
    fn validate(&mut self) -> Result<()>;

    /// Hashes `password` with a freshly generated salt.
    fn hash(&mut self, password: &str) -> Result<Box<dyn Digest>>;

    /// Hashes `password` with a caller supplied salt.
    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>>;

    /// Hashes `password`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if [`Hasher::hash`] returns an error. Call [`Hasher::validate`]
    /// first to rule out configuration errors.
    fn must_hash(&mut self, password: &str) -> Box<dyn Digest> {
        match self.hash(password) {
            Ok(digest) => digest,
            Err(err) => panic!("password hashing failed: {err}"),
        }
    }
}

/// Constant time comparison of a stored key with a derived one.
pub(crate) fn keys_match(stored: &[u8], derived: &[u8]) -> bool {
    stored.ct_eq(derived).into()
}

pub(crate) fn ensure_key(algorithm: &str, key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::PasswordInvalid(format!("{algorithm} digest key has 0 bytes")));
    }
    Ok(())
}

pub(crate) fn ensure_decoded_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKeyEncoding("key has 0 bytes".to_string()));
    }
    Ok(())
}

pub(crate) fn invalid_identifier(identifier: &str, algorithm: &str) -> Error {
    Error::InvalidIdentifier(format!(
        "identifier '{identifier}' is not an encoded {algorithm} digest"
    ))
}

pub(crate) fn invalid_format(algorithm: &str, parts: usize) -> Error {
    Error::InvalidFormat(format!(
        "{algorithm} digest has an unexpected number of fields ({parts})"
    ))
}

/// Last `$` field of a crypt(3) string.
pub(crate) fn crypt_checksum(encoded: &str) -> Result<String> {
    match encoded.rsplit_once('$') {
        Some((_, checksum)) if !checksum.is_empty() => Ok(checksum.to_string()),
        _ => Err(Error::KeyDerivationFailed(
            "crypt output has no checksum field".to_string(),
        )),
    }
}

pub(crate) fn salt_length(min: usize, max: usize, actual: usize) -> Result<()> {
    if actual < min || actual > max {
        return Err(Error::SaltInvalid(format!(
            "salt bytes must have a length of between {min} and {max} but has a length of {actual}"
        )));
    }
    Ok(())
}
