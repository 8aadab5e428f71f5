#![forbid(unsafe_code)]

//! Decode, verify and produce encoded password digests.
//!
//! Supports the PHC-like `$id$...` format used by argon2, bcrypt, pbkdf2,
//! scrypt/yescrypt and the crypt(3) families, plus the LDAP and Passlib
//! spellings that [`normalize`] rewrites into it.

pub mod algorithm;
pub mod decoder;
pub mod encoding;
mod error;
mod normalize;
pub mod random;
mod serializable;

pub use crate::algorithm::{Digest, Hasher};
pub use crate::decoder::{Decoder, decode};
pub use crate::error::{Error, Result};
pub use crate::normalize::normalize;
pub use crate::serializable::SerializableDigest;

/// Decodes `encoded` with the default registry and matches `password` against it.
///
/// # Errors
///
/// Returns an error when `encoded` can't be decoded or the stored parameters
/// can't be used. A wrong password is `Ok(false)`.
pub fn check_password(password: &str, encoded: &str) -> Result<bool> {
    decoder::global()?.decode(encoded)?.matches_advanced(password)
}

/// Like [`check_password`], but also accepts plaintext and the legacy
/// md5crypt, sha1crypt and LDAP MD5 encodings.
pub fn check_password_with_plaintext(password: &str, encoded: &str) -> Result<bool> {
    decoder::global_all()?.decode(encoded)?.matches_advanced(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_password_with_default_profile() {
        let encoded = "$6$rB2PL49BuajVczWm$sA.XUPEt/j6k4kFnO58EDKsEU8rXau47.eSH6lpqc/tgC9Y0BbYcG7H3.KmMMpthWMcip/xmDn83nTUXK5Vp90";
        assert!(check_password("password", encoded).unwrap());
        assert!(!check_password("wrong", encoded).unwrap());
    }

    #[test]
    fn plaintext_needs_all_profile() {
        assert!(matches!(
            check_password("password", "$plaintext$password"),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(check_password_with_plaintext("password", "$plaintext$password").unwrap());
        assert!(check_password_with_plaintext("password", "{CLEARTEXT}password").unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(matches!(
            check_password("password", "garbage"),
            Err(Error::InvalidFormat(_))
        ));
    }
}
