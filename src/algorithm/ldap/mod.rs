//! RFC 2307 style `{SCHEME}<base64>` digests from LDAP directories.
//!
//! These have no `$` form, so the decoder profiles route them by prefix.
//! Salted schemes store `H(password || salt) || salt`; unsalted ones store
//! the bare hash. Both are single iteration.

mod digest;
mod hasher;

pub use digest::LdapDigest;
pub use hasher::LdapHasher;

use std::fmt;

use md5::Md5;
use sha1::Sha1;
use sha2::Digest as HashDigest;
use sha2::{Sha256, Sha512};

use super::{Digest, invalid_format};
use crate::decoder::Decoder;
use crate::encoding::base64::{Engine, STD};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "ldap";

pub const SALT_LENGTH_MIN: usize = 4;
pub const SALT_LENGTH_MAX: usize = 64;
pub const SALT_LENGTH_DEFAULT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    Md5,
    SaltedMd5,
    Sha1,
    SaltedSha1,
    Sha256,
    SaltedSha256,
    Sha512,
    #[default]
    SaltedSha512,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Md5,
        Variant::SaltedMd5,
        Variant::Sha1,
        Variant::SaltedSha1,
        Variant::Sha256,
        Variant::SaltedSha256,
        Variant::Sha512,
        Variant::SaltedSha512,
    ];

    /// Schemes registered by the default decoder profile.
    pub const SHA: [Variant; 6] = [
        Variant::Sha1,
        Variant::SaltedSha1,
        Variant::Sha256,
        Variant::SaltedSha256,
        Variant::Sha512,
        Variant::SaltedSha512,
    ];

    /// Accepts the scheme name with or without braces, in any case.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let name = identifier.trim_start_matches('{').trim_end_matches('}');

        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Scheme name without braces, e.g. `SSHA256`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::SaltedMd5 => "SMD5",
            Self::Sha1 => "SHA",
            Self::SaltedSha1 => "SSHA",
            Self::Sha256 => "SHA256",
            Self::SaltedSha256 => "SSHA256",
            Self::Sha512 => "SHA512",
            Self::SaltedSha512 => "SSHA512",
        }
    }

    /// Encoded prefix, e.g. `{SSHA256}`.
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Md5 => "{MD5}",
            Self::SaltedMd5 => "{SMD5}",
            Self::Sha1 => "{SHA}",
            Self::SaltedSha1 => "{SSHA}",
            Self::Sha256 => "{SHA256}",
            Self::SaltedSha256 => "{SSHA256}",
            Self::Sha512 => "{SHA512}",
            Self::SaltedSha512 => "{SSHA512}",
        }
    }

    /// Registry identifier the scheme prefix is routed to.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Md5 => "ldap-md5",
            Self::SaltedMd5 => "ldap-smd5",
            Self::Sha1 => "ldap-sha",
            Self::SaltedSha1 => "ldap-ssha",
            Self::Sha256 => "ldap-sha256",
            Self::SaltedSha256 => "ldap-ssha256",
            Self::Sha512 => "ldap-sha512",
            Self::SaltedSha512 => "ldap-ssha512",
        }
    }

    pub fn is_salted(self) -> bool {
        matches!(
            self,
            Self::SaltedMd5 | Self::SaltedSha1 | Self::SaltedSha256 | Self::SaltedSha512
        )
    }

    /// Hash output size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Md5 | Self::SaltedMd5 => 16,
            Self::Sha1 | Self::SaltedSha1 => 20,
            Self::Sha256 | Self::SaltedSha256 => 32,
            Self::Sha512 | Self::SaltedSha512 => 64,
        }
    }

    /// `H(password || salt)`.
    pub fn key(self, password: &[u8], salt: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 | Self::SaltedMd5 => hash::<Md5>(password, salt),
            Self::Sha1 | Self::SaltedSha1 => hash::<Sha1>(password, salt),
            Self::Sha256 | Self::SaltedSha256 => hash::<Sha256>(password, salt),
            Self::Sha512 | Self::SaltedSha512 => hash::<Sha512>(password, salt),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

fn hash<D: HashDigest>(password: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(password);
    hasher.update(salt);
    hasher.finalize().to_vec()
}

/// Registers every scheme in `variants` under its identifier and prefix.
pub fn register(decoder: &mut Decoder, variants: &[Variant]) -> Result<()> {
    for variant in variants {
        decoder.register(variant.identifier(), decode_boxed)?;
        decoder.register_prefix(variant.scheme(), variant.identifier())?;
    }

    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes `{SCHEME}<base64>`.
pub fn decode(encoded: &str) -> Result<LdapDigest> {
    let (variant, payload) = Variant::ALL
        .into_iter()
        .find_map(|v| encoded.strip_prefix(v.scheme()).map(|rest| (v, rest)))
        .ok_or_else(|| {
            Error::InvalidIdentifier(format!("'{encoded}' has no known {ALG_NAME} scheme prefix"))
        })?;

    if payload.contains('$') {
        return Err(invalid_format(ALG_NAME, payload.split('$').count()));
    }

    let raw = STD
        .decode(payload)
        .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;

    let size = variant.size();

    if raw.is_empty() {
        return Err(Error::InvalidKeyEncoding("key has 0 bytes".to_string()));
    }

    if raw.len() < size {
        return Err(Error::InvalidKeyEncoding(format!(
            "{variant} key must have {size} bytes but has {}",
            raw.len()
        )));
    }

    let (key, salt) = raw.split_at(size);

    match (variant.is_salted(), salt.is_empty()) {
        (true, true) => {
            return Err(Error::InvalidSaltEncoding(format!(
                "{variant} digest carries no salt"
            )));
        }
        (false, false) => {
            return Err(Error::InvalidKeyEncoding(format!(
                "{variant} key must have {size} bytes but has {}",
                raw.len()
            )));
        }
        _ => {}
    }

    Ok(LdapDigest::new(variant, salt.to_vec(), key.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openldap_vectors() {
        for encoded in [
            "{SHA}w0mcJylzCn+AfvuGdqkty2+KP48=",
            "{SSHA}zUmI4pewiNEHgqohjFzObVbD7VYM0mYT",
            "{SHA256}UNhY4JhezH9gQYqvDMWrWH9CwlcKiECVqejMrND2VFw=",
            "{SSHA256}BAX6mgsQ+Dg4kKsyURsrlngPhqBoG6NB/1hswAHkZeIdCc9AXXABwg==",
            "{SHA512}O7Eu2jwpjbXeJVl/VNkk8uF+eKJq2JU+2CGO5oLwu76QIeLzAJ0VLJEb8fJexoOpAnFBZnZ6+9jlvQ+wEk7Lig==",
            "{SSHA512}FXFpO1AxW+S7GAv+Ig07TTf5wbPH+pqnRWeBn0u76P62aLK8aeLltqnSnmz6GYS8ks2n1CRKQCXRlbuqHGq1HvXdYKIYz9Ee",
        ] {
            let digest = decode(encoded).unwrap();
            assert!(digest.matches("example"), "{encoded}");
            assert!(!digest.matches("password"), "{encoded}");
            assert_eq!(digest.encode(), encoded);
        }
    }

    #[test]
    fn md5_schemes() {
        let digest = decode("{MD5}X03MO1qnZdYdgyfeuILPmQ==").unwrap();
        assert_eq!(digest.variant(), Variant::Md5);
        assert!(digest.matches("password"));

        let digest = decode("{SMD5}swXK27O85U86pZxk/sAN6nNhbHQ=").unwrap();
        assert_eq!(digest.variant(), Variant::SaltedMd5);
        assert_eq!(digest.salt(), b"salt");
        assert!(digest.matches("password"));
    }

    #[test]
    fn salted_scheme_needs_salt() {
        assert!(matches!(
            decode("{SSHA}w0mcJylzCn+AfvuGdqkty2+KP48="),
            Err(Error::InvalidSaltEncoding(_))
        ));
    }

    #[test]
    fn unsalted_scheme_rejects_trailing_bytes() {
        assert!(matches!(
            decode("{SHA}zUmI4pewiNEHgqohjFzObVbD7VYM0mYT"),
            Err(Error::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn malformed_payloads() {
        assert!(matches!(decode("{SHA}"), Err(Error::InvalidKeyEncoding(_))));
        assert!(matches!(decode("{SHA}!!!"), Err(Error::InvalidKeyEncoding(_))));
        assert!(matches!(decode("{SHA}YWJj"), Err(Error::InvalidKeyEncoding(_))));
        assert!(matches!(decode("{SHA}a$b"), Err(Error::InvalidFormat(_))));
        assert!(matches!(decode("{SHA1}YWJj"), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn scheme_lookup() {
        assert_eq!(Variant::from_identifier("{ssha256}"), Some(Variant::SaltedSha256));
        assert_eq!(Variant::from_identifier("SHA"), Some(Variant::Sha1));
        assert_eq!(Variant::from_identifier("SHA384"), None);
    }
}
