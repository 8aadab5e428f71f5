//! SHA-crypt (`$5$` and `$6$`) as specified by Ulrich Drepper.
//!
//! The rounds field is optional in the encoded form; digests without one
//! keep it absent so they re-encode unchanged and derive with the
//! historical 5000 rounds.

mod digest;
mod hasher;

pub use digest::ShaCryptDigest;
pub use hasher::ShaCryptHasher;

use std::fmt;

use super::{Digest, crypt_checksum, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::{decode_parameters, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "shacrypt";

pub const ALG_IDENTIFIER_SHA256: &str = "5";
pub const ALG_IDENTIFIER_SHA512: &str = "6";

pub const ITERATIONS_MIN: u32 = 1000;
pub const ITERATIONS_MAX: u32 = 999_999_999;
pub const ITERATIONS_DEFAULT_SHA256: u32 = 1_000_000;
pub const ITERATIONS_DEFAULT_SHA512: u32 = 500_000;

/// Rounds used when the encoded form has no rounds field.
pub const ITERATIONS_DEFAULT_OMITTED: u32 = 5000;

pub const SALT_LENGTH_MIN: usize = 1;
pub const SALT_LENGTH_MAX: usize = 16;
pub const SALT_LENGTH_DEFAULT: usize = SALT_LENGTH_MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    Sha256,
    #[default]
    Sha512,
}

impl Variant {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ALG_IDENTIFIER_SHA256 | "sha256" => Some(Self::Sha256),
            ALG_IDENTIFIER_SHA512 | "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sha256 => ALG_IDENTIFIER_SHA256,
            Self::Sha512 => ALG_IDENTIFIER_SHA512,
        }
    }

    pub fn default_iterations(self) -> u32 {
        match self {
            Self::Sha256 => ITERATIONS_DEFAULT_SHA256,
            Self::Sha512 => ITERATIONS_DEFAULT_SHA512,
        }
    }

    /// Derives the crypt text key; `None` rounds derive with the omitted default.
    pub fn key(self, password: &[u8], salt: &str, rounds: Option<u32>) -> Result<String> {
        let setup = pwhash::HashSetup {
            salt: Some(salt),
            rounds: Some(rounds.unwrap_or(ITERATIONS_DEFAULT_OMITTED)),
        };

        #[allow(deprecated)]
        let encoded = match self {
            Self::Sha256 => pwhash::sha256_crypt::hash_with(setup, password),
            Self::Sha512 => pwhash::sha512_crypt::hash_with(setup, password),
        }
        .map_err(|e| Error::KeyDerivationFailed(format!("{self} crypt failed: {e}")))?;

        crypt_checksum(&encoded)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        })
    }
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER_SHA256, decode_boxed)?;
    decoder.register(ALG_IDENTIFIER_SHA512, decode_boxed)?;
    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes `$5$` and `$6$` digests with or without a rounds field.
pub fn decode(encoded: &str) -> Result<ShaCryptDigest> {
    let parts = split(encoded, None);

    let (options, salt, key) = match parts.as_slice() {
        [_, _, salt, key] => (None, *salt, *key),
        [_, _, options, salt, key] => (Some(*options), *salt, *key),
        _ => return Err(invalid_format(ALG_NAME, parts.len())),
    };

    let variant =
        Variant::from_identifier(parts[1]).ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;

    ensure_decoded_key(key.as_bytes())?;

    let mut rounds = None;

    if let Some(options) = options {
        for param in decode_parameters(options)? {
            match param.key {
                "rounds" => rounds = Some(param.u32()?),
                _ => return Err(Error::option_key(param.key, param.value)),
            }
        }
    }

    Ok(ShaCryptDigest::new(variant, rounds, salt.to_string(), key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_APPLE: &str =
        "$5$rounds=500000$GVVEl8Y7GaqO440/$mr4l6Y7NrD33RcxG1R6tjIeexFAezrA2fn2lKott/T9";
    const SHA512_OMITTED: &str = "$6$rB2PL49BuajVczWm$sA.XUPEt/j6k4kFnO58EDKsEU8rXau47.eSH6lpqc/tgC9Y0BbYcG7H3.KmMMpthWMcip/xmDn83nTUXK5Vp90";

    #[test]
    fn sha256_with_rounds() {
        let digest = decode(SHA256_APPLE).unwrap();
        assert_eq!(digest.variant(), Variant::Sha256);
        assert_eq!(digest.rounds(), Some(500_000));
        assert_eq!(digest.salt(), "GVVEl8Y7GaqO440/");
        assert_eq!(digest.encode(), SHA256_APPLE);
        assert!(digest.matches("apple123"));
        assert!(!digest.matches("apple124"));
    }

    #[test]
    fn omitted_rounds_stay_omitted() {
        let digest = decode(SHA512_OMITTED).unwrap();
        assert_eq!(digest.variant(), Variant::Sha512);
        assert_eq!(digest.rounds(), None);
        assert_eq!(digest.encode(), SHA512_OMITTED);
        assert!(digest.matches("password"));
    }

    #[test]
    fn sha256_omitted_rounds() {
        let encoded = "$5$4X/QmdRP6q7Ilhpc$2sperIXN6jawEYd8a8arineQHqYIEGURjZGdD4H4xs8";
        let digest = decode(encoded).unwrap();
        assert!(digest.matches("password"));
        assert_eq!(digest.encode(), encoded);
    }

    #[test]
    fn unknown_option() {
        match decode("$6$cost=5000$salt$key") {
            Err(Error::InvalidOptionKey { key, value }) => {
                assert_eq!(key, "cost");
                assert_eq!(value, "5000");
            }
            other => panic!("expected InvalidOptionKey, got: {other:?}"),
        }
    }

    #[test]
    fn rounds_value_must_be_numeric() {
        assert!(matches!(
            decode("$6$rounds=many$salt$key"),
            Err(Error::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn field_count() {
        assert!(matches!(decode("$6$key"), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            decode("$6$rounds=5000$salt$key$extra"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn empty_key() {
        assert!(matches!(
            decode("$5$rounds=5000$salt$"),
            Err(Error::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn unknown_identifier() {
        assert!(matches!(
            decode("$7$rounds=5000$salt$key"),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
