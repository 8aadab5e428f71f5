//! bcrypt and the Passlib `bcrypt-sha256` wrapper.
//!
//! The standard form packs the salt and key into one field:
//! `$2b$<cost>$<22 char salt><31 char key>`. The SHA-256 variant pre-hashes
//! the password with HMAC-SHA-256 so passwords longer than 72 bytes are not
//! truncated.

mod digest;
mod hasher;

pub use digest::BcryptDigest;
pub use hasher::BcryptHasher;

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{Digest, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::base64::{BCRYPT, Engine, STD};
use crate::encoding::{decode_parameters, positional_u32, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "bcrypt";

/// Identifier written for the standard variant.
pub const ALG_IDENTIFIER: &str = "2b";
pub const ALG_IDENTIFIER_SHA256: &str = "bcrypt-sha256";

/// Legacy version identifiers still accepted on decode.
pub const ALG_IDENTIFIERS_LEGACY: [&str; 3] = ["2a", "2x", "2y"];

pub const COST_MIN: u32 = 10;
pub const COST_MAX: u32 = 31;
pub const COST_DEFAULT: u32 = 13;

/// Longest password the standard variant accepts.
pub const PASSWORD_INPUT_SIZE_MAX: usize = 72;

/// bcrypt salts are always 16 bytes.
pub const SALT_LENGTH: usize = 16;

pub(crate) const SALT_ENCODED_LENGTH: usize = 22;
pub(crate) const KEY_ENCODED_LENGTH: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Standard,
    Sha256,
}

impl Variant {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "2" | "2a" | "2b" | "2x" | "2y" | "standard" | "common" => Some(Self::Standard),
            ALG_IDENTIFIER_SHA256 | "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Standard => ALG_IDENTIFIER,
            Self::Sha256 => ALG_IDENTIFIER_SHA256,
        }
    }

    /// Maximum password length in bytes, if the variant has one.
    pub fn password_max_length(self) -> Option<usize> {
        match self {
            Self::Standard => Some(PASSWORD_INPUT_SIZE_MAX),
            Self::Sha256 => None,
        }
    }

    /// The bytes fed to bcrypt for `password`.
    ///
    /// For [`Variant::Sha256`] this is the padded base64 of
    /// HMAC-SHA-256(key = encoded salt, message = password).
    pub fn encode_input(self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Standard => Ok(Zeroizing::new(password.to_vec())),
            Self::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(BCRYPT.encode(salt).as_bytes())
                    .map_err(|e| Error::KeyDerivationFailed(format!("hmac key rejected: {e}")))?;
                mac.update(password);
                let tag = mac.finalize().into_bytes();
                Ok(Zeroizing::new(STD.encode(tag).into_bytes()))
            }
        }
    }

    /// Derives the 31 character encoded bcrypt key.
    pub fn key(self, password: &[u8], salt: &[u8], cost: u32) -> Result<String> {
        let salt: [u8; SALT_LENGTH] = salt.try_into().map_err(|_| {
            Error::KeyDerivationFailed(format!(
                "salt must be {SALT_LENGTH} bytes but is {} bytes",
                salt.len()
            ))
        })?;

        let input = self.encode_input(password, &salt)?;

        let parts = ::bcrypt::hash_with_salt(input.as_slice(), cost, salt)
            .map_err(|e| Error::KeyDerivationFailed(e.to_string()))?;

        let encoded = parts.format_for_version(::bcrypt::Version::TwoB);

        encoded
            .get(encoded.len().saturating_sub(KEY_ENCODED_LENGTH)..)
            .map(str::to_string)
            .ok_or_else(|| Error::KeyDerivationFailed("bcrypt output is too short".to_string()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER, decode_boxed)?;
    decoder.register(ALG_IDENTIFIER_SHA256, decode_boxed)?;

    for identifier in ALG_IDENTIFIERS_LEGACY {
        decoder.register(identifier, decode_boxed)?;
    }

    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes a standard or SHA-256 bcrypt digest.
pub fn decode(encoded: &str) -> Result<BcryptDigest> {
    let parts = split(encoded, None);

    if parts.len() < 4 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    let variant =
        Variant::from_identifier(parts[1]).ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;

    let (cost, salt, key) = match variant {
        Variant::Standard => {
            if parts.len() != 4 {
                return Err(invalid_format(ALG_NAME, parts.len()));
            }

            let cost = positional_u32("cost", parts[2])?;
            let secret = parts[3];

            if secret.len() != SALT_ENCODED_LENGTH + KEY_ENCODED_LENGTH || !secret.is_ascii() {
                return Err(Error::InvalidFormat(format!(
                    "bcrypt secret must be {} characters but is {}",
                    SALT_ENCODED_LENGTH + KEY_ENCODED_LENGTH,
                    secret.len()
                )));
            }

            let (salt, key) = secret.split_at(SALT_ENCODED_LENGTH);
            (cost, salt, key)
        }
        Variant::Sha256 => {
            if parts.len() != 5 {
                return Err(invalid_format(ALG_NAME, parts.len()));
            }

            let mut cost = None;

            for param in decode_parameters(parts[2])? {
                match param.key {
                    "v" | "t" => {}
                    "r" => cost = Some(param.u32()?),
                    _ => return Err(Error::option_key(param.key, param.value)),
                }
            }

            (cost.unwrap_or(COST_DEFAULT), parts[3], parts[4])
        }
    };

    let salt = BCRYPT
        .decode(salt)
        .map_err(|e| Error::InvalidSaltEncoding(e.to_string()))?;

    if salt.len() != SALT_LENGTH {
        return Err(Error::InvalidSaltEncoding(format!(
            "salt must decode to {SALT_LENGTH} bytes but decodes to {}",
            salt.len()
        )));
    }

    ensure_decoded_key(key.as_bytes())?;

    Ok(BcryptDigest::new(variant, cost, salt, key.to_string()))
}
