//! PBKDF2-HMAC digests in the Passlib format.
//!
//! `$pbkdf2-sha256$<iterations>$<salt>$<key>` using the adapted base64
//! alphabet (`+` replaced by `.`) without padding. The SHA-1 variant is
//! written as plain `pbkdf2`.

mod digest;
mod hasher;

pub use digest::Pbkdf2Digest;
pub use hasher::Pbkdf2Hasher;

use std::fmt;

use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use super::{Digest, I32_MAX, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::base64::{ADAPTED_RAW, Engine};
use crate::encoding::{positional_u32, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "pbkdf2";

pub const ALG_IDENTIFIER: &str = "pbkdf2";
pub const ALG_IDENTIFIER_SHA1: &str = "pbkdf2-sha1";
pub const ALG_IDENTIFIER_SHA224: &str = "pbkdf2-sha224";
pub const ALG_IDENTIFIER_SHA256: &str = "pbkdf2-sha256";
pub const ALG_IDENTIFIER_SHA384: &str = "pbkdf2-sha384";
pub const ALG_IDENTIFIER_SHA512: &str = "pbkdf2-sha512";

pub const KEY_LENGTH_MAX: u64 = I32_MAX;

pub const SALT_LENGTH_MIN: usize = 8;
pub const SALT_LENGTH_MAX: usize = i32::MAX as usize;

pub const ITERATIONS_MIN: u32 = 100_000;
pub const ITERATIONS_MAX: u32 = i32::MAX as u32;

pub const ITERATIONS_DEFAULT_SHA1: u32 = 720_000;
pub const ITERATIONS_DEFAULT_SHA256: u32 = 310_000;
pub const ITERATIONS_DEFAULT_SHA512: u32 = 120_000;

/// HMAC hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Sha1,
        Variant::Sha224,
        Variant::Sha256,
        Variant::Sha384,
        Variant::Sha512,
    ];

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ALG_IDENTIFIER | ALG_IDENTIFIER_SHA1 | "sha1" => Some(Self::Sha1),
            ALG_IDENTIFIER_SHA224 | "sha224" => Some(Self::Sha224),
            ALG_IDENTIFIER_SHA256 | "sha256" => Some(Self::Sha256),
            ALG_IDENTIFIER_SHA384 | "sha384" => Some(Self::Sha384),
            ALG_IDENTIFIER_SHA512 | "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sha1 => ALG_IDENTIFIER,
            Self::Sha224 => ALG_IDENTIFIER_SHA224,
            Self::Sha256 => ALG_IDENTIFIER_SHA256,
            Self::Sha384 => ALG_IDENTIFIER_SHA384,
            Self::Sha512 => ALG_IDENTIFIER_SHA512,
        }
    }

    /// Output size of the underlying hash in bytes.
    pub fn hash_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub fn default_iterations(self) -> u32 {
        match self {
            Self::Sha1 | Self::Sha224 => ITERATIONS_DEFAULT_SHA1,
            Self::Sha256 | Self::Sha384 => ITERATIONS_DEFAULT_SHA256,
            Self::Sha512 => ITERATIONS_DEFAULT_SHA512,
        }
    }

    /// Derives a `len` byte key.
    pub fn key(self, password: &[u8], salt: &[u8], iterations: u32, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        if iterations == 0 {
            return Err(Error::KeyDerivationFailed(
                "pbkdf2 requires at least one iteration".to_string(),
            ));
        }

        let mut key = Zeroizing::new(vec![0u8; len]);

        match self {
            Self::Sha1 => ::pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut key),
            Self::Sha224 => ::pbkdf2::pbkdf2_hmac::<Sha224>(password, salt, iterations, &mut key),
            Self::Sha256 => ::pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key),
            Self::Sha384 => ::pbkdf2::pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut key),
            Self::Sha512 => ::pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut key),
        }

        Ok(key)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    for identifier in [
        ALG_IDENTIFIER,
        ALG_IDENTIFIER_SHA1,
        ALG_IDENTIFIER_SHA224,
        ALG_IDENTIFIER_SHA256,
        ALG_IDENTIFIER_SHA384,
        ALG_IDENTIFIER_SHA512,
    ] {
        decoder.register(identifier, decode_boxed)?;
    }

    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes `$<identifier>$<iterations>$<salt>$<key>`.
pub fn decode(encoded: &str) -> Result<Pbkdf2Digest> {
    let parts = split(encoded, None);

    if parts.len() != 5 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    let variant =
        Variant::from_identifier(parts[1]).ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;

    let iterations = positional_u32("iterations", parts[2])?;

    let salt = ADAPTED_RAW
        .decode(parts[3])
        .map_err(|e| Error::InvalidSaltEncoding(e.to_string()))?;

    let key = ADAPTED_RAW
        .decode(parts[4])
        .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;

    ensure_decoded_key(&key)?;

    Ok(Pbkdf2Digest::new(variant, iterations, salt, key))
}
