//! md5crypt in both the common `$1$` form and Sun's `$md5$` form.
//!
//! Salts and keys are kept as the crypt text they are written with. Only the
//! Sun variant carries options (its extra rounds).

mod digest;
mod hasher;
mod sun;

pub use digest::Md5CryptDigest;
pub use hasher::Md5CryptHasher;

use std::fmt;

use super::{Digest, crypt_checksum, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::{decode_parameters, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "md5crypt";

pub const ALG_IDENTIFIER: &str = "1";
pub const ALG_IDENTIFIER_SUN: &str = "md5";

/// Legacy prefix of Sun digests that carry options in the identifier field.
pub const PREFIX_SUN_OPTIONS: &str = "$md5,";

pub const SALT_LENGTH_MIN: usize = 1;
pub const SALT_LENGTH_MAX: usize = 8;
pub const SALT_LENGTH_DEFAULT: usize = SALT_LENGTH_MAX;

pub const ITERATIONS_MIN: u32 = 0;
pub const ITERATIONS_MAX: u32 = u32::MAX;
pub const ITERATIONS_DEFAULT: u32 = 34_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Standard,
    Sun,
}

impl Variant {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ALG_IDENTIFIER | ALG_NAME | "standard" | "common" => Some(Self::Standard),
            ALG_IDENTIFIER_SUN | "sun" => Some(Self::Sun),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Standard => ALG_IDENTIFIER,
            Self::Sun => ALG_IDENTIFIER_SUN,
        }
    }

    /// Derives the crypt text key. `iterations` only applies to [`Variant::Sun`].
    pub fn key(self, password: &[u8], salt: &str, iterations: u32) -> Result<String> {
        match self {
            Self::Standard => {
                let setup = pwhash::HashSetup {
                    salt: Some(salt),
                    rounds: None,
                };

                #[allow(deprecated)]
                let encoded = pwhash::md5_crypt::hash_with(setup, password)
                    .map_err(|e| Error::KeyDerivationFailed(format!("md5crypt failed: {e}")))?;

                crypt_checksum(&encoded)
            }
            Self::Sun => Ok(sun::key(password, salt.as_bytes(), iterations)),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Sun => "sun",
        })
    }
}

/// Registers `$1$`, `$md5$` and the `$md5,` options prefix.
pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER, decode_boxed)?;
    decoder.register(ALG_IDENTIFIER_SUN, decode_boxed)?;
    decoder.register_prefix(PREFIX_SUN_OPTIONS, ALG_IDENTIFIER_SUN)?;
    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

pub fn decode(encoded: &str) -> Result<Md5CryptDigest> {
    let parts = split(encoded, None);

    let expected = if parts.get(1) == Some(&ALG_IDENTIFIER) { 4 } else { 5 };

    if parts.len() != expected {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    let (variant, options) = match parts[1].strip_prefix("md5,") {
        Some(options) => (Variant::Sun, options),
        None => {
            let variant = Variant::from_identifier(parts[1])
                .ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;
            (variant, "")
        }
    };

    let mut iterations = 0;

    if !options.is_empty() {
        for param in decode_parameters(options)? {
            match param.key {
                "rounds" | "iterations" => iterations = param.u32()?,
                _ => return Err(Error::option_key(param.key, param.value)),
            }
        }
    }

    let (salt, key) = match variant {
        Variant::Sun => (parts[2], parts[4]),
        Variant::Standard => (parts[2], parts[3]),
    };

    ensure_decoded_key(key.as_bytes())?;

    Ok(Md5CryptDigest::new(variant, iterations, salt.to_string(), key.to_string()))
}
