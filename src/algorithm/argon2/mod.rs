//! Argon2 (RFC 9106) digests in the PHC string format.
//!
//! `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<key>` with standard base64 without
//! padding for the salt and key.
//!
//! Salts shorter than [`SALT_LENGTH_MIN`] bytes decode, but the argon2
//! implementation refuses them, so matching such a digest always fails with
//! [`Error::KeyDerivationFailed`].

mod digest;
mod hasher;
mod profile;

pub use digest::Argon2Digest;
pub use hasher::Argon2Hasher;
pub use profile::Profile;

use std::fmt;

use ::argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::{Digest, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::base64::{Engine, STD_RAW};
use crate::encoding::{decode_parameters, split};
use crate::error::{Error, Result};

/// Family name.
pub const ALG_NAME: &str = "argon2";

/// The only supported Argon2 version (0x13).
pub const VERSION: u8 = 0x13;

pub const KEY_LENGTH_MIN: usize = 4;
pub const KEY_LENGTH_MAX: usize = i32::MAX as usize;
pub const KEY_LENGTH_DEFAULT: usize = 32;

/// Shortest salt the argon2 implementation accepts.
pub const SALT_LENGTH_MIN: usize = 8;
pub const SALT_LENGTH_MAX: usize = i32::MAX as usize;

pub const ITERATIONS_MIN: u32 = 1;
pub const ITERATIONS_MAX: u32 = i32::MAX as u32;

pub const PARALLELISM_MIN: u32 = 1;
pub const PARALLELISM_MAX: u32 = 16_777_215;

/// Minimum memory is this multiple of the parallelism.
pub const MEMORY_MIN_PARALLELISM_MULTIPLIER: u32 = 8;
/// Memory is rounded down to a multiple of this times the parallelism.
pub const MEMORY_ROUNDING_PARALLELISM_MULTIPLIER: u32 = 4;
pub const MEMORY_MAX: u32 = i32::MAX as u32;

// defaults filled in for options absent or zero in an encoded digest
const DECODE_ITERATIONS_DEFAULT: u32 = 1;
const DECODE_PARALLELISM_DEFAULT: u32 = 4;
const DECODE_MEMORY_DEFAULT: u32 = 32 * 1024;

/// Argon2 flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    /// Data independent memory access.
    I,
    /// Data dependent memory access.
    D,
    /// Hybrid of `I` and `D`.
    #[default]
    ID,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::I, Variant::D, Variant::ID];

    /// Resolves an encoded identifier or a short variant name.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "argon2i" | "i" => Some(Self::I),
            "argon2d" | "d" => Some(Self::D),
            "argon2id" | "id" => Some(Self::ID),
            _ => None,
        }
    }

    /// Identifier used in the encoded form.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::I => "argon2i",
            Self::D => "argon2d",
            Self::ID => "argon2id",
        }
    }

    fn algorithm(self) -> Algorithm {
        match self {
            Self::I => Algorithm::Argon2i,
            Self::D => Algorithm::Argon2d,
            Self::ID => Algorithm::Argon2id,
        }
    }

    /// Derives a `len` byte key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyDerivationFailed`] when the parameters are rejected
    /// by the argon2 implementation.
    pub fn key(
        self,
        password: &[u8],
        salt: &[u8],
        t: u32,
        m: u32,
        p: u32,
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let params = Params::new(m, t, p, Some(len))
            .map_err(|e| Error::KeyDerivationFailed(format!("invalid argon2 parameters: {e}")))?;

        let argon2 = Argon2::new(self.algorithm(), Version::V0x13, params);

        let mut key = Zeroizing::new(vec![0u8; len]);
        argon2
            .hash_password_into(password, salt, &mut key)
            .map_err(|e| Error::KeyDerivationFailed(format!("argon2 key derivation failed: {e}")))?;

        Ok(key)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Registers the decoder for every argon2 variant.
pub fn register(decoder: &mut Decoder) -> Result<()> {
    for variant in Variant::ALL {
        decoder.register(variant.prefix(), decode_boxed)?;
    }
    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes an encoded argon2 digest.
///
/// # Errors
///
/// Fails on a wrong field count, an unknown identifier or option, a version
/// other than 19, or salt/key fields that are not valid base64.
pub fn decode(encoded: &str) -> Result<Argon2Digest> {
    let parts = split(encoded, None);

    if parts.len() != 6 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    let variant =
        Variant::from_identifier(parts[1]).ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;

    let options = format!("{},{}", parts[3], parts[2]);

    let mut version = None;
    let (mut m, mut t, mut p) = (None, None, None);

    for param in decode_parameters(&options)? {
        let bits = if param.key == "v" { 8 } else { 32 };
        let value = param.uint(bits)?;

        match param.key {
            "v" => {
                if value != u64::from(VERSION) {
                    return Err(Error::InvalidVersion(format!(
                        "version {VERSION} is supported but encoded digest is version {value}"
                    )));
                }
                version = Some(VERSION);
            }
            "k" => {}
            "m" => m = Some(value as u32),
            "t" => t = Some(value as u32),
            "p" => p = Some(value as u32),
            _ => return Err(Error::option_key(param.key, param.value)),
        }
    }

    if version.is_none() {
        return Err(Error::InvalidVersion(format!(
            "version {VERSION} is required but the encoded digest has no version"
        )));
    }

    let salt = STD_RAW
        .decode(parts[4])
        .map_err(|e| Error::InvalidSaltEncoding(e.to_string()))?;

    let key = STD_RAW
        .decode(parts[5])
        .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;

    ensure_decoded_key(&key)?;

    let or_default = |value: Option<u32>, default: u32| value.filter(|v| *v != 0).unwrap_or(default);

    Ok(Argon2Digest::new(
        variant,
        or_default(t, DECODE_ITERATIONS_DEFAULT),
        or_default(m, DECODE_MEMORY_DEFAULT),
        or_default(p, DECODE_PARALLELISM_DEFAULT),
        salt,
        key,
    ))
}

/// Rounds `m` down to the nearest multiple of `4 * p`.
pub fn round_memory(m: u32, p: u32) -> u32 {
    let multiple = p.saturating_mul(MEMORY_ROUNDING_PARALLELISM_MULTIPLIER);
    if multiple == 0 {
        return m;
    }
    (m / multiple) * multiple
}
