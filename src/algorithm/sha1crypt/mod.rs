//! NetBSD's HMAC-SHA1 crypt, `$sha1$<iterations>$<salt>$<key>`.

mod digest;
mod hasher;

pub use digest::Sha1CryptDigest;
pub use hasher::Sha1CryptHasher;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::{Digest, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::crypt64::ITOA64;
use crate::encoding::{positional_u32, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "sha1crypt";

pub const ALG_IDENTIFIER: &str = "sha1";

pub const SALT_LENGTH_MIN: usize = 0;
pub const SALT_LENGTH_MAX: usize = 64;
pub const SALT_LENGTH_DEFAULT: usize = 8;

pub const ITERATIONS_MIN: u32 = 0;
pub const ITERATIONS_MAX: u32 = u32::MAX;
pub const ITERATIONS_DEFAULT: u32 = 480_000;

// 20 byte HMAC-SHA1 output, 28 characters
const CHECKSUM_GROUPS: usize = 7;

/// Derives the crypt text key.
///
/// The first HMAC round covers the salt and the `$sha1$<iterations>` magic,
/// every further round rehashes the previous output. Zero iterations run the
/// first round only.
pub fn key(password: &[u8], salt: &str, iterations: u32) -> Result<String> {
    let mac = Hmac::<Sha1>::new_from_slice(password)
        .map_err(|e| Error::KeyDerivationFailed(format!("hmac key rejected: {e}")))?;

    let mut round = mac.clone();
    round.update(salt.as_bytes());
    round.update(format!("${ALG_IDENTIFIER}${iterations}").as_bytes());
    let mut checksum = round.finalize().into_bytes();

    for _ in 1..iterations {
        let mut round = mac.clone();
        round.update(&checksum);
        checksum = round.finalize().into_bytes();
    }

    Ok(encode_checksum(&checksum))
}

// Big endian groups of three bytes, least significant six bits first. The
// last group wraps around to the first byte.
fn encode_checksum(checksum: &[u8]) -> String {
    let mut encoded = String::with_capacity(CHECKSUM_GROUPS * 4);

    for group in 0..CHECKSUM_GROUPS {
        let mut value = 0u32;
        for i in group * 3..group * 3 + 3 {
            value = (value << 8) | u32::from(checksum[i % checksum.len()]);
        }

        for _ in 0..4 {
            encoded.push(char::from(ITOA64[(value & 0x3f) as usize]));
            value >>= 6;
        }
    }

    encoded
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER, decode_boxed)
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes a digest; an empty iterations field reads as zero.
pub fn decode(encoded: &str) -> Result<Sha1CryptDigest> {
    let parts = split(encoded, None);

    if parts.len() != 5 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    if parts[1] != ALG_IDENTIFIER {
        return Err(invalid_identifier(parts[1], ALG_NAME));
    }

    let iterations = match parts[2] {
        "" => 0,
        value => positional_u32("rounds", value)?,
    };

    ensure_decoded_key(parts[4].as_bytes())?;

    Ok(Sha1CryptDigest::new(
        iterations,
        parts[3].to_string(),
        parts[4].to_string(),
    ))
}
