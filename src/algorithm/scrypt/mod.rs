//! scrypt in the Passlib format and yescrypt in the crypt(3) `$y$` format.
//!
//! Both share one digest type; yescrypt only differs in how its settings,
//! salt and key are written.

mod digest;
mod hasher;
pub mod yescrypt;

pub use digest::ScryptDigest;
pub use hasher::ScryptHasher;

use std::fmt;

use ::scrypt::Params;
use zeroize::Zeroizing;

use super::{Digest, ensure_decoded_key, invalid_format, invalid_identifier};
use crate::decoder::Decoder;
use crate::encoding::base64::{Engine, STD_RAW};
use crate::encoding::{decode_parameters, split};
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "scrypt";

pub const ALG_IDENTIFIER: &str = "scrypt";
pub const ALG_IDENTIFIER_YESCRYPT: &str = "y";

pub const KEY_LENGTH_MIN: u64 = 1;
pub const KEY_LENGTH_MAX: u64 = i32::MAX as u64;

pub const SALT_LENGTH_MIN: usize = 8;
pub const SALT_LENGTH_MAX: usize = 1024;

/// Bounds on `ln`, the log2 of the cost parameter N.
pub const ITERATIONS_MIN: u32 = 1;
pub const ITERATIONS_MAX: u32 = 58;
pub const ITERATIONS_DEFAULT: u32 = 16;

pub const BLOCK_SIZE_MIN: u64 = 1;
pub const BLOCK_SIZE_MAX: u64 = INT_MAX / 256;
pub const BLOCK_SIZE_DEFAULT: u32 = 8;

pub const PARALLELISM_MIN: u64 = 1;
pub const PARALLELISM_MAX: u64 = 1_073_741_823;
pub const PARALLELISM_DEFAULT: u32 = 1;

const INT_MAX: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Scrypt,
    Yescrypt,
}

impl Variant {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ALG_IDENTIFIER => Some(Self::Scrypt),
            ALG_IDENTIFIER_YESCRYPT | "yescrypt" => Some(Self::Yescrypt),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Scrypt => ALG_IDENTIFIER,
            Self::Yescrypt => ALG_IDENTIFIER_YESCRYPT,
        }
    }

    /// Derives a `len` byte key with classic scrypt.
    pub fn key(
        self,
        password: &[u8],
        salt: &[u8],
        ln: u32,
        r: u32,
        p: u32,
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let log_n = u8::try_from(ln)
            .map_err(|_| Error::KeyDerivationFailed(format!("ln of {ln} is too large")))?;

        let params = Params::new(log_n, r, p, Params::RECOMMENDED_LEN)
            .map_err(|e| Error::KeyDerivationFailed(format!("invalid scrypt parameters: {e}")))?;

        let mut key = Zeroizing::new(vec![0u8; len]);
        ::scrypt::scrypt(password, salt, &params, &mut key)
            .map_err(|e| Error::KeyDerivationFailed(format!("scrypt key derivation failed: {e}")))?;

        Ok(key)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER, decode_boxed)?;
    decoder.register(ALG_IDENTIFIER_YESCRYPT, decode_boxed)?;
    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes either an scrypt or a yescrypt digest.
pub fn decode(encoded: &str) -> Result<ScryptDigest> {
    let parts = split(encoded, None);

    if parts.len() != 5 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    match Variant::from_identifier(parts[1]) {
        Some(Variant::Scrypt) => decode_scrypt(&parts),
        Some(Variant::Yescrypt) => yescrypt::decode_parts(&parts),
        None => Err(invalid_identifier(parts[1], ALG_NAME)),
    }
}

fn decode_scrypt(parts: &[&str]) -> Result<ScryptDigest> {
    let (mut ln, mut r, mut p) = (None, None, None);

    for param in decode_parameters(parts[2])? {
        match param.key {
            "ln" => ln = Some(param.u32()?),
            "r" => r = Some(param.u32()?),
            "p" => p = Some(param.u32()?),
            _ => return Err(Error::option_key(param.key, param.value)),
        }
    }

    let salt = STD_RAW
        .decode(parts[3])
        .map_err(|e| Error::InvalidSaltEncoding(e.to_string()))?;

    let key = STD_RAW
        .decode(parts[4])
        .map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?;

    ensure_decoded_key(&key)?;

    ScryptDigest::new(
        Variant::Scrypt,
        ln.unwrap_or(ITERATIONS_DEFAULT),
        r.unwrap_or(BLOCK_SIZE_DEFAULT),
        p.unwrap_or(PARALLELISM_DEFAULT),
        salt,
        key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LN4: &str =
        "$scrypt$ln=4,r=8,p=1$ySYknWRq9On6wWfpsOUQQg$C28LpWaXQ3P0/dcbN0njxJx4VL/UCQIAWlnYAJgT/mY";

    #[test]
    fn decodes_and_round_trips() {
        let digest = decode(LN4).unwrap();
        assert_eq!(digest.variant(), Variant::Scrypt);
        assert_eq!((digest.ln(), digest.r(), digest.p()), (4, 8, 1));
        assert_eq!(digest.encode(), LN4);
    }

    #[test]
    fn passlib_vector_matches() {
        let digest = decode(
            "$scrypt$ln=15,r=8,p=1$m7M2BqBUytk75zznfK91jg$F11VwAGrQanCaexGVmBafSbTs1X2l165eyb+m8uN/mg",
        )
        .unwrap();
        assert!(digest.matches("apple123"));
        assert!(!digest.matches("another"));
    }

    #[test]
    fn absent_options_use_defaults() {
        let digest = decode("$scrypt$r=4$c29tZXNhbHQ$a2V5").unwrap();
        assert_eq!((digest.ln(), digest.r(), digest.p()), (16, 4, 1));
        assert_eq!(digest.encode(), "$scrypt$ln=16,r=4,p=1$c29tZXNhbHQ$a2V5");
    }

    #[test]
    fn unknown_option_key() {
        match decode("$scrypt$ln=4,n=8,p=1$c29tZXNhbHQ$a2V5") {
            Err(Error::InvalidOptionKey { key, value }) => {
                assert_eq!(key, "n");
                assert_eq!(value, "8");
            }
            other => panic!("expected InvalidOptionKey, got: {other:?}"),
        }
    }

    #[test]
    fn option_without_value_separator() {
        assert!(matches!(
            decode("$scrypt$ln4$c29tZXNhbHQ$a2V5"),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn empty_key() {
        assert!(matches!(
            decode("$scrypt$ln=4,r=8,p=1$c29tZXNhbHQ$"),
            Err(Error::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn unknown_identifier() {
        assert!(matches!(
            decode("$scryptx$ln=4,r=8,p=1$c29tZXNhbHQ$a2V5"),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
