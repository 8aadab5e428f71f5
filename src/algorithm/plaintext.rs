//! Unhashed passwords: `$plaintext$<text>` and `$base64$<adapted base64>`.
//!
//! Only registered by [`Decoder::with_all`](crate::decoder::Decoder::with_all),
//! mostly for migrating stores that still hold clear text.

use std::fmt;

use zeroize::Zeroizing;

use super::{Digest, Hasher, ensure_key, invalid_format, invalid_identifier, keys_match};
use crate::decoder::Decoder;
use crate::encoding::base64::{ADAPTED_RAW, Engine};
use crate::encoding::split;
use crate::error::{Error, Result};

pub const ALG_NAME: &str = "plaintext";

pub const ALG_IDENTIFIER: &str = "plaintext";
pub const ALG_IDENTIFIER_BASE64: &str = "base64";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    PlainText,
    Base64,
}

impl Variant {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ALG_IDENTIFIER => Some(Self::PlainText),
            ALG_IDENTIFIER_BASE64 => Some(Self::Base64),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::PlainText => ALG_IDENTIFIER,
            Self::Base64 => ALG_IDENTIFIER_BASE64,
        }
    }

    fn decode_key(self, src: &str) -> Result<Vec<u8>> {
        match self {
            Self::PlainText => Ok(src.as_bytes().to_vec()),
            Self::Base64 => ADAPTED_RAW
                .decode(src)
                .map_err(|e| Error::InvalidKeyEncoding(e.to_string())),
        }
    }

    fn encode_key(self, key: &[u8]) -> String {
        match self {
            Self::PlainText => String::from_utf8_lossy(key).into_owned(),
            Self::Base64 => ADAPTED_RAW.encode(key),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct PlainTextDigest {
    variant: Variant,
    key: Zeroizing<Vec<u8>>,
}

impl PlainTextDigest {
    pub fn new(variant: Variant, password: &[u8]) -> Self {
        Self {
            variant,
            key: Zeroizing::new(password.to_vec()),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl fmt::Debug for PlainTextDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainTextDigest")
            .field("variant", &self.variant)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Digest for PlainTextDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        format!("${}${}", self.variant.prefix(), self.variant.encode_key(&self.key))
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, &self.key)?;
        Ok(keys_match(&self.key, password))
    }
}

impl fmt::Display for PlainTextDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Stores the password as is. Salts are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainTextHasher {
    variant: Variant,
}

impl PlainTextHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base64() -> Self {
        Self::new().with_variant(Variant::Base64)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl Hasher for PlainTextHasher {
    fn validate(&mut self) -> Result<()> {
        Ok(())
    }

    fn hash(&mut self, password: &str) -> Result<Box<dyn Digest>> {
        Ok(Box::new(PlainTextDigest::new(self.variant, password.as_bytes())))
    }

    fn hash_with_salt(&mut self, password: &str, _salt: &[u8]) -> Result<Box<dyn Digest>> {
        self.hash(password)
    }
}

pub fn register(decoder: &mut Decoder) -> Result<()> {
    decoder.register(ALG_IDENTIFIER, decode_boxed)?;
    decoder.register(ALG_IDENTIFIER_BASE64, decode_boxed)?;
    Ok(())
}

fn decode_boxed(encoded: &str) -> Result<Box<dyn Digest>> {
    Ok(Box::new(decode(encoded)?))
}

/// Decodes a plaintext digest; the text itself may contain `$`.
pub fn decode(encoded: &str) -> Result<PlainTextDigest> {
    let parts = split(encoded, Some(3));

    if parts.len() != 3 {
        return Err(invalid_format(ALG_NAME, parts.len()));
    }

    let variant =
        Variant::from_identifier(parts[1]).ok_or_else(|| invalid_identifier(parts[1], ALG_NAME))?;

    let key = Zeroizing::new(variant.decode_key(parts[2])?);

    if key.is_empty() {
        return Err(Error::InvalidKeyEncoding("key has 0 bytes".to_string()));
    }

    Ok(PlainTextDigest::new(variant, &key))
}
