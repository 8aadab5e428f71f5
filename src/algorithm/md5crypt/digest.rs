use std::fmt;

use super::{ALG_IDENTIFIER, ALG_IDENTIFIER_SUN, ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::strip_newlines;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Md5CryptDigest {
    variant: Variant,
    iterations: u32,
    salt: String,
    key: String,
}

impl Md5CryptDigest {
    pub fn new(variant: Variant, iterations: u32, salt: String, key: String) -> Self {
        Self {
            variant,
            iterations,
            salt,
            key,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Extra Sun rounds; zero when omitted.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Digest for Md5CryptDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        let encoded = match self.variant {
            Variant::Sun if self.iterations > 0 => format!(
                "${ALG_IDENTIFIER_SUN},iterations={}${}$${}",
                self.iterations, self.salt, self.key
            ),
            Variant::Sun => format!("${ALG_IDENTIFIER_SUN}${}$${}", self.salt, self.key),
            Variant::Standard => format!("${ALG_IDENTIFIER}${}${}", self.salt, self.key),
        };

        strip_newlines(encoded)
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, self.key.as_bytes())?;

        let derived = self.variant.key(password, &self.salt, self.iterations)?;

        Ok(keys_match(self.key.as_bytes(), derived.as_bytes()))
    }
}

impl fmt::Display for Md5CryptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
