use std::fmt;

use super::{ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::strip_newlines;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaCryptDigest {
    variant: Variant,
    rounds: Option<u32>,
    salt: String,
    key: String,
}

impl ShaCryptDigest {
    pub fn new(variant: Variant, rounds: Option<u32>, salt: String, key: String) -> Self {
        Self {
            variant,
            rounds,
            salt,
            key,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Rounds as written; `None` when the field was omitted.
    pub fn rounds(&self) -> Option<u32> {
        self.rounds
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Digest for ShaCryptDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        let prefix = self.variant.prefix();

        let encoded = match self.rounds {
            Some(rounds) => format!("${prefix}$rounds={rounds}${}${}", self.salt, self.key),
            None => format!("${prefix}${}${}", self.salt, self.key),
        };

        strip_newlines(encoded)
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, self.key.as_bytes())?;

        let derived = self.variant.key(password, &self.salt, self.rounds)?;

        Ok(keys_match(self.key.as_bytes(), derived.as_bytes()))
    }
}

impl fmt::Display for ShaCryptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
