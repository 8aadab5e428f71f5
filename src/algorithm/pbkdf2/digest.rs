use std::fmt;

use super::{ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::base64::{ADAPTED_RAW, Engine};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Digest {
    variant: Variant,
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl Pbkdf2Digest {
    pub fn new(variant: Variant, iterations: u32, salt: Vec<u8>, key: Vec<u8>) -> Self {
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

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Digest for Pbkdf2Digest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        format!(
            "${}${}${}${}",
            self.variant.prefix(),
            self.iterations,
            ADAPTED_RAW.encode(&self.salt),
            ADAPTED_RAW.encode(&self.key),
        )
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, &self.key)?;

        let derived = self
            .variant
            .key(password, &self.salt, self.iterations, self.key.len())?;

        Ok(keys_match(&self.key, &derived))
    }
}

impl fmt::Display for Pbkdf2Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
