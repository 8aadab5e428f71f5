use std::fmt;

use super::{ALG_IDENTIFIER, ALG_NAME, key};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::strip_newlines;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sha1CryptDigest {
    iterations: u32,
    salt: String,
    key: String,
}

impl Sha1CryptDigest {
    pub fn new(iterations: u32, salt: String, key: String) -> Self {
        Self {
            iterations,
            salt,
            key,
        }
    }

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

impl Digest for Sha1CryptDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        strip_newlines(format!(
            "${ALG_IDENTIFIER}${}${}${}",
            self.iterations, self.salt, self.key
        ))
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, self.key.as_bytes())?;

        let derived = key(password, &self.salt, self.iterations)?;

        Ok(keys_match(self.key.as_bytes(), derived.as_bytes()))
    }
}

impl fmt::Display for Sha1CryptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
