use std::fmt;

use super::{ALG_IDENTIFIER, ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::base64::{BCRYPT, Engine};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcryptDigest {
    variant: Variant,
    cost: u32,
    salt: Vec<u8>,
    /// The 31 character bcrypt-base64 key text.
    key: String,
}

impl BcryptDigest {
    pub fn new(variant: Variant, cost: u32, salt: Vec<u8>, key: String) -> Self {
        Self {
            variant,
            cost,
            salt,
            key,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Digest for BcryptDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        let salt = BCRYPT.encode(&self.salt);

        match self.variant {
            Variant::Standard => format!("${ALG_IDENTIFIER}${:02}${salt}{}", self.cost, self.key),
            Variant::Sha256 => format!(
                "${}$v=2,t={ALG_IDENTIFIER},r={}${salt}${}",
                self.variant.prefix(),
                self.cost,
                self.key
            ),
        }
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, self.key.as_bytes())?;

        let derived = self.variant.key(password, &self.salt, self.cost)?;

        Ok(keys_match(self.key.as_bytes(), derived.as_bytes()))
    }
}

impl fmt::Display for BcryptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
