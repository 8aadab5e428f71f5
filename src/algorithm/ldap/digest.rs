use std::fmt;

use super::{ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::base64::{Engine, STD};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapDigest {
    variant: Variant,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl LdapDigest {
    pub fn new(variant: Variant, salt: Vec<u8>, key: Vec<u8>) -> Self {
        Self { variant, salt, key }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Empty for unsalted schemes.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Digest for LdapDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(self.key.len() + self.salt.len());
        raw.extend_from_slice(&self.key);
        raw.extend_from_slice(&self.salt);

        format!("{}{}", self.variant.scheme(), STD.encode(raw))
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, &self.key)?;

        let derived = self.variant.key(password, &self.salt);

        Ok(keys_match(&self.key, &derived))
    }
}

impl fmt::Display for LdapDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
