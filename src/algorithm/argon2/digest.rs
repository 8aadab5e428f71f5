use std::fmt;

use super::{ALG_NAME, VERSION, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::base64::{Engine, STD_RAW};
use crate::error::Result;

/// A decoded or freshly computed argon2 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2Digest {
    variant: Variant,
    t: u32,
    m: u32,
    p: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl Argon2Digest {
    pub fn new(variant: Variant, t: u32, m: u32, p: u32, salt: Vec<u8>, key: Vec<u8>) -> Self {
        Self {
            variant,
            t,
            m,
            p,
            salt,
            key,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Iterations.
    pub fn t(&self) -> u32 {
        self.t
    }

    /// Memory in KiB.
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Parallelism.
    pub fn p(&self) -> u32 {
        self.p
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Digest for Argon2Digest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        format!(
            "${}$v={VERSION}$m={},t={},p={}${}${}",
            self.variant.prefix(),
            self.m,
            self.t,
            self.p,
            STD_RAW.encode(&self.salt),
            STD_RAW.encode(&self.key),
        )
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, &self.key)?;

        let derived = self.variant.key(
            password,
            &self.salt,
            self.t,
            self.m,
            self.p,
            self.key.len(),
        )?;

        Ok(keys_match(&self.key, &derived))
    }
}

impl fmt::Display for Argon2Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn constructed_zero_memory_fails_at_match() {
        let digest = Argon2Digest::new(Variant::ID, 1, 0, 1, b"somesalt".to_vec(), b"key".to_vec());
        assert!(digest.encode().contains("m=0,t=1,p=1"));
        assert!(matches!(
            digest.matches_advanced("password"),
            Err(Error::KeyDerivationFailed(_))
        ));
        assert!(!digest.matches("password"));
    }

    #[test]
    fn empty_key_cannot_match() {
        let digest = Argon2Digest::new(Variant::ID, 1, 64, 1, b"somesalt".to_vec(), Vec::new());
        assert!(matches!(
            digest.matches_advanced("password"),
            Err(Error::PasswordInvalid(_))
        ));
    }

    #[test]
    fn display_is_encoded_form() {
        let digest = Argon2Digest::new(Variant::I, 2, 64, 1, b"somesalt".to_vec(), b"key".to_vec());
        assert_eq!(digest.to_string(), "$argon2i$v=19$m=64,t=2,p=1$c29tZXNhbHQ$a2V5");
    }
}
