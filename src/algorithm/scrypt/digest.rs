use std::fmt;

use super::yescrypt::{self, FLAVOR_SCRYPT, Setting};
use super::{ALG_NAME, Variant};
use crate::algorithm::{Digest, ensure_key, keys_match};
use crate::encoding::base64::{Engine, STD_RAW};
use crate::encoding::crypt64::encode64;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScryptDigest {
    variant: Variant,
    flavor: u32,
    ln: u32,
    r: u32,
    p: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
    /// Encoded yescrypt setting field, empty for scrypt.
    setting: String,
}

impl ScryptDigest {
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for a yescrypt digest whose parameters
    /// have no setting encoding, such as a zero `ln`, `r` or `p`.
    pub fn new(
        variant: Variant,
        ln: u32,
        r: u32,
        p: u32,
        salt: Vec<u8>,
        key: Vec<u8>,
    ) -> Result<Self> {
        let digest = Self {
            variant,
            flavor: FLAVOR_SCRYPT,
            ln,
            r,
            p,
            salt,
            key,
            setting: String::new(),
        };

        digest.with_flavor(FLAVOR_SCRYPT)
    }

    /// Sets the yescrypt flavor; ignored by the scrypt encoding.
    pub fn with_flavor(mut self, flavor: u32) -> Result<Self> {
        self.flavor = flavor;

        if self.variant == Variant::Yescrypt {
            self.setting = yescrypt::encode_setting(Setting {
                flavor,
                ln: self.ln,
                r: self.r,
                p: self.p,
            })
            .ok_or_else(|| {
                Error::InvalidOption(format!(
                    "yescrypt setting can't hold flavor={flavor}, ln={}, r={}, p={}",
                    self.ln, self.r, self.p
                ))
            })?;
        }

        Ok(self)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn flavor(&self) -> u32 {
        self.flavor
    }

    /// Log2 of N.
    pub fn ln(&self) -> u32 {
        self.ln
    }

    pub fn r(&self) -> u32 {
        self.r
    }

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

impl Digest for ScryptDigest {
    fn algorithm(&self) -> &'static str {
        ALG_NAME
    }

    fn encode(&self) -> String {
        match self.variant {
            Variant::Scrypt => format!(
                "${}$ln={},r={},p={}${}${}",
                self.variant.prefix(),
                self.ln,
                self.r,
                self.p,
                STD_RAW.encode(&self.salt),
                STD_RAW.encode(&self.key),
            ),
            Variant::Yescrypt => format!(
                "${}${}${}${}",
                self.variant.prefix(),
                self.setting,
                encode64(&self.salt),
                encode64(&self.key),
            ),
        }
    }

    fn matches_bytes_advanced(&self, password: &[u8]) -> Result<bool> {
        ensure_key(ALG_NAME, &self.key)?;

        if self.variant == Variant::Yescrypt && self.flavor != FLAVOR_SCRYPT {
            return Err(Error::KeyDerivationFailed(format!(
                "yescrypt flavor {} is not supported",
                self.flavor
            )));
        }

        let derived = self.variant.key(
            password,
            &self.salt,
            self.ln,
            self.r,
            self.p,
            self.key.len(),
        )?;

        Ok(keys_match(&self.key, &derived))
    }
}

impl fmt::Display for ScryptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
