use super::{LdapDigest, SALT_LENGTH_DEFAULT, SALT_LENGTH_MAX, SALT_LENGTH_MIN, Variant};
use crate::algorithm::{Digest, Hasher, salt_length};
use crate::error::{Error, Result};
use crate::random;

/// Produces `{SCHEME}` digests. Unsalted schemes take no salt at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdapHasher {
    variant: Option<Variant>,
    salt_length: Option<usize>,
    defaulted: bool,
}

impl LdapHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Salt length for salted schemes.
    pub fn with_salt_length(mut self, len: usize) -> Self {
        self.salt_length = Some(len);
        self
    }

    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn salt_length(&self) -> Option<usize> {
        self.salt_length
    }

    fn apply_defaults(&mut self) {
        if self.defaulted {
            return;
        }
        self.defaulted = true;

        self.variant.get_or_insert_with(Variant::default);
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<LdapDigest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();

        if variant.is_salted() {
            salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        } else if !salt.is_empty() {
            return Err(Error::SaltInvalid(format!("{variant} does not take a salt")));
        }

        let key = variant.key(password.as_bytes(), salt);

        Ok(LdapDigest::new(variant, salt.to_vec(), key))
    }
}

impl Hasher for LdapHasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        let s = self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT);
        if !(SALT_LENGTH_MIN..=SALT_LENGTH_MAX).contains(&s) {
            return Err(Error::parameter(
                "salt size",
                SALT_LENGTH_MIN as u64,
                SALT_LENGTH_MAX as u64,
                s as u64,
            ));
        }

        Ok(())
    }

    fn hash(&mut self, password: &str) -> Result<Box<dyn Digest>> {
        self.validate()?;

        let salt = if self.variant.unwrap_or_default().is_salted() {
            random::bytes(self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT))?
        } else {
            Vec::new()
        };

        Ok(Box::new(self.derive(password, &salt)?))
    }

    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>> {
        Ok(Box::new(self.derive(password, salt)?))
    }
}
