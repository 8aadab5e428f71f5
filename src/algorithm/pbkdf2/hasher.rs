use tracing::warn;

use super::{
    ALG_NAME, ITERATIONS_MAX, ITERATIONS_MIN, KEY_LENGTH_MAX, Pbkdf2Digest, SALT_LENGTH_MAX,
    SALT_LENGTH_MIN, Variant,
};
use crate::algorithm::{Digest, Hasher, SALT_LENGTH_DEFAULT, salt_length};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pbkdf2Hasher {
    variant: Option<Variant>,
    iterations: Option<u32>,
    key_length: Option<usize>,
    salt_length: Option<usize>,
    unsafe_params: bool,
    defaulted: bool,
}

impl Pbkdf2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Key length in bytes. Defaults to the HMAC output size.
    pub fn with_key_length(mut self, len: usize) -> Self {
        self.key_length = Some(len);
        self
    }

    pub fn with_salt_length(mut self, len: usize) -> Self {
        self.salt_length = Some(len);
        self
    }

    /// Skips parameter validation. Only meant for reproducing legacy digests.
    pub fn with_unsafe(mut self, enabled: bool) -> Self {
        self.unsafe_params = enabled;
        self
    }

    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    pub fn key_length(&self) -> Option<usize> {
        self.key_length
    }

    pub fn salt_length(&self) -> Option<usize> {
        self.salt_length
    }

    fn apply_defaults(&mut self) {
        if self.defaulted {
            return;
        }
        self.defaulted = true;

        let variant = *self.variant.get_or_insert_with(Variant::default);
        self.iterations.get_or_insert(variant.default_iterations());
        self.key_length.get_or_insert(variant.hash_size());
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<Pbkdf2Digest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();
        let iterations = self.iterations.unwrap_or_else(|| variant.default_iterations());
        let len = self.key_length.unwrap_or_else(|| variant.hash_size());

        if !self.unsafe_params {
            salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        }

        let key = variant.key(password.as_bytes(), salt, iterations, len)?;

        Ok(Pbkdf2Digest::new(variant, iterations, salt.to_vec(), key.to_vec()))
    }
}

impl Hasher for Pbkdf2Hasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        if self.unsafe_params {
            warn!(algorithm = ALG_NAME, "parameter validation is disabled");
            return Ok(());
        }

        let variant = self.variant.unwrap_or_default();

        let key = self.key_length.unwrap_or_else(|| variant.hash_size()) as u64;
        let key_min = variant.hash_size() as u64;
        if key < key_min || key > KEY_LENGTH_MAX {
            return Err(Error::parameter("key size", key_min, KEY_LENGTH_MAX, key));
        }

        let salt = self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT);
        if !(SALT_LENGTH_MIN..=SALT_LENGTH_MAX).contains(&salt) {
            return Err(Error::parameter(
                "salt size",
                SALT_LENGTH_MIN as u64,
                SALT_LENGTH_MAX as u64,
                salt as u64,
            ));
        }

        let iterations = self.iterations.unwrap_or_else(|| variant.default_iterations());
        if !(ITERATIONS_MIN..=ITERATIONS_MAX).contains(&iterations) {
            return Err(Error::parameter(
                "iterations",
                ITERATIONS_MIN.into(),
                ITERATIONS_MAX.into(),
                iterations.into(),
            ));
        }

        Ok(())
    }

    fn hash(&mut self, password: &str) -> Result<Box<dyn Digest>> {
        self.validate()?;
        let salt = random::bytes(self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT))?;
        Ok(Box::new(self.derive(password, &salt)?))
    }

    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>> {
        Ok(Box::new(self.derive(password, salt)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::pbkdf2::decode;
    use crate::encoding::base64::{ADAPTED_RAW, Engine};

    #[test]
    fn defaults_follow_variant() {
        let hasher = Pbkdf2Hasher::new().with_variant(Variant::Sha512).build().unwrap();
        assert_eq!(hasher.iterations(), Some(120_000));
        assert_eq!(hasher.key_length(), Some(64));
        assert_eq!(hasher.salt_length(), Some(16));

        let hasher = Pbkdf2Hasher::new().build().unwrap();
        assert_eq!(hasher.variant(), Some(Variant::Sha256));
        assert_eq!(hasher.iterations(), Some(310_000));
    }

    #[test]
    fn key_shorter_than_hash_is_rejected() {
        match Pbkdf2Hasher::new().with_key_length(16).build() {
            Err(Error::InvalidParameter { name, min, .. }) => {
                assert_eq!(name, "key size");
                assert_eq!(min, 32);
            }
            other => panic!("expected InvalidParameter, got: {other:?}"),
        }
    }

    #[test]
    fn low_iterations_need_unsafe() {
        assert!(matches!(
            Pbkdf2Hasher::new().with_iterations(1000).build(),
            Err(Error::InvalidParameter { name: "iterations", .. })
        ));
        assert!(Pbkdf2Hasher::new().with_iterations(1000).with_unsafe(true).build().is_ok());
    }

    #[test]
    fn short_salt_is_rejected() {
        assert!(matches!(
            Pbkdf2Hasher::new().hash_with_salt("pw", b"short"),
            Err(Error::SaltInvalid(_))
        ));
    }

    #[test]
    fn reproduces_passlib_digest() {
        let salt = ADAPTED_RAW.decode("/N.bsxZibA3B2NubM6b0Xg").unwrap();
        let mut hasher = Pbkdf2Hasher::new().with_iterations(29000).with_unsafe(true);
        let digest = hasher.hash_with_salt("apple123", &salt).unwrap();
        assert_eq!(
            digest.encode(),
            "$pbkdf2-sha256$29000$/N.bsxZibA3B2NubM6b0Xg$pboBgU5tpMWi2YealJZFFzAviGWgHLp1BFXCCibQO6I"
        );
    }

    #[test]
    fn hash_round_trips() {
        let mut hasher = Pbkdf2Hasher::new()
            .with_variant(Variant::Sha1)
            .with_iterations(ITERATIONS_MIN);
        let digest = hasher.hash("hunter2").unwrap();
        let encoded = digest.encode();
        assert!(encoded.starts_with("$pbkdf2$100000$"));
        assert!(decode(&encoded).unwrap().matches("hunter2"));
    }
}
