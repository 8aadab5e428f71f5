use super::{ITERATIONS_DEFAULT, SALT_LENGTH_DEFAULT, SALT_LENGTH_MAX, SALT_LENGTH_MIN, Sha1CryptDigest, key};
use crate::algorithm::{Digest, Hasher, salt_length};
use crate::encoding::{CRYPT_SALT_CHARSET, crypt_salt};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sha1CryptHasher {
    iterations: Option<u32>,
    salt_length: Option<usize>,
    defaulted: bool,
}

impl Sha1CryptHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_salt_length(mut self, len: usize) -> Self {
        self.salt_length = Some(len);
        self
    }

    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    pub fn salt_length(&self) -> Option<usize> {
        self.salt_length
    }

    fn apply_defaults(&mut self) {
        if self.defaulted {
            return;
        }
        self.defaulted = true;

        self.iterations.get_or_insert(ITERATIONS_DEFAULT);
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<Sha1CryptDigest> {
        self.validate()?;

        let iterations = self.iterations.unwrap_or(ITERATIONS_DEFAULT);

        salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        let salt = crypt_salt(salt)?;

        let key = key(password.as_bytes(), salt, iterations)?;

        Ok(Sha1CryptDigest::new(iterations, salt.to_string(), key))
    }
}

impl Hasher for Sha1CryptHasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        let s = self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT);
        if s > SALT_LENGTH_MAX {
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
        let salt = random::charset_bytes(
            self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT),
            CRYPT_SALT_CHARSET,
        )?;
        Ok(Box::new(self.derive(password, &salt)?))
    }

    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>> {
        Ok(Box::new(self.derive(password, salt)?))
    }
}
