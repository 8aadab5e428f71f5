use super::{
    ITERATIONS_MAX, ITERATIONS_MIN, SALT_LENGTH_DEFAULT, SALT_LENGTH_MAX, SALT_LENGTH_MIN,
    ShaCryptDigest, Variant,
};
use crate::algorithm::{Digest, Hasher, salt_length};
use crate::encoding::{CRYPT_SALT_CHARSET, crypt_salt};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaCryptHasher {
    variant: Option<Variant>,
    rounds: Option<u32>,
    salt_length: Option<usize>,
    defaulted: bool,
}

impl ShaCryptHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sha256() -> Self {
        Self::new().with_variant(Variant::Sha256)
    }

    pub fn sha512() -> Self {
        Self::new().with_variant(Variant::Sha512)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
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

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn rounds(&self) -> Option<u32> {
        self.rounds
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
        self.rounds.get_or_insert(variant.default_iterations());
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<ShaCryptDigest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();
        let rounds = self.rounds.unwrap_or_else(|| variant.default_iterations());

        salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        let salt = crypt_salt(salt)?;

        let key = variant.key(password.as_bytes(), salt, Some(rounds))?;

        Ok(ShaCryptDigest::new(variant, Some(rounds), salt.to_string(), key))
    }
}

impl Hasher for ShaCryptHasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        let variant = self.variant.unwrap_or_default();

        let rounds = self.rounds.unwrap_or_else(|| variant.default_iterations());
        if !(ITERATIONS_MIN..=ITERATIONS_MAX).contains(&rounds) {
            return Err(Error::parameter(
                "iterations",
                ITERATIONS_MIN.into(),
                ITERATIONS_MAX.into(),
                rounds.into(),
            ));
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::shacrypt::decode;

    #[test]
    fn defaults_follow_variant() {
        let hasher = ShaCryptHasher::new().build().unwrap();
        assert_eq!(hasher.variant(), Some(Variant::Sha512));
        assert_eq!(hasher.rounds(), Some(500_000));
        assert_eq!(hasher.salt_length(), Some(16));

        let hasher = ShaCryptHasher::sha256().build().unwrap();
        assert_eq!(hasher.rounds(), Some(1_000_000));
    }

    #[test]
    fn rounds_bounds() {
        assert!(matches!(
            ShaCryptHasher::new().with_rounds(999).build(),
            Err(Error::InvalidParameter { name: "iterations", .. })
        ));
        assert!(matches!(
            ShaCryptHasher::new().with_rounds(1_000_000_000).build(),
            Err(Error::InvalidParameter { name: "iterations", .. })
        ));
    }

    #[test]
    fn reproduces_pwhash_digest() {
        let digest = ShaCryptHasher::sha256()
            .with_rounds(11858)
            .hash_with_salt("test", b"WH1ABM5sKhxbkgCK")
            .unwrap();
        assert_eq!(
            digest.encode(),
            "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1"
        );
    }

    #[test]
    fn hash_round_trips() {
        let mut hasher = ShaCryptHasher::sha512().with_rounds(1000);
        let encoded = hasher.hash("hunter2").unwrap().encode();
        assert!(encoded.starts_with("$6$rounds=1000$"), "{encoded}");

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.salt().len(), 16);
        assert!(decoded.matches("hunter2"));
    }

    #[test]
    fn salt_checks() {
        let mut hasher = ShaCryptHasher::new().with_rounds(1000);
        assert!(matches!(
            hasher.hash_with_salt("pw", b""),
            Err(Error::SaltInvalid(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt("pw", b"0123456789abcdefg"),
            Err(Error::SaltInvalid(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt("pw", b"salt$"),
            Err(Error::SaltInvalid(_))
        ));
    }
}
