use super::{
    ITERATIONS_DEFAULT, Md5CryptDigest, SALT_LENGTH_DEFAULT, SALT_LENGTH_MAX, SALT_LENGTH_MIN,
    Variant,
};
use crate::algorithm::{Digest, Hasher, salt_length};
use crate::encoding::{CRYPT_SALT_CHARSET, crypt_salt};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Md5CryptHasher {
    variant: Option<Variant>,
    iterations: Option<u32>,
    salt_length: Option<usize>,
    defaulted: bool,
}

impl Md5CryptHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a hasher producing Sun `$md5$` digests.
    pub fn sun() -> Self {
        Self::new().with_variant(Variant::Sun)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Extra rounds of the Sun variant. Zero writes no rounds field.
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

    pub fn variant(&self) -> Option<Variant> {
        self.variant
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

        self.variant.get_or_insert_with(Variant::default);
        self.iterations.get_or_insert(ITERATIONS_DEFAULT);
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<Md5CryptDigest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();
        let iterations = match variant {
            Variant::Sun => self.iterations.unwrap_or(ITERATIONS_DEFAULT),
            Variant::Standard => 0,
        };

        salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        let salt = crypt_salt(salt)?;

        let key = variant.key(password.as_bytes(), salt, iterations)?;

        Ok(Md5CryptDigest::new(variant, iterations, salt.to_string(), key))
    }
}

impl Hasher for Md5CryptHasher {
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
    use crate::algorithm::md5crypt::decode;

    #[test]
    fn defaults() {
        let hasher = Md5CryptHasher::new().build().unwrap();
        assert_eq!(hasher.variant(), Some(Variant::Standard));
        assert_eq!(hasher.iterations(), Some(34_000));
        assert_eq!(hasher.salt_length(), Some(8));
    }

    #[test]
    fn reproduces_openssl_digest() {
        let digest = Md5CryptHasher::new()
            .hash_with_salt("password", b"5pZSV9va")
            .unwrap();
        assert_eq!(digest.encode(), "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0");
    }

    #[test]
    fn sun_hash_round_trips() {
        let mut hasher = Md5CryptHasher::sun().with_iterations(10);
        let digest = hasher.hash("password").unwrap();

        let encoded = digest.encode();
        assert!(encoded.starts_with("$md5,iterations=10$"), "{encoded}");

        let decoded = decode(&encoded).unwrap();
        assert!(decoded.matches("password"));
        assert!(!decoded.matches("passw0rd"));
    }

    #[test]
    fn sun_zero_iterations_omits_rounds() {
        let mut hasher = Md5CryptHasher::sun().with_iterations(0);
        let encoded = hasher.hash_with_salt("password", b"abcdefgh").unwrap().encode();
        assert!(encoded.starts_with("$md5$abcdefgh$$"), "{encoded}");
        assert!(decode(&encoded).unwrap().matches("password"));

        let digest = hasher.hash_with_salt("Gpcs3_adm", b"zrdhpMlZ").unwrap();
        assert_eq!(digest.encode(), "$md5$zrdhpMlZ$$wBvMOEqbSjU.hu5T2VEP01");
    }

    #[test]
    fn sun_reproduces_known_key() {
        let digest = Md5CryptHasher::sun()
            .with_iterations(10)
            .hash_with_salt("password", b"GUBv0xjJ")
            .unwrap();
        assert_eq!(digest.encode(), "$md5,iterations=10$GUBv0xjJ$$5hhyk/3z80GytyxJR.XsC0");
    }

    #[test]
    fn salt_checks() {
        let mut hasher = Md5CryptHasher::new();
        assert!(matches!(
            hasher.hash_with_salt("pw", b""),
            Err(Error::SaltInvalid(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt("pw", b"123456789"),
            Err(Error::SaltInvalid(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt("pw", b"ab$d"),
            Err(Error::SaltInvalid(_))
        ));
    }

    #[test]
    fn salt_length_bounds() {
        assert!(matches!(
            Md5CryptHasher::new().with_salt_length(9).build(),
            Err(Error::InvalidParameter { name: "salt size", .. })
        ));
    }
}
