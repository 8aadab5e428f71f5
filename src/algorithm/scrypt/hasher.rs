use tracing::warn;

use super::yescrypt::KEY_LENGTH as YESCRYPT_KEY_LENGTH;
use super::{
    ALG_NAME, BLOCK_SIZE_DEFAULT, BLOCK_SIZE_MAX, BLOCK_SIZE_MIN, INT_MAX, ITERATIONS_DEFAULT,
    ITERATIONS_MAX, ITERATIONS_MIN, KEY_LENGTH_MAX, KEY_LENGTH_MIN, PARALLELISM_DEFAULT,
    PARALLELISM_MIN, SALT_LENGTH_MAX, SALT_LENGTH_MIN, ScryptDigest, Variant,
};
use crate::algorithm::{Digest, Hasher, KEY_LENGTH_DEFAULT, SALT_LENGTH_DEFAULT, salt_length};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScryptHasher {
    variant: Option<Variant>,
    ln: Option<u32>,
    r: Option<u32>,
    p: Option<u32>,
    key_length: Option<usize>,
    salt_length: Option<usize>,
    unsafe_params: bool,
    defaulted: bool,
}

impl ScryptHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a hasher producing `$y$` digests.
    pub fn yescrypt() -> Self {
        Self::new().with_variant(Variant::Yescrypt)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Log2 of the CPU/memory cost N.
    pub fn with_ln(mut self, ln: u32) -> Self {
        self.ln = Some(ln);
        self
    }

    /// Block size.
    pub fn with_r(mut self, r: u32) -> Self {
        self.r = Some(r);
        self
    }

    pub fn with_p(mut self, p: u32) -> Self {
        self.p = Some(p);
        self
    }

    pub fn with_key_length(mut self, len: usize) -> Self {
        self.key_length = Some(len);
        self
    }

    pub fn with_salt_length(mut self, len: usize) -> Self {
        self.salt_length = Some(len);
        self
    }

    /// Skips parameter validation.
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

    pub fn ln(&self) -> Option<u32> {
        self.ln
    }

    pub fn r(&self) -> Option<u32> {
        self.r
    }

    pub fn p(&self) -> Option<u32> {
        self.p
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
        self.ln.get_or_insert(ITERATIONS_DEFAULT);
        self.r.get_or_insert(BLOCK_SIZE_DEFAULT);
        self.p.get_or_insert(PARALLELISM_DEFAULT);
        self.salt_length.get_or_insert(SALT_LENGTH_DEFAULT);
        self.key_length.get_or_insert(match variant {
            Variant::Scrypt => KEY_LENGTH_DEFAULT,
            Variant::Yescrypt => YESCRYPT_KEY_LENGTH,
        });
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<ScryptDigest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();
        let ln = self.ln.unwrap_or(ITERATIONS_DEFAULT);
        let r = self.r.unwrap_or(BLOCK_SIZE_DEFAULT);
        let p = self.p.unwrap_or(PARALLELISM_DEFAULT);
        let len = self.key_length.unwrap_or(KEY_LENGTH_DEFAULT);

        if !self.unsafe_params {
            salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;
        }

        let key = variant.key(password.as_bytes(), salt, ln, r, p, len)?;

        ScryptDigest::new(variant, ln, r, p, salt.to_vec(), key.to_vec())
    }
}

impl Hasher for ScryptHasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        if self.unsafe_params {
            warn!(algorithm = ALG_NAME, "parameter validation is disabled");
            return Ok(());
        }

        let k = self.key_length.unwrap_or(KEY_LENGTH_DEFAULT) as u64;
        if !(KEY_LENGTH_MIN..=KEY_LENGTH_MAX).contains(&k) {
            return Err(Error::parameter("k", KEY_LENGTH_MIN, KEY_LENGTH_MAX, k));
        }

        let s = self.salt_length.unwrap_or(SALT_LENGTH_DEFAULT);
        if !(SALT_LENGTH_MIN..=SALT_LENGTH_MAX).contains(&s) {
            return Err(Error::parameter(
                "s",
                SALT_LENGTH_MIN as u64,
                SALT_LENGTH_MAX as u64,
                s as u64,
            ));
        }

        let ln = self.ln.unwrap_or(ITERATIONS_DEFAULT);
        if !(ITERATIONS_MIN..=ITERATIONS_MAX).contains(&ln) {
            return Err(Error::parameter(
                "ln",
                ITERATIONS_MIN.into(),
                ITERATIONS_MAX.into(),
                ln.into(),
            ));
        }

        let r = u64::from(self.r.unwrap_or(BLOCK_SIZE_DEFAULT));
        let p = u64::from(self.p.unwrap_or(PARALLELISM_DEFAULT));

        let rp = r * p;
        if rp >= 1 << 30 {
            return Err(Error::parameter("r * p", 1, (1 << 30) - 1, rp));
        }

        if !(BLOCK_SIZE_MIN..=BLOCK_SIZE_MAX).contains(&r) {
            return Err(Error::parameter("r", BLOCK_SIZE_MIN, BLOCK_SIZE_MAX, r));
        }

        let p_max = KEY_LENGTH_MAX / (128 * r);
        if p < PARALLELISM_MIN || p > p_max {
            return Err(Error::parameter("p", PARALLELISM_MIN, p_max, p));
        }

        let r_max = INT_MAX / 128 / p;
        if r_max < BLOCK_SIZE_MAX && r > r_max {
            return Err(Error::parameter("r", BLOCK_SIZE_MIN, r_max, r));
        }

        let n_max = INT_MAX / 128 / r;
        if (1u64 << ln) > n_max {
            let ln_max = u64::from(63 - n_max.leading_zeros());
            return Err(Error::parameter("ln", ITERATIONS_MIN.into(), ln_max, ln.into()));
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
    use crate::algorithm::scrypt::decode;
    use crate::encoding::base64::{Engine, STD_RAW};

    #[test]
    fn defaults() {
        let hasher = ScryptHasher::new().build().unwrap();
        assert_eq!(hasher.variant(), Some(Variant::Scrypt));
        assert_eq!((hasher.ln(), hasher.r(), hasher.p()), (Some(16), Some(8), Some(1)));
        assert_eq!(hasher.key_length(), Some(32));
        assert_eq!(hasher.salt_length(), Some(16));
    }

    #[test]
    fn r_times_p_bound() {
        match ScryptHasher::new().with_r(1 << 15).with_p(1 << 15).build() {
            Err(Error::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "r * p");
                assert_eq!(value, 1 << 30);
            }
            other => panic!("expected InvalidParameter, got: {other:?}"),
        }
    }

    #[test]
    fn parallelism_bound_depends_on_block_size() {
        // KEY_LENGTH_MAX / (128 * 1024) = 16383
        assert!(ScryptHasher::new().with_r(1024).with_p(16383).build().is_ok());
        assert!(matches!(
            ScryptHasher::new().with_r(1024).with_p(16384).build(),
            Err(Error::InvalidParameter { name: "p", .. })
        ));
    }

    #[test]
    fn ln_bounds() {
        assert!(matches!(
            ScryptHasher::new().with_ln(0).build(),
            Err(Error::InvalidParameter { name: "ln", .. })
        ));
        assert!(matches!(
            ScryptHasher::new().with_ln(59).build(),
            Err(Error::InvalidParameter { name: "ln", .. })
        ));
    }

    #[test]
    fn salt_length_bounds() {
        assert!(matches!(
            ScryptHasher::new().with_salt_length(7).build(),
            Err(Error::InvalidParameter { name: "s", .. })
        ));
        assert!(matches!(
            ScryptHasher::new().with_ln(4).hash_with_salt("pw", b"short"),
            Err(Error::SaltInvalid(_))
        ));
    }

    #[test]
    fn reproduces_known_scrypt_digest() {
        let mut hasher = ScryptHasher::new().with_ln(15);
        let salt = STD_RAW.decode("m7M2BqBUytk75zznfK91jg").unwrap();
        let digest = hasher.hash_with_salt("apple123", &salt).unwrap();
        assert_eq!(
            digest.encode(),
            "$scrypt$ln=15,r=8,p=1$m7M2BqBUytk75zznfK91jg$F11VwAGrQanCaexGVmBafSbTs1X2l165eyb+m8uN/mg"
        );
    }

    #[test]
    fn yescrypt_hash_round_trips() {
        let mut hasher = ScryptHasher::yescrypt().with_ln(4);
        let digest = hasher.hash("password").unwrap();

        let encoded = digest.encode();
        assert!(encoded.starts_with("$y$.35$"), "{encoded}");

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.encode(), encoded);
        assert!(decoded.matches("password"));
        assert!(!decoded.matches("Password"));
    }
}
