use super::{
    Argon2Digest, ITERATIONS_MAX, ITERATIONS_MIN, KEY_LENGTH_MAX, KEY_LENGTH_MIN,
    MEMORY_MAX, MEMORY_MIN_PARALLELISM_MULTIPLIER, PARALLELISM_MAX, PARALLELISM_MIN, Profile,
    SALT_LENGTH_MAX, SALT_LENGTH_MIN, Variant, round_memory,
};
use crate::algorithm::{Digest, Hasher, I32_MAX, salt_length};
use crate::error::{Error, Result};
use crate::random;

/// Builder for argon2 digests.
///
/// Unset parameters are taken from [`Profile::Rfc9106LowMemory`] the first
/// time the hasher is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argon2Hasher {
    variant: Option<Variant>,
    t: Option<u32>,
    p: Option<u32>,
    m: Option<u32>,
    k: Option<u32>,
    s: Option<u32>,
    defaulted: bool,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Number of passes.
    pub fn with_t(mut self, t: u32) -> Self {
        self.t = Some(t);
        self
    }

    /// Degree of parallelism.
    pub fn with_p(mut self, p: u32) -> Self {
        self.p = Some(p);
        self
    }

    /// Memory size in KiB, rounded down to a multiple of `4 * p` on use.
    pub fn with_m(mut self, m: u32) -> Self {
        self.m = Some(m);
        self
    }

    /// Tag (key) length in bytes.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = Some(k);
        self
    }

    /// Generated salt length in bytes.
    pub fn with_s(mut self, s: u32) -> Self {
        self.s = Some(s);
        self
    }

    /// Copies every parameter of `profile` into this hasher.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        let other = profile.hasher();
        self.variant = other.variant;
        self.t = other.t;
        self.p = other.p;
        self.m = other.m;
        self.k = other.k;
        self.s = other.s;
        self.defaulted = false;
        self
    }

    /// Applies defaults and validates, returning the ready hasher.
    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn t(&self) -> Option<u32> {
        self.t
    }

    pub fn p(&self) -> Option<u32> {
        self.p
    }

    pub fn m(&self) -> Option<u32> {
        self.m
    }

    pub fn k(&self) -> Option<u32> {
        self.k
    }

    pub fn s(&self) -> Option<u32> {
        self.s
    }

    fn apply_defaults(&mut self) {
        if self.defaulted {
            return;
        }
        self.defaulted = true;

        let profile = Profile::Rfc9106LowMemory.hasher();

        self.variant = self.variant.or(profile.variant);
        self.t = self.t.or(profile.t);
        self.p = self.p.or(profile.p);
        self.m = self.m.or(profile.m);
        self.k = self.k.or(profile.k);
        self.s = self.s.or(profile.s);

        if let (Some(m), Some(p)) = (self.m, self.p) {
            self.m = Some(round_memory(m, p));
        }
    }

    fn settings(&mut self) -> Result<Settings> {
        self.validate()?;

        // every field is set once defaults have been applied
        Ok(Settings {
            variant: self.variant.unwrap_or_default(),
            t: self.t.unwrap_or_default(),
            p: self.p.unwrap_or_default(),
            m: self.m.unwrap_or_default(),
            k: self.k.unwrap_or_default() as usize,
            s: self.s.unwrap_or_default() as usize,
        })
    }

    /// Hashes `password` with `salt`, returning the concrete digest.
    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<Argon2Digest> {
        let settings = self.settings()?;

        salt_length(SALT_LENGTH_MIN, SALT_LENGTH_MAX, salt.len())?;

        if password.len() > I32_MAX as usize {
            return Err(Error::PasswordInvalid(format!(
                "password has a length of '{}' but must be less than or equal to {}",
                password.len(),
                I32_MAX
            )));
        }

        let key = settings.variant.key(
            password.as_bytes(),
            salt,
            settings.t,
            settings.m,
            settings.p,
            settings.k,
        )?;

        Ok(Argon2Digest::new(
            settings.variant,
            settings.t,
            settings.m,
            settings.p,
            salt.to_vec(),
            key.to_vec(),
        ))
    }
}

struct Settings {
    variant: Variant,
    t: u32,
    p: u32,
    m: u32,
    k: usize,
    s: usize,
}

impl Hasher for Argon2Hasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        let t = self.t.unwrap_or_default();
        if !(ITERATIONS_MIN..=ITERATIONS_MAX).contains(&t) {
            return Err(Error::parameter(
                "t",
                ITERATIONS_MIN.into(),
                ITERATIONS_MAX.into(),
                t.into(),
            ));
        }

        let p = self.p.unwrap_or_default();
        if !(PARALLELISM_MIN..=PARALLELISM_MAX).contains(&p) {
            return Err(Error::parameter(
                "p",
                PARALLELISM_MIN.into(),
                PARALLELISM_MAX.into(),
                p.into(),
            ));
        }

        let m = self.m.unwrap_or_default();
        let m_min = u64::from(p) * u64::from(MEMORY_MIN_PARALLELISM_MULTIPLIER);
        if u64::from(m) < m_min || m > MEMORY_MAX {
            return Err(Error::parameter("m", m_min, MEMORY_MAX.into(), m.into()));
        }

        let k = self.k.unwrap_or_default() as usize;
        if !(KEY_LENGTH_MIN..=KEY_LENGTH_MAX).contains(&k) {
            return Err(Error::parameter(
                "k",
                KEY_LENGTH_MIN as u64,
                KEY_LENGTH_MAX as u64,
                k as u64,
            ));
        }

        let s = self.s.unwrap_or_default() as usize;
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
        let settings = self.settings()?;
        let salt = random::bytes(settings.s)?;
        Ok(Box::new(self.derive(password, &salt)?))
    }

    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>> {
        Ok(Box::new(self.derive(password, salt)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::argon2::decode;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new().with_t(1).with_p(1).with_m(64)
    }

    #[test]
    fn defaults_come_from_low_memory_profile() {
        let hasher = Argon2Hasher::new().build().unwrap();
        assert_eq!(hasher.variant(), Some(Variant::ID));
        assert_eq!(hasher.t(), Some(3));
        assert_eq!(hasher.p(), Some(4));
        assert_eq!(hasher.m(), Some(65536));
        assert_eq!(hasher.k(), Some(32));
        assert_eq!(hasher.s(), Some(16));
    }

    #[test]
    fn defaults_are_idempotent() {
        let mut once = Argon2Hasher::new().with_m(1000).with_p(3);
        once.validate().unwrap();
        let mut twice = once.clone();
        twice.validate().unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.m(), Some(996));
    }

    #[test]
    fn memory_below_eight_times_parallelism_is_rejected() {
        match Argon2Hasher::new().with_p(4).with_m(31).build() {
            Err(Error::InvalidParameter { name, min, .. }) => {
                assert_eq!(name, "m");
                assert_eq!(min, 32);
            }
            other => panic!("expected InvalidParameter, got: {other:?}"),
        }
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        assert!(matches!(
            Argon2Hasher::new().with_p(0).build(),
            Err(Error::InvalidParameter { name: "p", .. })
        ));
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(matches!(
            Argon2Hasher::new().with_k(3).build(),
            Err(Error::InvalidParameter { name: "k", .. })
        ));
    }

    #[test]
    fn hash_round_trips_through_decode() {
        let mut hasher = cheap();
        let digest = hasher.hash("correct horse").unwrap();
        assert!(digest.encode().starts_with("$argon2id$v=19$m=64,t=1,p=1$"));

        let decoded = decode(&digest.encode()).unwrap();
        assert!(decoded.matches("correct horse"));
        assert!(!decoded.matches("battery staple"));
        assert_eq!(decoded.salt().len(), 16);
        assert_eq!(decoded.key().len(), 32);
    }

    #[test]
    fn hash_with_salt_is_deterministic() {
        let mut hasher = cheap().with_variant(Variant::I);
        let a = hasher.hash_with_salt("pw", b"saltsalt").unwrap();
        let b = hasher.hash_with_salt("pw", b"saltsalt").unwrap();
        assert_eq!(a.encode(), b.encode());
        assert!(a.encode().starts_with("$argon2i$"));
    }

    #[test]
    fn empty_salt_is_rejected() {
        assert!(matches!(
            cheap().hash_with_salt("pw", b""),
            Err(Error::SaltInvalid(_))
        ));
    }

    #[test]
    fn short_salt_size_fails_validation() {
        match cheap().with_s(7).build() {
            Err(Error::InvalidParameter { name, min, value, .. }) => {
                assert_eq!(name, "salt size");
                assert_eq!(min, 8);
                assert_eq!(value, 7);
            }
            other => panic!("expected InvalidParameter, got: {other:?}"),
        }
        assert!(cheap().with_s(8).build().is_ok());
    }

    #[test]
    fn short_explicit_salt_is_rejected() {
        assert!(matches!(
            cheap().hash_with_salt("pw", b"abc"),
            Err(Error::SaltInvalid(_))
        ));
    }

    #[test]
    #[should_panic(expected = "password hashing failed")]
    fn must_hash_panics_on_invalid_configuration() {
        Argon2Hasher::new().with_t(0).must_hash("pw");
    }
}
