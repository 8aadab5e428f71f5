use super::{BcryptDigest, COST_DEFAULT, COST_MAX, COST_MIN, SALT_LENGTH, Variant};
use crate::algorithm::{Digest, Hasher};
use crate::error::{Error, Result};
use crate::random;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BcryptHasher {
    variant: Option<Variant>,
    cost: Option<u32>,
    defaulted: bool,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a hasher using [`Variant::Sha256`].
    pub fn sha256() -> Self {
        Self::new().with_variant(Variant::Sha256)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Log2 of the number of rounds.
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn cost(&self) -> Option<u32> {
        self.cost
    }

    fn apply_defaults(&mut self) {
        if self.defaulted {
            return;
        }
        self.defaulted = true;

        self.variant.get_or_insert_with(Variant::default);
        self.cost.get_or_insert(COST_DEFAULT);
    }

    pub fn derive(&mut self, password: &str, salt: &[u8]) -> Result<BcryptDigest> {
        self.validate()?;

        let variant = self.variant.unwrap_or_default();
        let cost = self.cost.unwrap_or(COST_DEFAULT);

        if salt.len() != SALT_LENGTH {
            return Err(Error::SaltInvalid(format!(
                "salt size must be {SALT_LENGTH} bytes but it's {} bytes",
                salt.len()
            )));
        }

        if let Some(max) = variant.password_max_length() {
            if password.len() > max {
                return Err(Error::PasswordInvalid(format!(
                    "password must be {max} bytes or less but it's {} bytes",
                    password.len()
                )));
            }
        }

        let key = variant.key(password.as_bytes(), salt, cost)?;

        Ok(BcryptDigest::new(variant, cost, salt.to_vec(), key))
    }
}

impl Hasher for BcryptHasher {
    fn validate(&mut self) -> Result<()> {
        self.apply_defaults();

        let cost = self.cost.unwrap_or(COST_DEFAULT);
        if !(COST_MIN..=COST_MAX).contains(&cost) {
            return Err(Error::parameter(
                "cost",
                COST_MIN.into(),
                COST_MAX.into(),
                cost.into(),
            ));
        }

        Ok(())
    }

    fn hash(&mut self, password: &str) -> Result<Box<dyn Digest>> {
        let salt = random::bytes(SALT_LENGTH)?;
        Ok(Box::new(self.derive(password, &salt)?))
    }

    fn hash_with_salt(&mut self, password: &str, salt: &[u8]) -> Result<Box<dyn Digest>> {
        Ok(Box::new(self.derive(password, salt)?))
    }
}
