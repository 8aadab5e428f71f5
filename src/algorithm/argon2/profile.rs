use super::{Argon2Hasher, Variant};

/// Parameter sets recommended by RFC 9106 section 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Second recommended option: 64 MiB of memory and three passes.
    #[default]
    Rfc9106LowMemory,
    /// First recommended option: 2 GiB of memory and a single pass.
    Rfc9106Recommended,
}

impl Profile {
    /// A hasher with every parameter of this profile set.
    pub fn hasher(self) -> Argon2Hasher {
        let (t, m) = match self {
            Self::Rfc9106LowMemory => (3, 64 * 1024),
            Self::Rfc9106Recommended => (1, 2 * 1024 * 1024),
        };

        Argon2Hasher::new()
            .with_variant(Variant::ID)
            .with_t(t)
            .with_p(4)
            .with_m(m)
            .with_k(32)
            .with_s(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_profile_parameters() {
        let hasher = Profile::Rfc9106Recommended.hasher();
        assert_eq!(hasher.t(), Some(1));
        assert_eq!(hasher.m(), Some(2 * 1024 * 1024));
        assert_eq!(hasher.p(), Some(4));
    }

    #[test]
    fn profiles_validate() {
        for profile in [Profile::Rfc9106LowMemory, Profile::Rfc9106Recommended] {
            assert!(profile.hasher().build().is_ok());
        }
    }

    #[test]
    fn with_profile_overrides_earlier_settings() {
        let hasher = Argon2Hasher::new()
            .with_t(9)
            .with_profile(Profile::Rfc9106LowMemory);
        assert_eq!(hasher.t(), Some(3));
    }
}
