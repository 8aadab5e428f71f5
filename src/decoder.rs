//! Registry mapping identifiers and legacy prefixes to family decoders.
//!
//! A [`Decoder`] is built once, filled through [`Decoder::register`] and
//! [`Decoder::register_prefix`], and only read afterwards. The process wide
//! instances behind [`global`] and [`global_all`] are created lazily on first
//! use.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::algorithm::{
    DecodeFn, Digest, argon2, bcrypt, ldap, md5crypt, pbkdf2, plaintext, scrypt, sha1crypt,
    shacrypt,
};
use crate::encoding::{DELIMITER, split};
use crate::error::{Error, Result};
use crate::normalize::normalize;

static GLOBAL: OnceCell<Decoder> = OnceCell::new();
static GLOBAL_ALL: OnceCell<Decoder> = OnceCell::new();

#[derive(Default)]
pub struct Decoder {
    decoders: HashMap<String, DecodeFn>,
    /// Kept sorted longest prefix first.
    prefixes: Vec<(String, String)>,
}

impl Decoder {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// argon2, bcrypt, pbkdf2, scrypt/yescrypt, SHA-crypt and the LDAP SHA schemes.
    pub fn with_defaults() -> Result<Self> {
        let mut decoder = Self::new();
        decoder.register_defaults()?;
        Ok(decoder)
    }

    /// The default profile plus plaintext, md5crypt, sha1crypt and the LDAP
    /// MD5 schemes.
    pub fn with_all() -> Result<Self> {
        let mut decoder = Self::with_defaults()?;

        plaintext::register(&mut decoder)?;
        md5crypt::register(&mut decoder)?;
        sha1crypt::register(&mut decoder)?;
        ldap::register(&mut decoder, &[ldap::Variant::Md5, ldap::Variant::SaltedMd5])?;

        Ok(decoder)
    }

    fn register_defaults(&mut self) -> Result<()> {
        argon2::register(self)?;
        bcrypt::register(self)?;
        pbkdf2::register(self)?;
        scrypt::register(self)?;
        shacrypt::register(self)?;
        ldap::register(self, &ldap::Variant::SHA)?;
        Ok(())
    }

    /// Registers `decode` for the `$<identifier>$` field.
    ///
    /// # Errors
    ///
    /// Fails if the identifier is already taken; the existing entry stays.
    pub fn register(&mut self, identifier: &str, decode: DecodeFn) -> Result<()> {
        if self.decoders.contains_key(identifier) {
            return Err(Error::DecoderRegistration(format!(
                "decoder already registered for identifier '{identifier}'"
            )));
        }

        self.decoders.insert(identifier.to_string(), decode);
        Ok(())
    }

    /// Routes every input starting with `prefix` to the decoder of `identifier`.
    ///
    /// # Errors
    ///
    /// Fails if the identifier has no decoder or the prefix is already routed.
    pub fn register_prefix(&mut self, prefix: &str, identifier: &str) -> Result<()> {
        if !self.decoders.contains_key(identifier) {
            return Err(Error::DecoderRegistration(format!(
                "decoder isn't registered for identifier '{identifier}'"
            )));
        }

        if self.prefixes.iter().any(|(p, _)| p == prefix) {
            return Err(Error::DecoderRegistration(format!(
                "prefix '{prefix}' is already registered"
            )));
        }

        self.prefixes.push((prefix.to_string(), identifier.to_string()));
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(())
    }

    /// Whether a decoder is registered for `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.decoders.contains_key(identifier)
    }

    /// Registered identifiers in no particular order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Decodes any registered encoding, normalizing legacy forms first.
    pub fn decode(&self, encoded: &str) -> Result<Box<dyn Digest>> {
        if let Some(digest) = self.decode_prefixed(encoded) {
            return digest;
        }

        let normalized = normalize(encoded);

        if let Some(digest) = self.decode_prefixed(&normalized) {
            return digest;
        }

        if !normalized.starts_with(DELIMITER) {
            return Err(Error::InvalidFormat(format!(
                "the digest doesn't begin with the delimiter '{DELIMITER}' and is not one of the other understood formats"
            )));
        }

        let parts = split(&normalized, Some(3));

        if parts.len() != 3 {
            return Err(Error::InvalidFormat(
                "the digest doesn't have the minimum number of parts for it to be considered an encoded digest"
                    .to_string(),
            ));
        }

        match self.decoders.get(parts[1]) {
            Some(decode) => {
                debug!(identifier = parts[1], "resolved decoder");
                decode(&normalized)
            }
            None => Err(Error::InvalidIdentifier(format!(
                "the identifier '{}' is unknown to the decoder",
                parts[1]
            ))),
        }
    }

    fn decode_prefixed(&self, encoded: &str) -> Option<Result<Box<dyn Digest>>> {
        let (prefix, identifier) = self
            .prefixes
            .iter()
            .find(|(prefix, _)| encoded.starts_with(prefix.as_str()))?;

        let decode = self.decoders.get(identifier)?;

        debug!(prefix = prefix.as_str(), identifier = identifier.as_str(), "resolved decoder by prefix");

        Some(decode(encoded))
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<&str> = self.identifiers().collect();
        identifiers.sort_unstable();

        f.debug_struct("Decoder")
            .field("identifiers", &identifiers)
            .field("prefixes", &self.prefixes)
            .finish()
    }
}

/// Shared registry with the default profile.
pub fn global() -> Result<&'static Decoder> {
    GLOBAL.get_or_try_init(Decoder::with_defaults)
}

/// Shared registry with every decoder, including plaintext.
pub fn global_all() -> Result<&'static Decoder> {
    GLOBAL_ALL.get_or_try_init(Decoder::with_all)
}

/// Decodes with the [`global`] registry.
pub fn decode(encoded: &str) -> Result<Box<dyn Digest>> {
    global()?.decode(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGON2ID: &str = "$argon2id$v=19$m=65536,t=4,p=4$jfE+JyTE2DtnDCHknJOSsg$+BPKo7PFUjKycwSpEK0Z1ciUPKp05uJvSfC7C+QAvAk";

    fn failing(_: &str) -> Result<Box<dyn Digest>> {
        Err(Error::InvalidFormat("failing decoder".to_string()))
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut decoder = Decoder::with_defaults().unwrap();
        assert!(matches!(
            decoder.register("argon2id", failing),
            Err(Error::DecoderRegistration(_))
        ));

        let digest = decoder.decode(ARGON2ID).unwrap();
        assert_eq!(digest.algorithm(), "argon2");
    }

    #[test]
    fn prefix_needs_known_identifier() {
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.register_prefix("{X}", "x"),
            Err(Error::DecoderRegistration(_))
        ));

        decoder.register("x", failing).unwrap();
        decoder.register_prefix("{X}", "x").unwrap();
        assert!(matches!(
            decoder.register_prefix("{X}", "x"),
            Err(Error::DecoderRegistration(_))
        ));
    }

    #[test]
    fn longest_prefix_wins() {
        fn short(_: &str) -> Result<Box<dyn Digest>> {
            Err(Error::InvalidVersion("short".to_string()))
        }

        let mut decoder = Decoder::new();
        decoder.register("short", short).unwrap();
        decoder.register("long", failing).unwrap();
        decoder.register_prefix("{A", "short").unwrap();
        decoder.register_prefix("{AB}", "long").unwrap();

        assert!(matches!(decoder.decode("{AB}x"), Err(Error::InvalidFormat(_))));
        assert!(matches!(decoder.decode("{AC}x"), Err(Error::InvalidVersion(_))));
    }

    #[test]
    fn structural_errors() {
        let decoder = Decoder::with_defaults().unwrap();
        assert!(matches!(decoder.decode("argon2id"), Err(Error::InvalidFormat(_))));
        assert!(matches!(decoder.decode(""), Err(Error::InvalidFormat(_))));
        assert!(matches!(decoder.decode("$argon2id"), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            decoder.decode("$unknown$abc"),
            Err(Error::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn default_profile_excludes_legacy_families() {
        let decoder = Decoder::with_defaults().unwrap();
        assert!(matches!(
            decoder.decode("$plaintext$password"),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(matches!(
            decoder.decode("$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0"),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(!decoder.contains("ldap-md5"));
        assert!(decoder.contains("ldap-ssha512"));
    }

    #[test]
    fn all_profile_decodes_legacy_families() {
        let decoder = Decoder::with_all().unwrap();

        assert!(decoder.decode("$plaintext$password").unwrap().matches("password"));
        assert!(decoder.decode("{CLEARTEXT}password").unwrap().matches("password"));
        assert!(decoder
            .decode("$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0")
            .unwrap()
            .matches("password"));
        assert!(decoder
            .decode("$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a")
            .unwrap()
            .matches("password"));
        assert!(decoder.decode("{MD5}X03MO1qnZdYdgyfeuILPmQ==").unwrap().matches("password"));

        let sun = decoder.decode("$md5,rounds=5000$GUBv0xjJ$$iWnq2wFAB0sTlVQnZUOyG/").unwrap();
        assert_eq!(sun.algorithm(), "md5crypt");
        assert_eq!(sun.encode(), "$md5,iterations=5000$GUBv0xjJ$$iWnq2wFAB0sTlVQnZUOyG/");
    }

    #[test]
    fn legacy_wrappers_are_normalized() {
        let decoder = Decoder::with_defaults().unwrap();

        let digest = decoder
            .decode("{CRYPT}$2y$13$Aa6FIFnz3feYbEt4eKaRYeTd9y.RGzvRFzvcc5kCM4AONK3p/uH2q")
            .unwrap();
        assert_eq!(digest.algorithm(), "bcrypt");
        assert_eq!(
            digest.encode(),
            "$2b$13$Aa6FIFnz3feYbEt4eKaRYeTd9y.RGzvRFzvcc5kCM4AONK3p/uH2q"
        );

        let digest = decoder
            .decode("{PBKDF2-SHA256}10000$xxOL0cKNcEfejM9hoWFBCA$gTSqXH8dHrh9AkV2To5S56NIPRh2G8XBQlb1MhcyeHM")
            .unwrap();
        assert!(digest.matches("apple123"));
        assert!(digest.encode().starts_with("$pbkdf2-sha256$10000$"));

        let digest = decoder.decode(&format!("{{ARGON2}}{ARGON2ID}")).unwrap();
        assert!(digest.matches("apple123"));
    }

    #[test]
    fn ldap_sha_schemes_route_by_prefix() {
        let decoder = Decoder::with_defaults().unwrap();
        let digest = decoder.decode("{SSHA}zUmI4pewiNEHgqohjFzObVbD7VYM0mYT").unwrap();
        assert_eq!(digest.algorithm(), "ldap");
        assert!(digest.matches("example"));
    }

    #[test]
    fn global_is_shared() {
        let a = global().unwrap();
        let b = global().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(decode(ARGON2ID).is_ok());
    }
}
