//! Field splitting and option parsing for `$`-delimited digests.
//!
//! Everything here is algorithm agnostic: the per-family decoders decide what
//! the fields mean.

pub mod base64;
pub mod crypt64;

use crate::error::{Error, Result};

/// Field delimiter of the encoded form.
pub const DELIMITER: char = '$';

/// Characters accepted in crypt(3) style salts.
pub const CRYPT_SALT_CHARSET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789./";

/// Splits an encoded digest on [`DELIMITER`].
///
/// With `Some(n)` at most `n` fields are returned, the last one holding the
/// unsplit remainder; `Some(0)` yields nothing. `None` splits every delimiter.
pub fn split(encoded: &str, limit: Option<usize>) -> Vec<&str> {
    match limit {
        None => encoded.split(DELIMITER).collect(),
        Some(0) => Vec::new(),
        Some(n) => encoded.splitn(n, DELIMITER).collect(),
    }
}

/// A single `key=value` option token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl Parameter<'_> {
    /// Parses the value as an unsigned integer that must fit in `bits` bits.
    pub fn uint(&self, bits: u32) -> Result<u64> {
        parse_uint(self.value, bits).map_err(|reason| Error::option_value(self.key, self.value, reason))
    }

    pub fn u32(&self) -> Result<u32> {
        self.uint(32).map(|v| v as u32)
    }
}

/// Splits an option list such as `m=65536,t=3,p=4` into its parameters.
///
/// Each token is split on its first `=`; a token without one is rejected.
pub fn decode_parameters(options: &str) -> Result<Vec<Parameter<'_>>> {
    options
        .split(',')
        .map(|token| match token.split_once('=') {
            Some((key, value)) => Ok(Parameter { key, value }),
            None => Err(Error::InvalidOption(token.to_string())),
        })
        .collect()
}

/// Parses a positional numeric field (iterations, cost) reported as option `name`.
pub(crate) fn positional_u32(name: &str, value: &str) -> Result<u32> {
    parse_uint(value, 32)
        .map(|v| v as u32)
        .map_err(|reason| Error::option_value(name, value, reason))
}

fn parse_uint(value: &str, bits: u32) -> std::result::Result<u64, String> {
    if value.is_empty() {
        return Err("value is empty".to_string());
    }

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid syntax".to_string());
    }

    let parsed: u64 = value.parse().map_err(|_| "value out of range".to_string())?;

    if bits < 64 && parsed >> bits != 0 {
        return Err("value out of range".to_string());
    }

    Ok(parsed)
}

/// Reports whether every byte of `salt` is in [`CRYPT_SALT_CHARSET`].
pub fn is_crypt_charset(salt: &[u8]) -> bool {
    salt.iter().all(|b| CRYPT_SALT_CHARSET.contains(b))
}

/// Checks a crypt(3) salt and returns it as text.
pub(crate) fn crypt_salt(salt: &[u8]) -> Result<&str> {
    if !is_crypt_charset(salt) {
        return Err(Error::SaltInvalid(
            "salt must only contain the characters A-Z, a-z, 0-9, '.' and '/'".to_string(),
        ));
    }

    std::str::from_utf8(salt).map_err(|e| Error::SaltInvalid(e.to_string()))
}

/// Removes newlines from a rendered template.
pub(crate) fn strip_newlines(mut encoded: String) -> String {
    if encoded.contains('\n') {
        encoded.retain(|c| c != '\n');
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_honours_limit() {
        assert_eq!(split("$plaintext$a$b", Some(3)), vec!["", "plaintext", "a$b"]);
        assert_eq!(split("$1$salt$key", None), vec!["", "1", "salt", "key"]);
        assert!(split("$1$", Some(0)).is_empty());
        assert_eq!(split("nodelimiter", Some(3)), vec!["nodelimiter"]);
    }

    #[test]
    fn options_split_on_first_equals() {
        let params = decode_parameters("m=1,t=2=3").unwrap();
        assert_eq!(params[0], Parameter { key: "m", value: "1" });
        assert_eq!(params[1], Parameter { key: "t", value: "2=3" });
    }

    #[test]
    fn option_without_equals_is_invalid() {
        match decode_parameters("m=1,t") {
            Err(Error::InvalidOption(token)) => assert_eq!(token, "t"),
            other => panic!("expected InvalidOption, got: {other:?}"),
        }
    }

    #[test]
    fn uint_respects_bit_width() {
        let param = Parameter { key: "v", value: "256" };
        match param.uint(8) {
            Err(Error::InvalidOptionValue { key, value, .. }) => {
                assert_eq!(key, "v");
                assert_eq!(value, "256");
            }
            other => panic!("expected InvalidOptionValue, got: {other:?}"),
        }
        assert_eq!(Parameter { key: "v", value: "255" }.uint(8).unwrap(), 255);
        assert!(Parameter { key: "m", value: "+1" }.uint(32).is_err());
        assert!(Parameter { key: "m", value: "" }.uint(32).is_err());
    }

    #[test]
    fn crypt_charset() {
        assert!(is_crypt_charset(b"abcXYZ09./"));
        assert!(!is_crypt_charset(b"abc$"));
    }

    proptest! {
        #[test]
        fn unbounded_split_rejoins(s in "[a-z$]{0,32}") {
            let parts = split(&s, None);
            prop_assert_eq!(parts.join("$"), s);
        }

        #[test]
        fn bounded_split_never_exceeds_limit(s in "[a-z$]{0,32}", n in 1usize..6) {
            let parts = split(&s, Some(n));
            prop_assert!(parts.len() <= n);
            prop_assert_eq!(parts.join("$"), s);
        }
    }
}
