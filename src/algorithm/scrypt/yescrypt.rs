//! yescrypt `$y$<setting>$<salt>$<key>` encoding.
//!
//! The setting packs the flavor, `ln`, `r` and optionally `p` with the
//! variable length crypt base64 integer encoding. Flavor 0 is classic scrypt
//! and is the only flavor whose key can be derived here; other flavors are
//! decoded and re-encoded unchanged.

use super::{ALG_NAME, ScryptDigest, Variant};
use crate::algorithm::ensure_decoded_key;
use crate::encoding::crypt64::{decode64, decode64_uint32, encode64, encode64_uint32};
use crate::error::{Error, Result};

/// Flavor for classic scrypt.
pub const FLAVOR_SCRYPT: u32 = 0;

/// yescrypt's default `YESCRYPT_RW` flavor as written by libxcrypt (`j`).
pub const FLAVOR_DEFAULT_RW: u32 = 47;

/// Key length written by crypt(3).
pub const KEY_LENGTH: usize = 32;

// bit in the "have" field announcing an explicit p
const HAVE_P: u32 = 1;

/// Parameters carried by a yescrypt setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub flavor: u32,
    pub ln: u32,
    pub r: u32,
    pub p: u32,
}

/// Writes the setting field.
///
/// Returns `None` if `ln` or `r` is zero.
pub fn encode_setting(setting: Setting) -> Option<String> {
    let mut dst = String::with_capacity(8);

    encode64_uint32(&mut dst, setting.flavor, 0)?;
    encode64_uint32(&mut dst, setting.ln, 1)?;
    encode64_uint32(&mut dst, setting.r, 1)?;

    if setting.p != 1 {
        encode64_uint32(&mut dst, HAVE_P, 1)?;
        encode64_uint32(&mut dst, setting.p, 2)?;
    }

    Some(dst)
}

/// Reads the setting field.
pub fn decode_setting(encoded: &str) -> Result<Setting> {
    let invalid = || Error::InvalidOption(encoded.to_string());

    let src = encoded.as_bytes();

    let (flavor, src) = decode64_uint32(src, 0).ok_or_else(invalid)?;
    let (ln, src) = decode64_uint32(src, 1).ok_or_else(invalid)?;
    let (r, mut src) = decode64_uint32(src, 1).ok_or_else(invalid)?;

    let mut p = 1;

    if !src.is_empty() {
        let (have, rest) = decode64_uint32(src, 1).ok_or_else(invalid)?;

        // only an explicit p is supported; t, g and ROM are not
        if have & !HAVE_P != 0 {
            return Err(invalid());
        }

        src = rest;

        if have & HAVE_P != 0 {
            let (value, rest) = decode64_uint32(src, 2).ok_or_else(invalid)?;
            p = value;
            src = rest;
        }

        if !src.is_empty() {
            return Err(invalid());
        }
    }

    Ok(Setting { flavor, ln, r, p })
}

pub(super) fn decode_parts(parts: &[&str]) -> Result<ScryptDigest> {
    let setting = decode_setting(parts[2])?;

    let salt = decode64(parts[3])
        .ok_or_else(|| Error::InvalidSaltEncoding(format!("{ALG_NAME} salt is not crypt base64")))?;

    let key = decode64(parts[4])
        .ok_or_else(|| Error::InvalidKeyEncoding(format!("{ALG_NAME} key is not crypt base64")))?;

    ensure_decoded_key(&key)?;

    ScryptDigest::new(Variant::Yescrypt, setting.ln, setting.r, setting.p, salt, key)?
        .with_flavor(setting.flavor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Digest;
    use crate::algorithm::scrypt::decode;

    const TEST1: &str = "$y$j75$z7ztFz2FayrKI79/jEwlL.$u5x/j193MQ09wbFaRGYr0AH/A/jh3kunjuhYRVRNkmC";

    #[test]
    fn libxcrypt_setting() {
        let setting = decode_setting("j75").unwrap();
        assert_eq!(
            setting,
            Setting {
                flavor: FLAVOR_DEFAULT_RW,
                ln: 10,
                r: 8,
                p: 1
            }
        );
        assert_eq!(encode_setting(setting).unwrap(), "j75");

        assert_eq!(decode_setting("jD5").unwrap().ln, 16);
    }

    #[test]
    fn explicit_p_round_trips() {
        let setting = Setting {
            flavor: FLAVOR_SCRYPT,
            ln: 4,
            r: 8,
            p: 3,
        };
        let encoded = encode_setting(setting).unwrap();
        assert_eq!(decode_setting(&encoded).unwrap(), setting);
    }

    #[test]
    fn unsupported_have_bits_are_rejected() {
        let mut encoded = encode_setting(Setting {
            flavor: FLAVOR_SCRYPT,
            ln: 4,
            r: 8,
            p: 1,
        })
        .unwrap();
        encode64_uint32(&mut encoded, 2, 1).unwrap();
        assert!(matches!(decode_setting(&encoded), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn truncated_setting() {
        assert!(matches!(decode_setting("j7"), Err(Error::InvalidOption(_))));
        assert!(matches!(decode_setting(""), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn native_digest_round_trips() {
        let digest = decode(TEST1).unwrap();
        assert_eq!(digest.variant(), Variant::Yescrypt);
        assert_eq!(digest.flavor(), FLAVOR_DEFAULT_RW);
        assert_eq!((digest.ln(), digest.r(), digest.p()), (10, 8, 1));
        assert_eq!(digest.key().len(), KEY_LENGTH);
        assert_eq!(digest.encode(), TEST1);
    }

    #[test]
    fn native_flavor_cannot_be_matched() {
        let digest = decode(TEST1).unwrap();
        assert!(matches!(
            digest.matches_advanced("test1"),
            Err(Error::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn bad_salt_alphabet() {
        assert!(matches!(
            decode("$y$j75$z7zt+z2F$u5x/j193MQ09wbFaRGYr0AH/A/jh3kunjuhYRVRNkmC"),
            Err(Error::InvalidSaltEncoding(_))
        ));
    }
}
