use getrandom::fill;

use crate::error::{Error, Result};

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| Error::SaltReadFailed(format!("OS random generator unavailable: {e}")))
}

/// Random salt of `len` bytes.
pub fn bytes(len: usize) -> Result<Vec<u8>> {
    let mut salt = vec![0u8; len];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Random salt of `len` characters drawn uniformly from `charset`.
pub fn charset_bytes(len: usize, charset: &[u8]) -> Result<Vec<u8>> {
    if charset.is_empty() || charset.len() > 256 {
        return Err(Error::SaltInvalid(format!(
            "character set must hold between 1 and 256 characters but holds {}",
            charset.len()
        )));
    }

    // largest multiple of the charset length that fits in a byte
    let limit = 256 - (256 % charset.len());
    let mut salt = Vec::with_capacity(len);
    let mut buf = [0u8; 64];

    while salt.len() < len {
        secure_random(&mut buf)?;
        for b in buf {
            if (b as usize) < limit && salt.len() < len {
                salt.push(charset[b as usize % charset.len()]);
            }
        }
    }

    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{CRYPT_SALT_CHARSET, is_crypt_charset};

    #[test]
    fn bytes_have_requested_length() {
        assert_eq!(bytes(16).unwrap().len(), 16);
        assert!(bytes(0).unwrap().is_empty());
    }

    #[test]
    fn charset_salt_stays_in_charset() {
        let salt = charset_bytes(64, CRYPT_SALT_CHARSET).unwrap();
        assert_eq!(salt.len(), 64);
        assert!(is_crypt_charset(&salt));
    }

    #[test]
    fn random_salts_differ() {
        assert_ne!(bytes(32).unwrap(), bytes(32).unwrap());
    }

    #[test]
    fn empty_charset_is_rejected() {
        assert!(matches!(charset_bytes(4, b""), Err(Error::SaltInvalid(_))));
    }
}
