//! Base64 engines for the alphabets found in encoded digests.

use ::base64::alphabet::{self, Alphabet};
use ::base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

pub use ::base64::Engine;

const RAW: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::RequireNone)
    .with_decode_allow_trailing_bits(true);

const ADAPTED_ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789./") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("adapted base64 alphabet is malformed"),
    };

/// Standard alphabet without padding (argon2, scrypt).
pub const STD_RAW: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, RAW);

/// Standard alphabet with padding (LDAP schemes, bcrypt-sha256 pre-hash).
pub const STD: GeneralPurpose = ::base64::engine::general_purpose::STANDARD;

/// `A-Za-z0-9./` without padding (pbkdf2, plaintext base64).
pub const ADAPTED_RAW: GeneralPurpose = GeneralPurpose::new(&ADAPTED_ALPHABET, RAW);

/// bcrypt's `./A-Za-z0-9` alphabet without padding.
pub const BCRYPT: GeneralPurpose = GeneralPurpose::new(&alphabet::BCRYPT, RAW);
