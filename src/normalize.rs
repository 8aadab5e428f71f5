//! Rewrites legacy LDAP and Passlib encodings into the canonical `$id$` form.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

const PREFIX_LDAP_CRYPT: &str = "{CRYPT}";
const PREFIX_LDAP_ARGON2: &str = "{ARGON2}";
const PREFIX_LDAP_CLEARTEXT: &str = "{CLEARTEXT}";

const BCRYPT_LEGACY_PREFIXES: [&str; 4] = ["$2$", "$2a$", "$2x$", "$2y$"];
const BCRYPT_CANONICAL_PREFIX: &str = "$2b$";

static RE_LDAP_PBKDF2: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(?P<identifier>(?i:PBKDF2(-SHA\d+)?))\}(?P<remainder>\d+\$.*)$")
        .unwrap_or_else(|err| unreachable!("static pattern: {err}"))
});

static RE_LDAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(?P<identifier>\w+)\}(?P<remainder>\d+\$.*)$")
        .unwrap_or_else(|err| unreachable!("static pattern: {err}"))
});

/// Normalizes an encoded digest so it can be split and dispatched.
///
/// Input that matches no rule is returned unchanged; this never fails.
pub fn normalize(encoded: &str) -> Cow<'_, str> {
    if let Some(rest) = encoded.strip_prefix(PREFIX_LDAP_CRYPT) {
        return Cow::Borrowed(rest);
    }

    if let Some(rest) = encoded.strip_prefix(PREFIX_LDAP_ARGON2) {
        return Cow::Borrowed(rest);
    }

    if let Some(rest) = encoded.strip_prefix(PREFIX_LDAP_CLEARTEXT) {
        return Cow::Owned(format!("$plaintext${rest}"));
    }

    let mut normalized = Cow::Borrowed(encoded);

    if let Some(rewritten) = rewrite_bracket(&RE_LDAP_PBKDF2, &normalized) {
        trace!("rewrote LDAP pbkdf2 scheme prefix");
        normalized = Cow::Owned(rewritten);
    } else if let Some(rewritten) = rewrite_bracket(&RE_LDAP, &normalized) {
        trace!("rewrote LDAP scheme prefix");
        normalized = Cow::Owned(rewritten);
    }

    for prefix in BCRYPT_LEGACY_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            trace!(prefix, "unified bcrypt version prefix");
            return Cow::Owned(format!("{BCRYPT_CANONICAL_PREFIX}{rest}"));
        }
    }

    normalized
}

fn rewrite_bracket(pattern: &Regex, encoded: &str) -> Option<String> {
    let captures = pattern.captures(encoded)?;
    let identifier = captures.name("identifier")?.as_str();
    let remainder = captures.name("remainder")?.as_str();

    Some(format!("${}${remainder}", identifier.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_crypt_and_argon2_wrappers() {
        assert_eq!(normalize("{CRYPT}$6$salt$key"), "$6$salt$key");
        assert_eq!(
            normalize("{ARGON2}$argon2id$v=19$m=8,t=1,p=1$c2FsdA$a2V5"),
            "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$a2V5"
        );
    }

    #[test]
    fn cleartext_becomes_plaintext() {
        assert_eq!(normalize("{CLEARTEXT}hunter$2"), "$plaintext$hunter$2");
    }

    #[test]
    fn ldap_pbkdf2_is_lowercased() {
        assert_eq!(
            normalize("{PBKDF2-SHA256}10000$c2FsdA$a2V5"),
            "$pbkdf2-sha256$10000$c2FsdA$a2V5"
        );
        assert_eq!(normalize("{pbkdf2}10000$c2FsdA$a2V5"), "$pbkdf2$10000$c2FsdA$a2V5");
    }

    #[test]
    fn generic_ldap_scheme_with_numeric_field() {
        assert_eq!(normalize("{SHA1CRYPT}64000$salt$key"), "$sha1crypt$64000$salt$key");
    }

    #[test]
    fn bare_ldap_digests_are_untouched() {
        let encoded = "{SSHA512}FXFpO1AxW+S7GAv+Ig07TTf5wbPH+pqnRWeBn0u76P62aLK8aeLltqnSnmz6GYS8ks2n1CRKQCXRlbuqHGq1HvXdYKIYz9Ee";
        assert!(matches!(normalize(encoded), Cow::Borrowed(s) if s == encoded));
    }

    #[test]
    fn bcrypt_prefixes_unify() {
        for prefix in ["$2$", "$2a$", "$2x$", "$2y$", "$2b$"] {
            let encoded = format!("{prefix}10$3o9IF74Phgdz4Q6j7K7s0unovt.v.7YBLKFyV73pGTd2.tfdz/F8e");
            assert_eq!(
                normalize(&encoded),
                "$2b$10$3o9IF74Phgdz4Q6j7K7s0unovt.v.7YBLKFyV73pGTd2.tfdz/F8e"
            );
        }
    }

    #[test]
    fn garbage_passes_through() {
        assert_eq!(normalize("not a digest"), "not a digest");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("{BROKEN"), "{BROKEN");
    }
}
