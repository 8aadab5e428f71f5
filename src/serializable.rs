//! Text adapter for storing optional digests in serde formats.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::algorithm::Digest;
use crate::decoder;
use crate::error::{Error, Result};

/// An optional digest that serializes as its encoded string.
///
/// The empty string stands for `None` in both directions. Deserializing goes
/// through the [`global`](crate::decoder::global) default registry.
#[derive(Debug, Default)]
pub struct SerializableDigest(pub Option<Box<dyn Digest>>);

impl SerializableDigest {
    pub fn new(digest: Box<dyn Digest>) -> Self {
        Self(Some(digest))
    }

    pub fn digest(&self) -> Option<&dyn Digest> {
        self.0.as_deref()
    }

    pub fn into_inner(self) -> Option<Box<dyn Digest>> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// A missing digest never matches.
    pub fn matches(&self, password: &str) -> bool {
        self.0.as_ref().is_some_and(|d| d.matches(password))
    }
}

impl From<Box<dyn Digest>> for SerializableDigest {
    fn from(digest: Box<dyn Digest>) -> Self {
        Self::new(digest)
    }
}

impl FromStr for SerializableDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self(None));
        }

        Ok(Self(Some(decoder::decode(s)?)))
    }
}

impl fmt::Display for SerializableDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(digest) => f.write_str(&digest.encode()),
            None => Ok(()),
        }
    }
}

impl Serialize for SerializableDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SerializableDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DigestVisitor;

        impl Visitor<'_> for DigestVisitor {
            type Value = SerializableDigest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an encoded password digest or an empty string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DigestVisitor)
    }
}
