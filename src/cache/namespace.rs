//! Key Namespace Module
//!
//! Derives the physical store keys of one cache engine from its identity.

use std::fmt;

use tracing::debug;

use crate::error::{CacheError, Result};

// == Delimiters ==
/// Reserved sequence joining an identity to a logical key.
pub const PREFIX_DELIMITER: &[u8] = b"::";

const VALUE_PREFIX: &[u8] = b"lru-value:";
const ACCESS_PREFIX: &[u8] = b"lru-access:";
const STAT_PREFIX: &[u8] = b"lru-stat:";

fn contains_delimiter(bytes: &[u8]) -> bool {
    bytes.windows(PREFIX_DELIMITER.len()).any(|w| w == PREFIX_DELIMITER)
}

// == Identity ==
/// The byte string naming one engine's keyspace.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity(Vec<u8>);

impl Identity {
    /// Validates and wraps an identity.
    ///
    /// Fails when the bytes contain the reserved `::` sequence or end in `:`.
    /// Either would let the delimiter shift, so two identities could map to
    /// the same physical keys.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        if contains_delimiter(bytes) {
            return Err(CacheError::Configuration(format!(
                "Invalid identity {:?}: must not contain {:?}",
                String::from_utf8_lossy(bytes),
                String::from_utf8_lossy(PREFIX_DELIMITER)
            )));
        }
        if bytes.ends_with(&PREFIX_DELIMITER[..1]) {
            return Err(CacheError::Configuration(format!(
                "Invalid identity {:?}: must not end with ':'",
                String::from_utf8_lossy(bytes)
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Identity of a callable declared at `scope` (a module path) under
    /// `name`, e.g. `("app::users", "load")` becomes `app:users:load`.
    pub fn for_callable(scope: &str, name: &str) -> Result<Self> {
        let joined = [scope, name]
            .iter()
            .map(|part| part.replace("::", ":"))
            .collect::<Vec<_>>()
            .join(":");
        Self::new(joined)
    }

    /// A fresh identity that no other engine shares.
    pub fn random() -> Self {
        let identity = Self(format!("{:032x}", rand::random::<u128>()).into_bytes());
        debug!("Generated identity: {}", identity);
        identity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?})", String::from_utf8_lossy(&self.0))
    }
}

// == Key Namespacer ==
/// Builds the entry, tracker and stat keys scoped to one identity.
#[derive(Debug, Clone)]
pub struct KeyNamespacer {
    identity: Identity,
    entry_prefix: Vec<u8>,
    access_key: Vec<u8>,
    stat_key: Vec<u8>,
}

impl KeyNamespacer {
    pub fn new(identity: Identity) -> Self {
        let entry_prefix = [VALUE_PREFIX, identity.as_bytes(), PREFIX_DELIMITER].concat();
        let access_key = [ACCESS_PREFIX, identity.as_bytes()].concat();
        let stat_key = [STAT_PREFIX, identity.as_bytes()].concat();
        Self {
            identity,
            entry_prefix,
            access_key,
            stat_key,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `lru-value:<identity>::<logical-key>`
    pub fn entry_key(&self, logical_key: &str) -> Vec<u8> {
        [self.entry_prefix.as_slice(), logical_key.as_bytes()].concat()
    }

    /// `lru-access:<identity>`
    pub fn access_key(&self) -> &[u8] {
        &self.access_key
    }

    /// `lru-stat:<identity>`
    pub fn stat_key(&self) -> &[u8] {
        &self.stat_key
    }

    /// Recovers the logical key from one of this namespace's entry keys.
    /// Returns None for keys outside the namespace.
    pub fn logical_key(&self, physical: &[u8]) -> Option<String> {
        physical
            .strip_prefix(self.entry_prefix.as_slice())
            .map(|key| String::from_utf8_lossy(key).into_owned())
    }
}
