//! Cache Key Derivation
//!
//! Maps an upstream API method plus its parameters to a short, deterministic
//! cache key. Parameter order never matters; long keys are replaced by a
//! SHA-256 digest so key size stays bounded.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// Keys longer than this many characters are hashed.
pub const MAX_READABLE_KEY_LEN: usize = 100;

/// Number of digest bytes kept in a hashed key.
pub const DIGEST_BYTES: usize = 16;

// == Key Params ==
/// Named request parameters, kept sorted by name.
///
/// Values are stored in their canonical `Display` form. Setting a name twice
/// keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyParams {
    params: BTreeMap<String, String>,
}

impl KeyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push(name, value);
        self
    }

    /// Adds a parameter in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.params.insert(name.into(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for KeyParams
where
    N: Into<String>,
    V: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = KeyParams::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

// == Derive Key ==
/// Builds the cache key for `method` called with `params`.
///
/// The readable form is `method|name:value|name:value...` in name order. If
/// it exceeds [`MAX_READABLE_KEY_LEN`] characters, the key becomes `method|<hex>` where
/// `<hex>` is the first [`DIGEST_BYTES`] of the SHA-256 of the readable form.
///
/// # Example
/// ```
/// use scrobble_cache::cache::{derive_key, KeyParams};
///
/// let a = derive_key("user.getinfo", &KeyParams::new().with("user", "a").with("limit", 5));
/// let b = derive_key("user.getinfo", &KeyParams::new().with("limit", 5).with("user", "a"));
/// assert_eq!(a, b);
/// assert_eq!(a, "user.getinfo|limit:5|user:a");
/// ```
pub fn derive_key(method: &str, params: &KeyParams) -> String {
    let mut key = String::from(method);
    for (name, value) in params.iter() {
        key.push('|');
        key.push_str(name);
        key.push(':');
        key.push_str(value);
    }

    if key.chars().count() <= MAX_READABLE_KEY_LEN {
        return key;
    }

    let digest = Sha256::digest(key.as_bytes());
    format!("{}|{}", method, hex::encode(&digest[..DIGEST_BYTES]))
}
