//! # Key-Value Cache Boundary
//!
//! The cache protocol the core relies on: GET / SET-with-expiry / DEL / atomic
//! INCR and hash-field access for grouped scalar projections. The cache is a
//! disposable projection of the Record Store; absence in cache is never
//! authoritative, and no concrete cache product is mandated here.

pub mod keys;
pub mod memory;

pub use memory::MemoryCache;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// TTL-capable string-keyed cache. Not transactional across keys; all
/// mutations used by the core are idempotent overwrites or atomic increments.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// GET key -> value | absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SET key value with expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// DEL key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomic INCR; missing keys start from zero. Returns the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// HGETALL key -> field map, empty when absent.
    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// HSET every field of `fields` under one logical entity key, with expiry.
    async fn hset_all(
        &self,
        key: &str,
        fields: HashMap<String, String>,
        ttl: Duration,
    ) -> Result<()>;

    /// Reset the TTL of an existing key. Returns false when the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
