//! In-process TTL cache built on a concurrent hash map.
//!
//! The default [`KeyValueCache`] backend: entries carry an absolute expiry
//! checked lazily on read, increments lock only the touched shard entry. A
//! networked cache implements the same trait for multi-process deployments.

use super::KeyValueCache;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Concurrent in-memory cache with per-entry TTL.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entry count, ignoring entries past their expiry.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                drop(self.entries.remove(key));
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.read(key) {
            Some(Value::Scalar(value)) => Some(value),
            _ => None,
        })
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::Scalar("0".to_string()),
            expires_at: None,
        });

        if entry.is_expired(now) {
            entry.value = Value::Scalar("0".to_string());
            entry.expires_at = None;
        }

        let current = match &entry.value {
            Value::Scalar(raw) => raw.parse::<i64>().unwrap_or(0),
            Value::Hash(_) => 0,
        };
        let next = current + 1;
        entry.value = Value::Scalar(next.to_string());
        Ok(next)
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        Ok(match self.read(key) {
            Some(Value::Hash(fields)) => fields,
            _ => HashMap::new(),
        })
    }

    async fn hset_all(
        &self,
        key: &str,
        fields: HashMap<String, String>,
        ttl: Duration,
    ) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Hash(fields),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
