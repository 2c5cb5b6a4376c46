// src/services/ttl_cache.rs

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_TTL: TimeDelta = TimeDelta::minutes(5);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

/// Um único valor com validade. Válido sse `now < expires_at`.
///
/// O lock nunca atravessa um `.await`: ler, gravar e limpar são seções
/// críticas curtas. Duas gravações concorrentes: vence a última.
#[derive(Debug)]
pub struct TtlSlot<T> {
    entry: Mutex<Option<Entry<T>>>,
}

impl<T> Default for TtlSlot<T> {
    fn default() -> Self {
        Self { entry: Mutex::new(None) }
    }
}

impl<T: Clone> TtlSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, now: DateTime<Utc>) -> Option<T> {
        let guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Grava com `expires_at = now + ttl` e devolve o instante de expiração.
    pub fn put(&self, value: T, now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
        let expires_at = now + ttl;
        self.put_until(value, expires_at);
        expires_at
    }

    pub fn put_until(&self, value: T, expires_at: DateTime<Utc>) {
        let mut guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Entry { value, expires_at });
    }

    pub fn clear(&self) {
        let mut guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}
