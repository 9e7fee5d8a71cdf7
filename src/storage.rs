//! Best-score and ad-obligation persistence
//!
//! The persisted surface is three scalar key/value pairs: the best score, an
//! ad-obligation flag, and its absolute deadline in epoch milliseconds. The
//! flag and deadline are owned by the host's ad flow; the core only sets or
//! clears them on game end and refuses restarts while the flag is pending.

use std::collections::HashMap;

/// Best score key
pub const BEST_SCORE_KEY: &str = "pomelo-best-score";
/// Ad-obligation flag key ("1" while an ad view is owed)
pub const AD_PENDING_KEY: &str = "pomelo-ad-pending";
/// Ad countdown deadline key (epoch ms)
pub const AD_DEADLINE_KEY: &str = "pomelo-ad-end";

/// Scalar key/value storage
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory storage for native targets and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable, scores will not persist");
        }
        Self { inner }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = self.inner.as_ref() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = self.inner.as_ref() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Read the persisted best score; unparseable values read as zero
pub fn load_best_score(storage: &dyn Storage) -> u64 {
    storage
        .get(BEST_SCORE_KEY)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0)
}

pub fn store_best_score(storage: &mut dyn Storage, best: u64) {
    storage.set(BEST_SCORE_KEY, &best.to_string());
    log::debug!("best score persisted: {best}");
}

/// Whether an ad view is still owed
pub fn ad_pending(storage: &dyn Storage) -> bool {
    storage.get(AD_PENDING_KEY).is_some()
}

/// The persisted ad countdown deadline, if it is still in the future
pub fn ad_deadline(storage: &dyn Storage, now_ms: f64) -> Option<f64> {
    storage
        .get(AD_DEADLINE_KEY)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|deadline| *deadline > now_ms)
}

/// Flag an owed ad view and drop any stale countdown
pub fn set_ad_pending(storage: &mut dyn Storage) {
    storage.set(AD_PENDING_KEY, "1");
    storage.remove(AD_DEADLINE_KEY);
}

/// Clear the obligation entirely (ad finished, or a win)
pub fn clear_ad_obligation(storage: &mut dyn Storage) {
    storage.remove(AD_PENDING_KEY);
    storage.remove(AD_DEADLINE_KEY);
}
