use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct Entry<T> {
    value: T,
    expires: Instant,
}

/// In-process TTL cache. Expired entries are dropped lazily on the next
/// `get` for their key.
pub struct MemoryCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    default_ttl: Duration,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) {
        let entry = Entry {
            value,
            expires: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn value_is_retrievable_before_ttl_and_absent_after() {
        let cache: MemoryCache<String> = MemoryCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", "v".to_string(), Duration::from_millis(10));

        assert_eq!(cache.get("k"), Some("v".to_string()));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn set_overwrites_and_refreshes_the_entry() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_millis(50));
        cache.set("k", 1);
        cache.set("k", 2);
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn remove_evicts_immediately() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", 1);
        cache.remove("k");
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn missing_key_returns_none() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("absent"), None);
    }
}
