use bytes::Bytes;
use num_traits::CheckedAdd;
use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::Notify;
use tokio::time::{sleep_until, Duration, Instant};

/// Key-value pairs with optional time-to-live, backing [`MemoryClient`](crate::memory::MemoryClient).
/// Expired keys are invisible to reads and removed by a background task, so a store must be
/// created inside a tokio runtime. Clones share the same data. The task stops once the last
/// clone is dropped.
#[derive(Clone)]
pub struct Store {
    pub(crate) inner: Arc<InnerStore>,
}

impl Store {
    pub fn new() -> Store {
        let state = State {
            keys: HashMap::new(),
            ttls: BTreeSet::new(),
        };

        let inner = Arc::new(InnerStore {
            state: Mutex::new(state),
            waker: Arc::new(Notify::new()),
        });

        tokio::spawn({
            let store = Arc::downgrade(&inner);
            let waker = inner.waker.clone();
            async move { remove_expired_keys(store, waker).await }
        });

        Self { inner }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// The instant `ttl` from now, or `None` when it cannot be represented.
pub fn deadline(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

pub struct InnerStore {
    state: Mutex<State>,
    waker: Arc<Notify>,
}

impl Drop for InnerStore {
    fn drop(&mut self) {
        // Lets the purge task observe that the store is gone.
        self.waker.notify_one();
    }
}

pub struct InnerStoreLocked<'a> {
    state: MutexGuard<'a, State>,
    waker: &'a Notify,
}

/// Why an increment could not be applied.
#[derive(Debug, PartialEq)]
pub enum IncrError {
    NotANumber,
    Overflow,
}

impl<'a> InnerStoreLocked<'a> {
    /// Stores `data`, discarding any previous time to live.
    pub fn set(&mut self, key: String, data: Bytes) {
        self.insert(key, data, None);
    }

    /// Stores `data` until `expires_at`.
    pub fn set_until(&mut self, key: Key, data: Bytes, expires_at: Instant) {
        self.insert(key, data, Some(expires_at));
    }

    /// Replaces the data of a key, keeping its time to live if it has one.
    pub fn set_keep_ttl(&mut self, key: Key, data: Bytes) {
        let expires_at = self.live(&key).and_then(|v| v.expires_at);
        self.insert(key, data, expires_at);
    }

    fn insert(&mut self, key: Key, data: Bytes, expires_at: Option<Instant>) {
        self.clear_ttl(&key);

        if let Some(expires_at) = expires_at {
            self.state.ttls.insert((expires_at, key.clone()));
        }
        self.state.keys.insert(key.clone(), Value { data, expires_at });

        if let Some(expires_at) = expires_at {
            self.wake_if_next(expires_at, &key);
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.live(key).map(|v| v.data.clone())
    }

    /// Removes `key`, returning its value unless it had already expired.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.clear_ttl(key);
        let now = Instant::now();
        self.state
            .keys
            .remove(key)
            .filter(|value| !value.is_expired(now))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.live(key).is_some()
    }

    pub fn size(&self) -> usize {
        let now = Instant::now();
        self.state
            .keys
            .values()
            .filter(|value| !value.is_expired(now))
            .count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        let now = Instant::now();
        self.state
            .keys
            .iter()
            .filter(move |(_, value)| !value.is_expired(now))
            .map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.state.keys.clear();
        self.state.ttls.clear();
    }

    /// Sets the expiration of an existing key. Returns whether the key exists.
    pub fn expire_at(&mut self, key: &str, expires_at: Instant) -> bool {
        match self.get(key) {
            Some(data) => {
                self.set_until(key.to_string(), data, expires_at);
                true
            }
            None => false,
        }
    }

    /// Removes the time to live of `key`. Returns whether there was one.
    pub fn remove_ttl(&mut self, key: &str) -> bool {
        if !self.exists(key) {
            return false;
        }
        let had_ttl = self.clear_ttl(key);
        if let Some(value) = self.state.keys.get_mut(key) {
            value.expires_at = None;
        }
        had_ttl
    }

    /// `None` when the key is missing, `Some(None)` when it never expires.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        self.live(key).map(|value| {
            value
                .expires_at
                .map(|expires_at| expires_at.saturating_duration_since(now))
        })
    }

    pub fn incr_by<T>(&mut self, key: &str, increment: T) -> Result<T, IncrError>
    where
        T: FromStr + ToString + CheckedAdd + Default,
    {
        let value = match self.get(key) {
            Some(value) => std::str::from_utf8(value.as_ref())
                .ok()
                .and_then(|s| s.parse::<T>().ok())
                .ok_or(IncrError::NotANumber)?,
            None => T::default(),
        };

        let value = value.checked_add(&increment).ok_or(IncrError::Overflow)?;
        self.set_keep_ttl(key.to_string(), value.to_string().into());

        Ok(value)
    }

    pub fn remove_expired_keys(&mut self) -> Option<Instant> {
        let now = Instant::now();

        let expired_keys: Vec<(Instant, String)> = self
            .state
            .ttls
            .iter()
            .take_while(|(expires_at, _)| expires_at <= &now)
            .cloned()
            .collect();

        for (when, key) in expired_keys {
            self.state.keys.remove(&key);
            self.state.ttls.remove(&(when, key));
        }

        self.next_expiration()
    }

    fn live(&self, key: &str) -> Option<&Value> {
        let now = Instant::now();
        self.state
            .keys
            .get(key)
            .filter(|value| !value.is_expired(now))
    }

    fn next_expiration(&self) -> Option<Instant> {
        self.state
            .ttls
            .iter()
            .next()
            .map(|&(expires_at, _)| expires_at)
    }

    fn clear_ttl(&mut self, key: &str) -> bool {
        let expires_at = self.state.keys.get(key).and_then(|v| v.expires_at);
        match expires_at {
            Some(expires_at) => self.state.ttls.remove(&(expires_at, key.to_string())),
            None => false,
        }
    }

    fn wake_if_next(&self, expires_at: Instant, key: &str) {
        let next = self.state.ttls.iter().next();
        if next.map(|(when, k)| (*when, k.as_str())) == Some((expires_at, key)) {
            self.waker.notify_one();
        }
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InnerStore {
    pub fn lock(&self) -> InnerStoreLocked<'_> {
        let state = self.state.lock().unwrap();
        InnerStoreLocked {
            state,
            waker: &self.waker,
        }
    }
}

type Key = String;

pub struct Value {
    pub data: Bytes,
    pub expires_at: Option<Instant>,
}

impl Value {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

pub struct State {
    keys: HashMap<Key, Value>,
    ttls: BTreeSet<(Instant, Key)>,
}

async fn remove_expired_keys(store: Weak<InnerStore>, waker: Arc<Notify>) {
    loop {
        let Some(inner) = store.upgrade() else {
            break;
        };
        let next_expiration = inner.lock().remove_expired_keys();
        drop(inner);

        match next_expiration {
            Some(next_expiration) => {
                tokio::select! {
                    _ = sleep_until(next_expiration) => {}
                    _ = waker.notified() => {}
                }
            }
            None => waker.notified().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task;
    use tokio::time;

    fn secs(n: u64) -> Instant {
        deadline(Duration::from_secs(n)).unwrap()
    }

    #[tokio::test]
    async fn ttl() {
        time::pause();

        let store = Store::new();

        {
            let mut store = store.lock();
            store.set_until("key1".to_string(), Bytes::from("1"), secs(10));
            store.set_until("key2".to_string(), Bytes::from("2"), secs(20));
        }

        assert_eq!(store.lock().keys().count(), 2);

        time::advance(Duration::from_secs(10)).await;
        time::sleep(Duration::from_millis(1)).await;

        assert_eq!(store.lock().keys().count(), 1);
        assert!(store.lock().exists("key2"));

        time::advance(Duration::from_secs(20)).await;
        time::sleep(Duration::from_millis(1)).await;

        assert_eq!(store.lock().keys().count(), 0);
    }

    #[tokio::test]
    async fn expired_keys_are_hidden_before_the_purge() {
        let store = Store::new();
        let mut locked = store.lock();

        // The purge task only runs once this test yields, which it never does.
        locked.set_until("key".to_string(), Bytes::from("v"), Instant::now());
        locked.set("other".to_string(), Bytes::from("w"));

        assert_eq!(locked.get("key"), None);
        assert!(!locked.exists("key"));
        assert_eq!(locked.ttl("key"), None);
        assert!(!locked.expire_at("key", secs(10)));
        assert_eq!(locked.size(), 1);
        assert_eq!(locked.keys().collect::<Vec<_>>(), vec!["other"]);

        locked.set_keep_ttl("key".to_string(), Bytes::from("fresh"));
        assert_eq!(locked.ttl("key"), Some(None));
        assert_eq!(locked.get("key"), Some(Bytes::from("fresh")));
    }

    #[tokio::test]
    async fn removing_an_expired_key_returns_nothing() {
        let store = Store::new();
        let mut locked = store.lock();

        locked.set_until("key".to_string(), Bytes::from("v"), Instant::now());

        assert!(locked.remove("key").is_none());
        assert!(!locked.remove_ttl("key"));
    }

    #[tokio::test]
    async fn set_discards_previous_ttl() {
        time::pause();

        let store = Store::new();
        store
            .lock()
            .set_until("key".to_string(), Bytes::from("old"), secs(5));
        store.lock().set("key".to_string(), Bytes::from("new"));

        assert_eq!(store.lock().ttl("key"), Some(None));

        time::advance(Duration::from_secs(10)).await;
        time::sleep(Duration::from_millis(1)).await;

        assert_eq!(store.lock().get("key"), Some(Bytes::from("new")));
    }

    #[tokio::test]
    async fn incr_by() {
        let store = Store::new();
        let mut locked = store.lock();

        assert_eq!(locked.incr_by("n", 5i64), Ok(5));
        assert_eq!(locked.incr_by("n", -2i64), Ok(3));
        assert_eq!(locked.get("n"), Some(Bytes::from("3")));

        locked.set("s".to_string(), Bytes::from("abc"));
        assert_eq!(locked.incr_by("s", 1i64), Err(IncrError::NotANumber));

        locked.set("max".to_string(), Bytes::from(i64::MAX.to_string()));
        assert_eq!(locked.incr_by("max", 1i64), Err(IncrError::Overflow));
    }

    #[tokio::test]
    async fn remove_ttl() {
        let store = Store::new();
        let mut locked = store.lock();

        locked.set_until("k".to_string(), Bytes::from("v"), secs(5));
        assert!(locked.ttl("k").unwrap().is_some());

        assert!(locked.remove_ttl("k"));
        assert!(!locked.remove_ttl("k"));
        assert_eq!(locked.ttl("k"), Some(None));
        assert_eq!(locked.ttl("missing"), None);
    }

    #[test]
    fn unrepresentable_deadline() {
        assert!(deadline(Duration::MAX).is_none());
        assert!(deadline(Duration::from_secs(60)).is_some());
    }

    #[tokio::test]
    async fn dropping_the_store_stops_the_purge_task() {
        let store = Store::new();
        store
            .lock()
            .set_until("k".to_string(), Bytes::from("v"), secs(3600));

        let weak = Arc::downgrade(&store.inner);
        let waker = store.inner.waker.clone();
        assert_eq!(Arc::strong_count(&store.inner), 1);

        drop(store);
        assert!(weak.upgrade().is_none());

        for _ in 0..10 {
            if Arc::strong_count(&waker) == 1 {
                break;
            }
            task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&waker), 1);
    }
}
