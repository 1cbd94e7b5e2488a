use crate::core::{Clock, GameSession, KeyValueStore};
use crate::utils::error::Result;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub const CACHE_KEY: &str = "cachedGame";

/// Session plus the moment it was stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedEnvelope {
    game: GameSession,
    timestamp: i64,
}

/// Whether `stored_ms` falls on the same calendar day as `now`, in `now`'s zone.
pub fn same_calendar_day<Tz: TimeZone>(stored_ms: i64, now: &DateTime<Tz>) -> bool {
    now.timezone()
        .timestamp_millis_opt(stored_ms)
        .single()
        .map(|stored| stored.date_naive() == now.date_naive())
        .unwrap_or(false)
}

/// Today's game session, kept in memory and in persistent storage.
///
/// A stored session is only served on the local calendar day it was written.
/// Storage failures never surface: reads degrade to a miss and writes still
/// update the in-memory view, which `read` falls back to.
pub struct SessionCache<S: KeyValueStore, C: Clock> {
    storage: S,
    clock: C,
    memory: Option<CachedEnvelope>,
    changes: watch::Sender<Option<GameSession>>,
}

impl<S: KeyValueStore, C: Clock> SessionCache<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        let (changes, _) = watch::channel(None);
        let mut cache = Self {
            storage,
            clock,
            memory: None,
            changes,
        };
        cache.read();
        cache
    }

    pub fn read(&mut self) -> Option<GameSession> {
        let persisted = match self.load_persisted() {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Cache read failed, using in-memory session: {}", e);
                None
            }
        };

        // A failed write can leave an older envelope in storage.
        let candidate = match (persisted, self.memory.clone()) {
            (Some(stored), Some(memory)) if memory.timestamp >= stored.timestamp => Some(memory),
            (Some(stored), _) => Some(stored),
            (None, memory) => memory,
        };

        let now = self.clock.now();
        match candidate {
            Some(envelope) if same_calendar_day(envelope.timestamp, &now) => {
                tracing::debug!("Cache hit for game {}", envelope.game.id());
                let game = envelope.game.clone();
                self.memory = Some(envelope);
                self.publish(Some(game.clone()));
                Some(game)
            }
            Some(envelope) => {
                tracing::info!(
                    "Cached game {} is from a previous day, discarding",
                    envelope.game.id()
                );
                self.memory = None;
                self.publish(None);
                None
            }
            None => {
                tracing::debug!("Cache miss");
                None
            }
        }
    }

    pub fn write(&mut self, session: GameSession) {
        let envelope = CachedEnvelope {
            game: session,
            timestamp: self.clock.now().timestamp_millis(),
        };

        match serde_json::to_string(&envelope) {
            Ok(json) => {
                if let Err(e) = self.storage.set(CACHE_KEY, &json) {
                    tracing::warn!("Failed to persist game {}: {}", envelope.game.id(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize game {}: {}", envelope.game.id(), e),
        }

        let game = envelope.game.clone();
        self.memory = Some(envelope);
        self.publish(Some(game));
    }

    pub fn invalidate(&mut self) {
        if let Err(e) = self.storage.remove(CACHE_KEY) {
            tracing::warn!("Failed to remove cached game: {}", e);
        }
        self.memory = None;
        self.publish(None);
    }

    /// In-memory view without the day check
    pub fn current(&self) -> Option<&GameSession> {
        self.memory.as_ref().map(|envelope| &envelope.game)
    }

    pub fn needs_new_game(&mut self) -> bool {
        self.read().is_none()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GameSession>> {
        self.changes.subscribe()
    }

    // Ok(None) covers both "never stored" and "unparseable".
    fn load_persisted(&self) -> Result<Option<CachedEnvelope>> {
        let Some(raw) = self.storage.get(CACHE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<CachedEnvelope>(&raw) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached game: {}", e);
                Ok(None)
            }
        }
    }

    fn publish(&self, next: Option<GameSession>) {
        self.changes.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Card;
    use crate::utils::error::GameError;
    use chrono::{Duration, FixedOffset, Local};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockStore {
        values: Arc<Mutex<HashMap<String, String>>>,
        broken: Arc<Mutex<bool>>,
        writes_fail: Arc<Mutex<bool>>,
    }

    impl MockStore {
        fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn put_raw(&self, key: &str, value: &str) {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn set_broken(&self, broken: bool) {
            *self.broken.lock().unwrap() = broken;
        }

        fn set_writes_fail(&self, fail: bool) {
            *self.writes_fail.lock().unwrap() = fail;
        }

        fn check(&self) -> Result<()> {
            if *self.broken.lock().unwrap() {
                Err(GameError::persistence("storage disabled"))
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for MockStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.check()?;
            Ok(self.raw(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check()?;
            if *self.writes_fail.lock().unwrap() {
                return Err(GameError::persistence("quota exceeded"));
            }
            self.put_raw(key, value);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check()?;
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Clone)]
    struct MockClock {
        now: Arc<Mutex<DateTime<Local>>>,
    }

    impl MockClock {
        fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Self {
            Self {
                now: Arc::new(Mutex::new(local(y, m, d, h, min, s))),
            }
        }

        fn set(&self, now: DateTime<Local>) {
            *self.now.lock().unwrap() = now;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn session() -> GameSession {
        GameSession::new(
            "g1",
            vec![Card::new("a", "3"), Card::new("b", "+")],
            1_704_067_200_000,
        )
        .unwrap()
    }

    #[test]
    fn test_same_calendar_day_ignores_elapsed_time() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let stored = tz.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let late = tz.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap();
        let next = tz.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        assert!(same_calendar_day(stored.timestamp_millis(), &late));
        assert!(!same_calendar_day(late.timestamp_millis(), &next));
        // 同一組時刻在 UTC 同一天，在東京卻跨日
        let afternoon = tz.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
        let evening = tz.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert!(same_calendar_day(afternoon.timestamp_millis(), &evening));
        assert!(!same_calendar_day(
            afternoon.timestamp_millis(),
            &evening.with_timezone(&tokyo)
        ));
    }

    #[test]
    fn test_served_until_local_midnight() {
        let store = MockStore::default();
        let clock = MockClock::at(2024, 1, 1, 23, 59, 0);
        let mut cache = SessionCache::new(store.clone(), clock.clone());

        cache.write(session());

        clock.set(local(2024, 1, 1, 23, 59, 59));
        let cached = cache.read().unwrap();
        assert_eq!(cached, session());
        assert_eq!(cached.cards()[1].card_type(), crate::core::CardType::Operator);

        clock.set(local(2024, 1, 2, 0, 0, 1));
        assert!(cache.read().is_none());
        assert!(cache.current().is_none());
    }

    #[test]
    fn test_not_served_on_a_later_day_even_if_recent() {
        let store = MockStore::default();
        let clock = MockClock::at(2024, 3, 10, 23, 59, 59);
        let mut cache = SessionCache::new(store, clock.clone());

        cache.write(session());
        clock.set(clock.now() + Duration::seconds(2));
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_restored_from_storage_on_startup() {
        let store = MockStore::default();
        let clock = MockClock::at(2024, 1, 1, 8, 0, 0);
        SessionCache::new(store.clone(), clock.clone()).write(session());

        clock.set(local(2024, 1, 1, 20, 0, 0));
        let mut restarted = SessionCache::new(store.clone(), clock.clone());
        assert_eq!(restarted.current(), Some(&session()));
        assert_eq!(restarted.read(), Some(session()));

        clock.set(local(2024, 1, 2, 8, 0, 0));
        let restarted = SessionCache::new(store, clock);
        assert!(restarted.current().is_none());
    }

    #[test]
    fn test_invalidate_then_read() {
        let store = MockStore::default();
        let mut cache = SessionCache::new(store.clone(), MockClock::at(2024, 1, 1, 12, 0, 0));

        cache.write(session());
        cache.invalidate();

        assert!(cache.read().is_none());
        assert!(store.raw(CACHE_KEY).is_none());
    }

    #[test]
    fn test_write_overwrites() {
        let store = MockStore::default();
        let mut cache = SessionCache::new(store, MockClock::at(2024, 1, 1, 12, 0, 0));

        cache.write(session());
        let other = GameSession::new("g2", vec![Card::new("c", "9")], 0).unwrap();
        cache.write(other.clone());
        assert_eq!(cache.read(), Some(other));
    }

    #[test]
    fn test_unreadable_envelope_is_a_miss() {
        let store = MockStore::default();
        store.put_raw(CACHE_KEY, "{not json");
        let mut cache = SessionCache::new(store.clone(), MockClock::at(2024, 1, 1, 12, 0, 0));
        assert!(cache.read().is_none());

        store.put_raw(CACHE_KEY, r#"{"game": {"id": "g1"}, "timestamp": 0}"#);
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_stored_type_tags_are_rederived() {
        let clock = MockClock::at(2024, 1, 1, 12, 0, 0);
        let store = MockStore::default();
        let envelope = serde_json::json!({
            "game": {
                "id": "g1",
                "cards": [{"id": "b", "type": "number", "value": "+"}],
                "createdAt": 0
            },
            "timestamp": clock.now().timestamp_millis()
        });
        store.put_raw(CACHE_KEY, &envelope.to_string());

        let mut cache = SessionCache::new(store, clock);
        let game = cache.read().unwrap();
        assert!(game.card("b").unwrap().is_operator());
    }

    #[test]
    fn test_storage_unavailable() {
        let store = MockStore::default();
        store.set_broken(true);
        let clock = MockClock::at(2024, 1, 1, 12, 0, 0);
        let mut cache = SessionCache::new(store.clone(), clock.clone());

        assert!(cache.read().is_none());

        // 寫入失敗時仍保留記憶體中的 session
        cache.write(session());
        assert_eq!(cache.read(), Some(session()));

        clock.set(local(2024, 1, 2, 12, 0, 0));
        assert!(cache.read().is_none());

        cache.write(session());
        cache.invalidate();
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_failed_write_over_older_envelope() {
        let store = MockStore::default();
        let clock = MockClock::at(2024, 1, 1, 12, 0, 0);
        let mut cache = SessionCache::new(store.clone(), clock.clone());
        cache.write(session());

        clock.set(local(2024, 1, 2, 9, 0, 0));
        store.set_writes_fail(true);
        let today = GameSession::new("today", vec![Card::new("c", "7")], 0).unwrap();
        cache.write(today.clone());

        // 舊的 envelope 仍在 storage，但記憶體中的 session 較新
        assert!(store.raw(CACHE_KEY).is_some());
        assert_eq!(cache.read(), Some(today.clone()));
        assert_eq!(cache.read(), Some(today.clone()));

        let other = GameSession::new("other", vec![Card::new("d", "2")], 0).unwrap();
        cache.write(other.clone());
        assert_eq!(cache.read(), Some(other));

        clock.set(local(2024, 1, 3, 9, 0, 0));
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut cache = SessionCache::new(MockStore::default(), MockClock::at(2024, 1, 1, 12, 0, 0));
        let mut rx = cache.subscribe();
        assert!(rx.borrow().is_none());

        cache.write(session());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&session()));

        // 重複讀取相同 session 不會觸發通知
        cache.read();
        assert!(!rx.has_changed().unwrap());

        cache.invalidate();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
        assert!(cache.needs_new_game());
    }
}
