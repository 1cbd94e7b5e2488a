use crate::core::KeyValueStore;

pub const DARK_MODE_KEY: &str = "darkMode";

/// Dark-mode flag. Lives under its own key and is unaffected by cache resets.
pub struct DisplayPreference<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> DisplayPreference<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn is_dark(&self) -> bool {
        match self.storage.get(DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("Failed to read display preference: {}", e);
                false
            }
        }
    }

    pub fn set_dark(&self, dark: bool) {
        let value = if dark { "true" } else { "false" };
        if let Err(e) = self.storage.set(DARK_MODE_KEY, value) {
            tracing::warn!("Failed to save display preference: {}", e);
        }
    }

    pub fn toggle(&self) -> bool {
        let dark = !self.is_dark();
        self.set_dark(dark);
        dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session_cache::{SessionCache, CACHE_KEY};
    use crate::core::{Card, GameSession, SystemClock};
    use crate::utils::error::{GameError, Result};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MockStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct DisabledStore;

    impl KeyValueStore for DisabledStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(GameError::persistence("disabled"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(GameError::persistence("disabled"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(GameError::persistence("disabled"))
        }
    }

    #[test]
    fn test_defaults_to_light() {
        let pref = DisplayPreference::new(MockStore::default());
        assert!(!pref.is_dark());
    }

    #[test]
    fn test_set_and_toggle() {
        let store = Arc::new(MockStore::default());
        let pref = DisplayPreference::new(store.clone());

        pref.set_dark(true);
        assert!(pref.is_dark());
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));

        assert!(!pref.toggle());
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_storage_failure_is_absorbed() {
        let pref = DisplayPreference::new(DisabledStore);
        pref.set_dark(true);
        assert!(!pref.is_dark());
    }

    #[test]
    fn test_independent_of_session_cache() {
        let store = Arc::new(MockStore::default());
        let pref = DisplayPreference::new(store.clone());
        let mut cache = SessionCache::new(store.clone(), SystemClock);

        pref.set_dark(true);
        cache.write(GameSession::new("g1", vec![Card::new("a", "1")], 0).unwrap());
        cache.invalidate();

        assert!(store.get(CACHE_KEY).unwrap().is_none());
        assert!(pref.is_dark());
    }
}
