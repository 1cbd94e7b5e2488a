use crate::domain::wire::{GetGameRequest, RawGameResponse, RawPlayResponse, WirePlayRequest};
use crate::utils::error::{Result, TransportError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Synchronous, best-effort string storage (one value per key).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[async_trait]
pub trait GameGateway: Send + Sync {
    async fn fetch_game(
        &self,
        request: &GetGameRequest,
    ) -> std::result::Result<RawGameResponse, TransportError>;

    async fn play_hand(
        &self,
        request: &WirePlayRequest,
    ) -> std::result::Result<RawPlayResponse, TransportError>;
}
