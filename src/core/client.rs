use crate::core::session_cache::SessionCache;
use crate::core::translator;
use crate::core::{Card, Clock, GameGateway, GameSession, KeyValueStore, PlayRequest, PlayResult};
use crate::utils::error::{GameError, Result};
use std::collections::HashSet;
use tokio::sync::watch;

/// Ties the cache, translator and gateway together for the UI.
pub struct GameClient<G: GameGateway, S: KeyValueStore, C: Clock + Clone> {
    gateway: G,
    cache: SessionCache<S, C>,
    clock: C,
    user_id: String,
}

impl<G: GameGateway, S: KeyValueStore, C: Clock + Clone> GameClient<G, S, C> {
    pub fn new(gateway: G, storage: S, clock: C) -> Self {
        Self {
            gateway,
            cache: SessionCache::new(storage, clock.clone()),
            clock,
            user_id: String::new(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Today's session, from the cache when possible.
    pub async fn today(&mut self) -> Result<GameSession> {
        if let Some(session) = self.cache.read() {
            tracing::info!("Using cached game {}", session.id());
            return Ok(session);
        }
        self.refresh().await
    }

    /// Fetches a new session and caches it.
    ///
    /// A transport failure leaves the cache untouched; a malformed response
    /// invalidates it.
    pub async fn refresh(&mut self) -> Result<GameSession> {
        let now = self.clock.now();
        let request = translator::fetch_request(&now, &self.user_id);

        tracing::info!("Fetching a new game");
        let raw = self.gateway.fetch_game(&request).await?;

        match translator::session_from_wire(&raw, now.timestamp_millis()) {
            Ok(session) => {
                tracing::info!(
                    "Fetched game {} with {} cards",
                    session.id(),
                    session.cards().len()
                );
                self.cache.write(session.clone());
                Ok(session)
            }
            Err(e) => {
                tracing::error!("Discarding cached game after bad response: {}", e);
                self.cache.invalidate();
                Err(e)
            }
        }
    }

    /// Plays the cards with the given ids, in order, from `session`'s pool.
    pub async fn play(
        &self,
        session: &GameSession,
        card_ids: &[String],
        elapsed_secs: f64,
    ) -> Result<PlayResult> {
        let hand = resolve_hand(session, card_ids)?;
        let request = PlayRequest {
            session_id: session.id().to_string(),
            hand,
            elapsed_secs,
            timestamp_ms: self.clock.now().timestamp_millis(),
        };
        self.play_hand(&request).await
    }

    /// Invalid requests fail here, before anything is sent.
    pub async fn play_hand(&self, request: &PlayRequest) -> Result<PlayResult> {
        let wire = translator::play_request_to_wire(request)?;
        tracing::info!(
            "Playing {} cards for game {}",
            wire.hand.cards.len(),
            wire.game_id
        );

        let response = self.gateway.play_hand(&wire).await;
        Ok(translator::play_result(response))
    }

    pub fn reset(&mut self) {
        tracing::info!("Clearing cached game");
        self.cache.invalidate();
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GameSession>> {
        self.cache.subscribe()
    }

    pub fn cache_mut(&mut self) -> &mut SessionCache<S, C> {
        &mut self.cache
    }
}

fn resolve_hand(session: &GameSession, card_ids: &[String]) -> Result<Vec<Card>> {
    let mut used = HashSet::new();
    card_ids
        .iter()
        .map(|id| {
            if !used.insert(id.as_str()) {
                return Err(GameError::invalid_request(format!(
                    "card '{}' is played more than once",
                    id
                )));
            }
            session.card(id).cloned().ok_or_else(|| {
                GameError::invalid_request(format!(
                    "card '{}' is not in game {}",
                    id,
                    session.id()
                ))
            })
        })
        .collect()
}
