use crate::core::{Card, GameSession, PlayOutcome, PlayRequest, PlayResult};
use crate::domain::wire::{
    GetGameRequest, RawGameResponse, RawPlayResponse, WireCard, WireCardType, WireHand,
    WirePlayRequest, WireTimestamp,
};
use crate::utils::error::{GameError, Result, TransportError};
use crate::utils::validation::validate_elapsed_secs;
use chrono::{DateTime, TimeZone};
use serde_json::Value;

pub const DEFAULT_PLAY_FAILURE: &str = "Failed to play hand";

/// `GetGame` request for the given moment. Sub-second precision is dropped.
pub fn fetch_request<Tz: TimeZone>(now: &DateTime<Tz>, user_id: &str) -> GetGameRequest {
    GetGameRequest {
        timestamp: WireTimestamp::from_epoch_seconds(now.timestamp()),
        user_id: user_id.to_string(),
    }
}

/// Turns a `GetGame` response into a session, re-deriving every card type.
///
/// `received_at_ms` stands in for the creation time when the engine omits it.
pub fn session_from_wire(raw: &RawGameResponse, received_at_ms: i64) -> Result<GameSession> {
    let game = raw
        .0
        .get("game")
        .filter(|game| game.is_object())
        .ok_or_else(|| GameError::malformed("response has no game"))?;

    let pool = game
        .get("pool")
        .and_then(|pool| pool.get("cards"))
        .and_then(Value::as_array)
        .ok_or_else(|| GameError::malformed("game pool is missing or not a list of cards"))?;

    let cards = pool
        .iter()
        .enumerate()
        .map(|(index, card)| card_from_json(index, card))
        .collect::<Result<Vec<_>>>()?;

    // A session without an id could never be played.
    let id = game
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GameError::malformed("game has no id"))?
        .to_string();

    let created_at = game
        .get("timestamp")
        .and_then(timestamp_millis)
        .unwrap_or(received_at_ms);

    tracing::debug!("Translated game {} with {} cards", id, cards.len());
    GameSession::new(id, cards, created_at)
}

fn card_from_json(index: usize, raw: &Value) -> Result<Card> {
    let value = match raw.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(GameError::malformed(format!(
                "card {} has no value",
                index
            )))
        }
    };

    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default_card_id(index));

    // 忽略 wire 上的 type，一律由 value 重新判定
    Ok(Card::new(id, value))
}

fn default_card_id(index: usize) -> String {
    format!("card-{}", index)
}

// Timestamps come as {seconds, nanos} objects or as RFC 3339 strings.
fn timestamp_millis(raw: &Value) -> Option<i64> {
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        Value::Object(_) => serde_json::from_value::<WireTimestamp>(raw.clone())
            .ok()
            .and_then(|ts| ts.to_epoch_millis()),
        _ => None,
    }
}

pub fn card_to_wire(card: &Card) -> WireCard {
    WireCard {
        id: None,
        value: card.value().to_string(),
        card_type: WireCardType::from(card.card_type()),
    }
}

/// Builds the `PlayHand` message. Nothing is sent when this fails.
pub fn play_request_to_wire(request: &PlayRequest) -> Result<WirePlayRequest> {
    if request.hand.is_empty() {
        return Err(GameError::invalid_request("hand has no cards"));
    }
    if request.session_id.is_empty() {
        return Err(GameError::invalid_request("missing game id"));
    }
    validate_elapsed_secs("elapsed_secs", request.elapsed_secs)?;

    let cards = request.hand.iter().map(card_to_wire).collect();

    Ok(WirePlayRequest {
        game_id: request.session_id.clone(),
        timestamp: WireTimestamp::from_epoch_millis(request.timestamp_ms),
        hand: WireHand {
            cards,
            game_id: request.session_id.clone(),
        },
        secs_elapsed: request.elapsed_secs,
    })
}

pub fn play_result(response: std::result::Result<RawPlayResponse, TransportError>) -> PlayResult {
    match response {
        Ok(raw) => PlayResult::Scored(PlayOutcome {
            play_order: raw
                .play_order
                .into_iter()
                .enumerate()
                .map(|(index, card)| {
                    Card::new(card.id.unwrap_or_else(|| default_card_id(index)), card.value)
                })
                .collect(),
            score_counter: raw.score_counter,
        }),
        Err(err) => {
            tracing::warn!("PlayHand failed: {}", err);
            let message = if err.message.trim().is_empty() {
                DEFAULT_PLAY_FAILURE.to_string()
            } else {
                err.message
            };
            PlayResult::Failed { message }
        }
    }
}
