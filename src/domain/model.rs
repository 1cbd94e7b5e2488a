use crate::domain::classifier::classify;
use crate::utils::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Number,
    Operator,
}

/// A card whose type always agrees with its value.
///
/// Deserialization goes through [`CardRecord`] so a stored or received `type`
/// field never survives; the type is re-derived from `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CardRecord")]
pub struct Card {
    id: String,
    #[serde(rename = "type")]
    card_type: CardType,
    value: String,
}

#[derive(Deserialize)]
struct CardRecord {
    id: String,
    value: String,
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        Card::new(record.id, record.value)
    }
}

impl Card {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: id.into(),
            card_type: classify(&value),
            value,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn is_operator(&self) -> bool {
        self.card_type == CardType::Operator
    }
}

/// One day's game: the pool of cards handed out by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SessionRecord")]
pub struct GameSession {
    id: String,
    cards: Vec<Card>,
    created_at: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    id: String,
    cards: Vec<Card>,
    created_at: i64,
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = GameError;

    fn try_from(record: SessionRecord) -> Result<Self> {
        GameSession::new(record.id, record.cards, record.created_at)
    }
}

impl GameSession {
    /// Builds a session, rejecting a pool with repeated card ids.
    pub fn new(id: impl Into<String>, cards: Vec<Card>, created_at: i64) -> Result<Self> {
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id()) {
                return Err(GameError::malformed(format!(
                    "duplicate card id '{}' in pool",
                    card.id()
                )));
            }
        }

        Ok(Self {
            id: id.into(),
            cards,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Epoch milliseconds at which the engine created the game
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }
}

/// A hand to be scored. Built per play action and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub session_id: String,
    pub hand: Vec<Card>,
    pub elapsed_secs: f64,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOutcome {
    pub play_order: Vec<Card>,
    pub score_counter: Vec<f64>,
}

impl PlayOutcome {
    /// 最後一個計分即為本手牌的得分
    pub fn final_score(&self) -> Option<f64> {
        self.score_counter.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlayResult {
    Scored(PlayOutcome),
    Failed {
        #[serde(rename = "error")]
        message: String,
    },
}

impl PlayResult {
    pub fn is_scored(&self) -> bool {
        matches!(self, PlayResult::Scored(_))
    }

    pub fn outcome(&self) -> Option<&PlayOutcome> {
        match self {
            PlayResult::Scored(outcome) => Some(outcome),
            PlayResult::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            PlayResult::Scored(_) => None,
            PlayResult::Failed { message } => Some(message),
        }
    }
}

/// Error payload handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&GameError> for ErrorBody {
    fn from(err: &GameError) -> Self {
        let body = ErrorBody::new(err.user_friendly_message());
        match err {
            GameError::Transport(transport) => {
                let mut parts = Vec::new();
                if let Some(status) = transport.status {
                    parts.push(format!("status {}", status));
                }
                if let Some(code) = &transport.code {
                    parts.push(format!("code {}", code));
                }
                if parts.is_empty() {
                    body
                } else {
                    body.with_details(parts.join(", "))
                }
            }
            // The message already says everything for local errors.
            _ => body,
        }
    }
}
