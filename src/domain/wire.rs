//! Connect-JSON messages of `game_engine.v1.GameEngineService`.
//!
//! Field names follow the proto3 JSON mapping (camelCase, int64 as string).

use crate::domain::model::CardType;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WireCardType {
    #[default]
    #[serde(rename = "CARD_TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "CARD_TYPE_NUMBER")]
    Number,
    #[serde(rename = "CARD_TYPE_OPERATOR")]
    Operator,
}

impl From<CardType> for WireCardType {
    fn from(card_type: CardType) -> Self {
        match card_type {
            CardType::Number => WireCardType::Number,
            CardType::Operator => WireCardType::Operator,
        }
    }
}

// Enum values arrive either by name or by number; anything unknown is unspecified.
impl<'de> Deserialize<'de> for WireCardType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Name(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(1) => WireCardType::Number,
            Repr::Number(2) => WireCardType::Operator,
            Repr::Name(name) if name == "CARD_TYPE_NUMBER" => WireCardType::Number,
            Repr::Name(name) if name == "CARD_TYPE_OPERATOR" => WireCardType::Operator,
            _ => WireCardType::Unspecified,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
    #[serde(rename = "type", default)]
    pub card_type: WireCardType,
}

/// `google.protobuf.Timestamp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimestamp {
    #[serde(with = "int64_string")]
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl WireTimestamp {
    /// Whole seconds (floored) plus the sub-second remainder in nanoseconds.
    pub fn from_epoch_millis(millis: i64) -> Self {
        Self {
            seconds: millis.div_euclid(1000),
            nanos: (millis.rem_euclid(1000) * 1_000_000) as i32,
        }
    }

    pub fn from_epoch_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// `None` when the instant does not fit in epoch milliseconds.
    pub fn to_epoch_millis(&self) -> Option<i64> {
        self.seconds
            .checked_mul(1000)
            .and_then(|ms| ms.checked_add(i64::from(self.nanos / 1_000_000)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGameRequest {
    pub timestamp: WireTimestamp,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireHand {
    pub cards: Vec<WireCard>,
    pub game_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlayRequest {
    pub game_id: String,
    pub timestamp: WireTimestamp,
    pub hand: WireHand,
    pub secs_elapsed: f64,
}

/// Untyped `GetGame` body; its structure is checked by the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawGameResponse(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayResponse {
    #[serde(default)]
    pub play_order: Vec<WireCard>,
    #[serde(default)]
    pub score_counter: Vec<f64>,
}

mod int64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}
