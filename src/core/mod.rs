pub mod client;
pub mod gateway;
pub mod preference;
pub mod session_cache;
pub mod translator;

pub use crate::domain::model::{
    Card, CardType, ErrorBody, GameSession, PlayOutcome, PlayRequest, PlayResult,
};
pub use crate::domain::ports::{Clock, GameGateway, KeyValueStore, SystemClock};
pub use crate::utils::error::Result;
