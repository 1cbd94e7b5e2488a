pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::ClientConfig};

pub use crate::core::{
    client::GameClient, gateway::ConnectGateway, preference::DisplayPreference,
    session_cache::SessionCache,
};
pub use domain::model::{
    Card, CardType, ErrorBody, GameSession, PlayOutcome, PlayRequest, PlayResult,
};
pub use domain::ports::{Clock, GameGateway, KeyValueStore, SystemClock};
pub use utils::error::{GameError, Result, TransportError};
