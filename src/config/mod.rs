pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::ClientConfig;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hilo-deck")]
#[command(about = "Daily hand client for the hi-low game engine")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Game engine base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Directory holding the cached game and preferences")]
    pub storage_dir: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show today's game, fetching it only when the cache is stale
    Today,
    /// Fetch a new game regardless of the cache
    Refresh,
    /// Play cards from today's game, by id, in order
    Play {
        #[arg(long, value_delimiter = ',', required = true)]
        cards: Vec<String>,

        #[arg(long, default_value = "0")]
        elapsed: f64,
    },
    /// Forget the cached game
    Reset,
    /// Show or change the dark-mode preference
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.remote.base_url = base_url.clone();
        }
        if let Some(dir) = &self.storage_dir {
            config.storage.directory = dir.clone();
        }
        if let Some(user_id) = &self.user_id {
            config.remote.user_id = Some(user_id.clone());
        }
        if self.json_logs {
            config.logging.json = Some(true);
        }
        if self.verbose {
            config.logging.verbose = Some(true);
        }

        config.validate()?;
        Ok(config)
    }
}
