use clap::Parser;
use hilo_deck::config::{Command, ThemeMode};
use hilo_deck::utils::error::ErrorSeverity;
use hilo_deck::utils::logger;
use hilo_deck::{
    CliConfig, ClientConfig, ConnectGateway, DisplayPreference, ErrorBody, GameClient, GameError,
    LocalStorage, PlayResult, SystemClock,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 設定有誤時日誌尚未初始化，直接輸出到 stderr
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose_logs());
    }
    tracing::debug!("Resolved config: {:?}", config);

    let storage = Arc::new(LocalStorage::new(config.storage_dir().to_string()));

    match run(&cli.command, &config, storage).await {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            let body = ErrorBody::from(&e);
            println!("{}", serde_json::to_string_pretty(&body)?);
            eprintln!("❌ {} ({})", e.user_friendly_message(), e.status_code());

            std::process::exit(exit_code(&e));
        }
    }
}

async fn run(
    command: &Command,
    config: &ClientConfig,
    storage: Arc<LocalStorage>,
) -> hilo_deck::Result<i32> {
    let gateway = ConnectGateway::new(config.base_url())?;
    let mut client =
        GameClient::new(gateway, storage.clone(), SystemClock).with_user_id(config.user_id());

    match command {
        Command::Today => {
            let session = client.today().await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Command::Refresh => {
            let session = client.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Command::Play { cards, elapsed } => {
            let session = client.today().await?;
            let result = client.play(&session, cards, *elapsed).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if let PlayResult::Failed { message } = &result {
                eprintln!("❌ {}", message);
                return Ok(2);
            }
        }
        Command::Reset => {
            client.reset();
            println!("✅ Cached game cleared");
        }
        Command::Theme { mode } => run_theme(storage, *mode),
    }

    Ok(0)
}

fn run_theme(storage: Arc<LocalStorage>, mode: Option<ThemeMode>) {
    let preference = DisplayPreference::new(storage);
    let dark = match mode {
        Some(ThemeMode::Dark) => {
            preference.set_dark(true);
            true
        }
        Some(ThemeMode::Light) => {
            preference.set_dark(false);
            false
        }
        Some(ThemeMode::Toggle) => preference.toggle(),
        None => preference.is_dark(),
    };
    println!("{}", if dark { "dark" } else { "light" });
}

fn exit_code(e: &GameError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
