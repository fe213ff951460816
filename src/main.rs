use std::sync::Arc;

use futures::StreamExt;

use weatherbot::bot::App;
use weatherbot::config::Config;
use weatherbot::profile::LibSqlProfileStore;
use weatherbot::telegram::TelegramChannel;
use weatherbot::weather::WeatherClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("🌤️ weatherbot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Location: {}", config.location);
    eprintln!("   Admin: {}", config.admin_id);

    let profiles = Arc::new(LibSqlProfileStore::new_local(&config.db_path).await?);

    let weather = WeatherClient::new(config.weather_api_key.clone(), config.location.clone());
    let app = App::new(profiles, weather, config.admin_id);

    let channel = TelegramChannel::new(config.telegram_token.clone());
    channel.health_check().await?;

    let mut updates = Box::pin(channel.updates());
    while let Some(update) = updates.next().await {
        let replies = app.handle(update.event).await;
        for reply in replies {
            if let Err(e) = channel.send_reply(update.chat_id, &reply).await {
                tracing::warn!(chat_id = update.chat_id, error = %e, "Failed to send reply");
            }
        }
    }

    Ok(())
}
