use std::{error::Error, future, sync::Arc};

use bot::{
    dispatcher::Dispatcher,
    map::{MapRenderer, NoMap},
    polling::Bot,
    session::SessionStore,
};
use database::SqliteDatabase;
use road_reports::server::Server;
use telegram::TelegramClient;
use web::{config::AppConfig, start_web_server, WebState};

#[tokio::main]
async fn main() {
    // read .env before the logger so RUST_LOG can come from there
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Err(why) = dotenv {
        if !why.not_found() {
            log::warn!("could not read .env file: {}", why);
        }
    }

    if let Err(why) = run().await {
        log::error!("{}", why);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;

    // database
    let database = SqliteDatabase::connect(config.database).await?;

    // server
    let server = Server::new(database.clone());
    server.initialize().await?;

    // telegram bot
    let bot = match config.telegram {
        Some(credentials) => {
            let renderer: Arc<dyn MapRenderer> = match config.map {
                Some(map) => Arc::new(map),
                None => {
                    log::warn!("GOOGLE_MAPS_API_KEY is not set, traffic replies are sent as text");
                    Arc::new(NoMap)
                }
            };
            let dispatcher = Dispatcher::new(
                server.client("Telegram"),
                Arc::new(SessionStore::new(config.bot.session_timeout)),
                renderer,
            );
            Some(Bot::new(
                TelegramClient::new(credentials),
                dispatcher,
                config.bot,
            ))
        }
        None => {
            log::warn!("TELEGRAM_API_TOKEN is not set, only serving the http api");
            None
        }
    };
    let bot_future = async move {
        match bot {
            Some(bot) => bot.run().await,
            None => future::pending().await,
        }
    };

    // web server
    let web_future = start_web_server(
        WebState {
            report_client: server.client("REST API"),
        },
        config.web.bind_address,
    );

    tokio::select! {
        result = web_future => result?,
        _ = bot_future => {},
        _ = tokio::signal::ctrl_c() => log::info!("shutting down"),
    }

    database.close().await;
    Ok(())
}
