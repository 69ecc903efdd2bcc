mod bot;
mod config;

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use bot::{Dialogue, SessionStore, Storage, TelegramClient};
use config::Config;

/// Sessions idle longer than this are dropped by the sweeper.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
/// How often the sweeper looks for idle sessions.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

struct AppState {
    sessions: SessionStore,
    dialogue: Dialogue,
    telegram: TelegramClient,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    // Setup logging: stdout, plus a non-blocking file layer when LOG_DIR
    // is set.
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::INFO.into()),
            ),
    );
    let _log_guard = if let Some(ref log_dir) = config.log_dir {
        std::fs::create_dir_all(log_dir).ok();
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("finbot.log"))
            .expect("Failed to open log file");
        let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_filter(
                        tracing_subscriber::EnvFilter::from_default_env()
                            .add_directive(tracing::Level::INFO.into()),
                    ),
            )
            .init();
        Some(guard)
    } else {
        registry.init();
        None
    };

    info!("🚀 Starting finbot...");

    let storage = match Storage::open(&config.database_path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!(
                "Failed to open database {}: {e}",
                config.database_path.display()
            );
            std::process::exit(1);
        }
    };
    if let Err(e) = storage.ensure_default_category() {
        error!("Failed to initialize default category: {e}");
        std::process::exit(1);
    }
    info!("Default category initialized");

    let bot = Bot::new(&config.bot_token);

    let state = Arc::new(AppState {
        sessions: SessionStore::new(),
        dialogue: Dialogue::new(storage),
        telegram: TelegramClient::new(bot.clone()),
    });

    // Periodically drop sessions that have been idle too long.
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                state.sessions.evict_idle(SESSION_IDLE_TTL);
            }
        });
    }

    info!("Started receiving updates");

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Dialogues are keyed by chat id.
    let user_id = msg.chat.id.0;

    info!(
        "📨 {user_id}: \"{}\"",
        text.chars().take(50).collect::<String>()
    );

    // Holding the slot for the whole turn serializes processing per user.
    let slot = state.sessions.get_or_create(user_id);
    let mut session = slot.lock().await;
    let turn = state.dialogue.handle(user_id, text, session.clone());
    *session = turn.next;

    for reply in &turn.replies {
        state.telegram.send(user_id, reply).await;
    }

    Ok(())
}
