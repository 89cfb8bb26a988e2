// Framework bootstrap for the aquarium server runtime.

use crate::domain::ports::PlayerStore;
use crate::domain::reward::RewardEngine;
use crate::domain::tank::TankBounds;
use crate::frameworks::{config, db};
use crate::interface_adapters::net::spawn_tank_serializer;
use crate::interface_adapters::postgres::PostgresPlayerStore;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, InMemoryPlayerStore};
use crate::interface_adapters::utils::rng::SeededRandom;
use crate::use_cases::{TankSettings, spawn_tank};

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

// Output shape for log lines; `LOG_FORMAT=json` switches to structured JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn init_runtime() {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Compact => builder.compact().init(),
    }

    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line()));
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(?location, %info, %backtrace, "aquarium server panicked");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state().await?;
    let app = app(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn build_state() -> Result<AppState> {
    // Configuration faults stop startup; nothing is served with a broken catalog.
    let reward_config = config::load_reward_config().map_err(|e| {
        tracing::error!(error = %e, "failed to load reward config");
        std::io::Error::other(e.to_string())
    })?;
    let catalog = Arc::new(config::load_catalog().map_err(|e| {
        tracing::error!(error = %e, "failed to load species catalog");
        std::io::Error::other(e.to_string())
    })?);
    let engine = RewardEngine::new(catalog.clone(), &reward_config.weights).map_err(|e| {
        tracing::error!(error = %e, "reward engine rejected configuration");
        std::io::Error::other(e.to_string())
    })?;
    tracing::info!(
        species = catalog.len(),
        daily_quota = reward_config.daily_quota,
        reset_interval_hours = reward_config.reset_interval_hours,
        "reward engine configured"
    );

    let store: Arc<dyn PlayerStore> = match config::database_url() {
        Some(url) => {
            let pool = db::connect_pool(&url)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to connect to database: {e}")))?;
            db::run_migrations(&pool)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
            tracing::info!("using postgres player store");
            Arc::new(PostgresPlayerStore { db: pool })
        }
        None => {
            tracing::warn!("DATABASE_URL not set; player records are kept in memory");
            Arc::new(InMemoryPlayerStore::default())
        }
    };

    let seed = config::rng_seed();
    let tank = spawn_tank(
        catalog,
        TankSettings {
            event_channel_capacity: config::TANK_EVENT_CHANNEL_CAPACITY,
            broadcast_capacity: config::TANK_BROADCAST_CAPACITY,
            tick_interval: config::TICK_INTERVAL,
            refresh_interval: config::TANK_REFRESH_INTERVAL,
            default_population: config::DEFAULT_TANK_POPULATION,
            initial_bounds: TankBounds::centered(config::DEFAULT_TANK_HALF_EXTENTS),
            seed,
        },
    );
    spawn_tank_serializer(&tank);

    Ok(AppState {
        store,
        engine: Arc::new(engine),
        quota: reward_config.quota_manager(),
        random: SeededRandom::new(seed),
        tank,
    })
}
