use std::{process, sync::Arc, time::Duration};

use cerahati::{
    application::error::AppError,
    cache::{self, CacheBackend, CacheConfig, CacheServices, ConnectionMonitor},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState, CacheGate},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::RefreshLeaderboard(args) => {
            run_refresh_leaderboard(settings, Duration::from_secs(args.connect_timeout_seconds))
                .await
        }
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache_config = CacheConfig::from(&settings.cache);
    let monitor = ConnectionMonitor::new();
    let gate = CacheGate::new();

    spawn_cache_connect(
        cache_config,
        monitor.clone(),
        gate.clone(),
        repositories.clone(),
    );

    let state = AppState {
        cache: gate,
        monitor,
        health: repositories.clone(),
        records: repositories,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "cerahati::serve",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)?;

    info!(target = "cerahati::serve", "server stopped");
    Ok(())
}

/// Connect to the cache in the background and open the gate once it is up.
fn spawn_cache_connect(
    config: CacheConfig,
    monitor: ConnectionMonitor,
    gate: CacheGate,
    repositories: Arc<PostgresRepositories>,
) {
    tokio::spawn(async move {
        match cache::open_store(&config, monitor).await {
            Ok(store) => {
                gate.open(CacheServices::new(
                    store,
                    repositories,
                    config.ttl_policy(),
                ));
            }
            Err(err) => {
                error!(
                    target = "cerahati::serve",
                    error = %err,
                    "cache store cannot be opened; cache routes stay disabled"
                );
            }
        }
    });
}

async fn run_refresh_leaderboard(
    settings: config::Settings,
    connect_timeout: Duration,
) -> Result<(), AppError> {
    let cache_config = CacheConfig::from(&settings.cache);
    if cache_config.backend == CacheBackend::Memory {
        warn!(
            target = "cerahati::refresh_leaderboard",
            "memory backend is process-local; the refreshed entry is discarded on exit"
        );
    }

    let repositories = init_repositories(&settings).await?;
    let store = cache::open_store_within(&cache_config, ConnectionMonitor::new(), connect_timeout)
        .await
        .map_err(InfraError::from)?;
    let services = CacheServices::new(store, repositories, cache_config.ttl_policy());

    let entries = services.leaderboard.refresh().await?;

    info!(
        target = "cerahati::refresh_leaderboard",
        donors = entries.len(),
        "leaderboard refreshed"
    );
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_deref()
        .ok_or(InfraError::Configuration("database.url"))?;

    let repositories =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(InfraError::from)?;

    if settings.database.run_migrations {
        repositories.migrate().await.map_err(InfraError::from)?;
        info!(target = "cerahati::serve", "database migrations applied");
    }

    Ok(Arc::new(repositories))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "cerahati::serve", "shutdown signal received");
}
