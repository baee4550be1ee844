use std::{
    future::IntoFuture as _,
    io,
    process::ExitCode,
    sync::OnceLock,
};

use application::{Args, Config, Service};
use common::operations::Perform;
use service::{infra::Auth0, task::PurgeUsers, Task as _};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

async fn start() -> Result<(), ()> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded `{}`", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => {
            log::error!("failed to load `.env` file: {e}");
            return Err(());
        }
    }

    let Args { config, once } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        directory,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let service = service
        .into_config(directory.domain.clone())
        .map_err(|e| {
            log::error!("invalid `Config`: {e}");
        })?;

    let auth0 = Auth0::new(directory.into()).map_err(|e| {
        log::error!("failed to initialize `Auth0` client: {e}");
    })?;

    log::info!("user purge is running against `{}`", auth0.domain());

    if once {
        let task = PurgeUsers::new(
            service.purge_users.clone(),
            Service::new(service, auth0),
        );
        return match task.execute(Perform(())).await {
            Ok(summary) => {
                log::info!("`task::PurgeUsers` completed: {summary}");
                Ok(())
            }
            Err(e) if e.as_ref().is_skip() => {
                log::warn!("`task::PurgeUsers` skipped: {e}");
                Err(())
            }
            Err(e) => {
                log::error!("`task::PurgeUsers` failed: {e}");
                Err(())
            }
        };
    }

    let (_service, background) = Service::with_background(service, auth0);

    background.into_future().await.map_err(|e| {
        log::error!("background task failed: {e}");
    })
}
