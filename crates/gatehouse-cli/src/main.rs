//! gatehouse - RFID room access controller for constrained edge devices.
//!
//! Wires the full pipeline: tag reads flow through the decision engine one
//! at a time, each decided event is durably appended to the offline cache
//! before the next read is accepted, feedback runs in the background, and
//! two independent tasks keep the server in sync (event delivery with
//! backoff, collaborator replica refresh). On Ctrl-C the loop stops intake,
//! finishes the in-flight append, and prints the session report.
//!
//! Without reader hardware attached, tags are taken from standard input:
//! one identifier per line.

mod config;

use anyhow::{Context, Result};
use config::AppConfig;
use gatehouse_core::{CollaboratorRecord, TagId};
use gatehouse_engine::{DecisionEngine, SessionReport, replica::replace_shared, shared_replica};
use gatehouse_hardware::{
    AnyIndicatorDevice, AnyTagReader, ConsoleIndicator, DebouncedReader, FeedbackController,
    HardwareError, StdinTagReader, traits::TagReader,
};
use gatehouse_storage::{Database, DatabaseConfig, EventCache, SqliteEventCache};
use gatehouse_sync::{
    ApiConfig, HttpLogClient, HttpRegistryClient, RefreshTask, SyncEngine, SyncEngineConfig,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(version = gatehouse_core::VERSION, "gatehouse starting");

    // Offline cache: durable appends are the delivery guarantee.
    let db = Database::new(DatabaseConfig::new(config.database_path.clone()))
        .await
        .context("failed to open offline cache")?;
    let cache = SqliteEventCache::new(db.pool().clone());

    // Confirmed rows from previous sessions are no longer needed.
    let pruned = cache
        .prune_confirmed()
        .await
        .context("failed to prune offline cache")?;
    if pruned > 0 {
        info!(pruned, "pruned confirmed events from previous sessions");
    }

    // Collaborator replica and its refresh task.
    let api_config = api_config(&config);
    let replica = shared_replica();
    let refresh = RefreshTask::new(
        HttpRegistryClient::new(api_config.clone()).context("registry client")?,
        replica.clone(),
    );
    match refresh.refresh_once().await {
        Ok(count) => info!(collaborators = count, "replica loaded from registry"),
        Err(e) => {
            warn!(error = %e, "starting without registry connection");
            if config.seed_demo_replica {
                let seeded = replace_shared(&replica, demo_records());
                warn!(collaborators = seeded, "seeded demo replica (offline bring-up)");
            }
        }
    }

    // Background tasks: sync engine and periodic refresh.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sync_engine = SyncEngine::new(
        HttpLogClient::new(api_config).context("log client")?,
        SqliteEventCache::new(db.pool().clone()),
        SyncEngineConfig {
            interval: config.sync_interval,
            backoff_base: config.sync_backoff_base,
            backoff_cap: config.sync_backoff_cap,
        },
    );
    let sync_task = tokio::spawn(sync_engine.run(shutdown_rx.clone()));
    let refresh_task = tokio::spawn(refresh.run(config.refresh_interval, shutdown_rx.clone()));

    // Feedback is fire-and-forget relative to the read loop.
    let (feedback, feedback_task) =
        FeedbackController::spawn(AnyIndicatorDevice::Console(ConsoleIndicator::new()));

    // Single logical pipeline: reads decided strictly one at a time.
    let mut reader = DebouncedReader::new(
        AnyTagReader::Stdin(StdinTagReader::new()),
        config.debounce,
    );
    let mut engine = DecisionEngine::new(replica);

    info!("ready, waiting for tag reads (one per line on stdin)");

    let loop_result = read_loop(&mut reader, &mut engine, &cache, &feedback).await;

    // Shutdown: stop intake, let background tasks wind down, then report.
    let _ = shutdown_tx.send(true);
    drop(feedback);
    let _ = sync_task.await;
    let _ = refresh_task.await;
    let _ = feedback_task.await;

    let counts = cache.event_type_counts().await.unwrap_or_default();
    let sync_counts = cache.sync_status_counts().await.unwrap_or_default();
    let report = SessionReport::build(&engine, counts, sync_counts);
    println!("{}", report.render());

    db.close().await;

    loop_result
}

/// Accept reads until shutdown or a fatal cache failure.
///
/// The decided event must be durably appended before the loop accepts the
/// next read; a cache write failure is fatal, because the delivery guarantee
/// cannot be honored without it. Hardware read errors are recovered locally.
async fn read_loop<R: TagReader>(
    reader: &mut R,
    engine: &mut DecisionEngine,
    cache: &SqliteEventCache,
    feedback: &gatehouse_hardware::FeedbackHandle,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                return Ok(());
            }
            read = reader.next_read() => {
                let read = match read {
                    Ok(read) => read,
                    Err(HardwareError::Disconnected { device }) => {
                        info!(device = %device, "tag source ended");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(error = %e, "tag read failed, continuing");
                        continue;
                    }
                };

                info!(tag = %read.tag, "tag detected");
                let decision = engine.decide(read.tag, read.read_at);

                if let Err(e) = cache.append(&decision.event).await {
                    error!(error = %e, "cache append failed, halting intake");
                    return Err(e).context("offline cache is unavailable");
                }

                feedback.dispatch(decision.feedback);
                info!("{}", decision.message);
            }
        }
    }
}

fn api_config(config: &AppConfig) -> ApiConfig {
    let mut api = ApiConfig::new(config.api_base_url.clone()).timeout(config.http_timeout);
    if let Some(token) = &config.api_token {
        api = api.bearer_token(token.clone());
    }
    api
}

/// Demo replica for offline bring-up, mirroring the registry's seed data.
fn demo_records() -> Vec<CollaboratorRecord> {
    [
        (1, "Joao Silva", "RFID001", true),
        (2, "Maria Santos", "RFID002", true),
        (3, "Pedro Oliveira", "RFID003", false),
        (4, "Ana Costa", "RFID004", true),
    ]
    .into_iter()
    .filter_map(|(id, name, tag, has_access)| {
        TagId::new(tag).ok().map(|tag| CollaboratorRecord {
            id,
            name: name.to_string(),
            tag,
            has_access,
        })
    })
    .collect()
}
