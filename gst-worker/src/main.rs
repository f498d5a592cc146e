//! Worker bootstrap: loads configuration, connects to Postgres, ensures the
//! schema exists, assembles the rule registry and document service, and
//! drives the parse queue worker (C8) until SIGINT/SIGTERM.

mod stubs;

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;

use gst_pipeline::{DbDuplicateFinder, PipelineDeps, Worker, WorkerConfig};
use gst_rules::{HsnExistsValidator, HsnLookup, HsnRateMatchValidator, RuleRegistry};
use gst_service::GstConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let env = std::env::var("GST_ENV").unwrap_or_else(|_| "production".to_string());
    let config = GstConfig::load(&env)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect(&config.db.url)
        .await?;

    gst_db::ensure_schema(&pool).await?;
    let audit_repo = gst_db::DocumentAuditEntryRepository::new(pool.clone());
    let store = Arc::new(gst_db::Store::new(pool));

    let hsn_entries = store.hsn.load_all().await?;
    let hsn_lookup = Arc::new(HsnLookup::new(hsn_entries));

    let mut registry = RuleRegistry::with_static_catalogue();
    registry.register("hsn.exists", Arc::new(HsnExistsValidator::new(Arc::clone(&hsn_lookup))));
    registry.register("hsn.rate_matches", Arc::new(HsnRateMatchValidator::new(hsn_lookup)));
    registry.register(
        "duplicate.invoice",
        Arc::new(gst_rules::DuplicateInvoiceValidator::new(DbDuplicateFinder {
            store: Arc::clone(&store),
        })),
    );

    let audit: Arc<dyn gst_audit::AuditSink> = Arc::new(gst_audit::PostgresAuditSink::new(audit_repo));

    let pipeline = Arc::new(PipelineDeps {
        store: Arc::clone(&store),
        audit: Arc::clone(&audit),
        parser: Arc::new(stubs::UnconfiguredParser),
        storage: Arc::new(stubs::UnconfiguredStorage),
        registry,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let worker = Worker::new(
        Arc::clone(&pipeline),
        WorkerConfig {
            poll_interval: Duration::from_secs(config.parse_queue.poll_interval_secs),
            max_retries: config.parse_queue.max_retries,
            concurrency: config.parse_queue.concurrency,
        },
    );

    worker.run(shutdown_rx).await;

    Ok(())
}
