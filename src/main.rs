use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_srs::config::EngineConfig;
use exam_srs::engine::StudyEngine;
use exam_srs::error::LogOnError;
use exam_srs::handlers;
use exam_srs::state::AppState;
use exam_srs::store::{MemoryStore, SqliteStore};
use exam_srs::sync::{spawn_sync_worker, NoopRemote, RemoteSync};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exam_srs=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = EngineConfig::load();

  let db = SqliteStore::open(&config.database_path).expect("Failed to initialize database");
  let items = db.load_all().expect("Failed to load items");
  let due = db
    .due_count(Utc::now().timestamp_millis())
    .log_warn_default("Failed to count due items");
  tracing::info!("Loaded {} items ({} due)", items.len(), due);

  let remote: Arc<dyn RemoteSync> = Arc::new(NoopRemote);
  let (sync, sync_task) = spawn_sync_worker(
    Arc::new(db),
    remote.clone(),
    Duration::from_secs(config.sync_debounce_secs),
  );

  let mut engine = StudyEngine::new(MemoryStore::from_items(items), config.cache_ttl_secs)
    .with_utc_offset(config.utc_offset())
    .with_sync(sync.clone());

  if let Some(snapshot) = remote.pull().log_warn("Failed to pull remote items") {
    let changed = engine.merge_remote_snapshot(snapshot);
    if changed > 0 {
      tracing::info!("Merged {} items from remote", changed);
    }
  }

  let app = handlers::router(AppState::new(engine)).layer(TraceLayer::new_for_http());

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.port);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed to start");

  // Write anything still pending before exiting
  sync.flush().await;
  drop(sync);
  sync_task.await.log_warn("Sync worker did not shut down cleanly");
}

async fn shutdown_signal() {
  tokio::signal::ctrl_c()
    .await
    .log_warn("Failed to listen for shutdown signal");
  tracing::info!("Shutting down");
}
