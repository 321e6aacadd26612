use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::Item;
use crate::error::{LogOnError, StoreError};

pub type DbPool = Arc<Mutex<Connection>>;

/// Durable item persistence.
///
/// Items are stored as JSON bodies with a few columns pulled out for
/// indexing; the body is the source of truth on load.
#[derive(Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).log_warn("Could not create database directory");
    }

    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    tracing::info!("Opened item database at {}", path.display());
    Ok(Self {
      pool: Arc::new(Mutex::new(conn)),
    })
  }

  pub fn open_in_memory() -> Result<Self, StoreError> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Self {
      pool: Arc::new(Mutex::new(conn)),
    })
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.pool.lock().map_err(|_: PoisonError<_>| {
      tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
      StoreError::LockPoisoned
    })
  }

  /// Every stored item; rows whose body no longer parses are skipped
  pub fn load_all(&self) -> Result<Vec<Item>, StoreError> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare("SELECT id, body FROM items ORDER BY id")?;
    let rows = stmt
      .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let items = rows
      .into_iter()
      .filter_map(|(id, body)| {
        serde_json::from_str::<Item>(&body)
          .log_warn(&format!("Skipping unreadable item {}", id))
          .map(|mut item| {
            item.normalize();
            item
          })
      })
      .collect();
    Ok(items)
  }

  /// Upsert a batch in one transaction
  pub fn save_items(&self, items: &[Item]) -> Result<(), StoreError> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare(
        "INSERT INTO items (id, topic, kind, book_id, next_review_at, last_attempted_at, body)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           topic = excluded.topic,
           kind = excluded.kind,
           book_id = excluded.book_id,
           next_review_at = excluded.next_review_at,
           last_attempted_at = excluded.last_attempted_at,
           body = excluded.body",
      )?;
      for item in items {
        let body = serde_json::to_string(item)?;
        stmt.execute(params![
          item.id,
          item.topic,
          item.kind.as_str(),
          item.book_id,
          item.srs_next_review_at.timestamp_millis(),
          item.last_attempted_at.map(|t| t.timestamp_millis()),
          body,
        ])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  pub fn delete_items(&self, ids: &[String]) -> Result<usize, StoreError> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    let mut deleted = 0;
    {
      let mut stmt = tx.prepare("DELETE FROM items WHERE id = ?1")?;
      for id in ids {
        deleted += stmt.execute(params![id])?;
      }
    }
    tx.commit()?;
    Ok(deleted)
  }

  /// Items due at or before `now_ms`, counted from the indexed column
  pub fn due_count(&self, now_ms: i64) -> Result<i64, StoreError> {
    let conn = self.lock()?;
    Ok(conn.query_row(
      "SELECT COUNT(*) FROM items WHERE next_review_at <= ?1",
      params![now_ms],
      |row| row.get(0),
    )?)
  }
}

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS items (
      id TEXT PRIMARY KEY,
      topic TEXT NOT NULL,
      kind TEXT NOT NULL DEFAULT 'question',
      book_id TEXT,
      next_review_at INTEGER NOT NULL,
      last_attempted_at INTEGER,
      body TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_items_next_review ON items(next_review_at);
    CREATE INDEX IF NOT EXISTS idx_items_book ON items(book_id);
    CREATE INDEX IF NOT EXISTS idx_items_topic ON items(topic);
    "#,
  )
}
