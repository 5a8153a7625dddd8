//! SQLite 分片存储

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::DayShardStore;
use crate::error::AppResult;
use crate::time_util;

/// 每天一行，payload 为整天新闻的 JSON
pub struct SqliteShardStore {
    conn: Mutex<Connection>,
}

impl SqliteShardStore {
    pub fn open(db_path: impl AsRef<Path>) -> AppResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::init_schema(&conn)?;
        info!("✅ 新闻存储已打开: {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> AppResult<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS day_shards (
                day_key INTEGER PRIMARY KEY,
                payload BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

#[async_trait]
impl DayShardStore for SqliteShardStore {
    async fn get(&self, day_key: i64) -> AppResult<Option<Vec<u8>>> {
        let conn = self.conn.lock().await;
        let payload = conn
            .query_row(
                "SELECT payload FROM day_shards WHERE day_key = ?1",
                params![day_key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(payload)
    }

    async fn put(&self, day_key: i64, payload: Vec<u8>) -> AppResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO day_shards (day_key, payload, updated_at) VALUES (?1, ?2, ?3)",
            params![day_key, payload, time_util::now_timestamp()],
        )?;
        debug!("写入分片: {}", time_util::format_date(day_key));
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }

    async fn contains(&self, day_key: i64) -> AppResult<bool> {
        let conn = self.conn.lock().await;
        let found = conn
            .query_row(
                "SELECT 1 FROM day_shards WHERE day_key = ?1",
                params![day_key],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn key_range(&self) -> AppResult<Option<(i64, i64)>> {
        let conn = self.conn.lock().await;
        let (min_key, max_key) = conn.query_row(
            "SELECT MIN(day_key), MAX(day_key) FROM day_shards",
            [],
            |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
        )?;
        Ok(min_key.zip(max_key))
    }

    async fn keys(&self) -> AppResult<Vec<i64>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT day_key FROM day_shards ORDER BY day_key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
