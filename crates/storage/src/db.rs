use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use stmtcat_core::{Category, LearningRecord};

use crate::store::{LearningStore, StorageError};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 4,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

pub async fn create_db(path: &Path, options: &StoreOptions) -> Result<DbPool, sqlx::Error> {
    let connect = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(options.busy_timeout)
        .pragma("cache_size", "-32000");

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(connect)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_categorizations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_name TEXT NOT NULL,
            file_type TEXT NOT NULL,
            predicted_category TEXT NOT NULL,
            confidence_score REAL NOT NULL,
            user_corrected_category TEXT,
            usage_count INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(account_name, file_type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Reserved for learned section headers; nothing reads or writes it yet.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS section_patterns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_type TEXT NOT NULL,
            section_header TEXT NOT NULL,
            category TEXT NOT NULL,
            confidence_score REAL NOT NULL DEFAULT 1.0,
            usage_count INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

type RecordRow = (
    String,
    String,
    String,
    f64,
    Option<String>,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

const SELECT_RECORD: &str = "SELECT account_name, file_type, predicted_category, confidence_score, \
     user_corrected_category, usage_count, created_at, updated_at FROM ai_categorizations";

fn parse_category(account_name: &str, value: &str) -> Result<Category, StorageError> {
    Category::from_str(value).map_err(|_| StorageError::CorruptCategory {
        account_name: account_name.to_string(),
        value: value.to_string(),
    })
}

fn record_from_row(r: RecordRow) -> Result<LearningRecord, StorageError> {
    let predicted_category = parse_category(&r.0, &r.2)?;
    let user_corrected_category = r
        .4
        .as_deref()
        .map(|value| parse_category(&r.0, value))
        .transpose()?;

    Ok(LearningRecord {
        account_name: r.0,
        file_type: r.1,
        predicted_category,
        confidence_score: r.3,
        user_corrected_category,
        usage_count: r.5,
        created_at: r.6,
        updated_at: r.7,
    })
}

/// SQLite-backed history. Each call checks a connection out of the pool and
/// returns it when the call finishes, on success or error.
#[derive(Debug, Clone)]
pub struct SqliteLearningStore {
    pool: DbPool,
}

impl SqliteLearningStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn open(path: &Path, options: &StoreOptions) -> Result<Self, StorageError> {
        let pool = create_db(path, options).await?;
        tracing::debug!("Opened learning store at {}", path.display());
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl LearningStore for SqliteLearningStore {
    async fn get(&self, file_type: &str) -> Result<HashMap<String, LearningRecord>, StorageError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "{SELECT_RECORD} WHERE file_type = ? ORDER BY account_name"
        ))
        .bind(file_type)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| record_from_row(r).map(|record| (record.account_name.clone(), record)))
            .collect()
    }

    async fn find(
        &self,
        account_name: &str,
        file_type: &str,
    ) -> Result<Option<LearningRecord>, StorageError> {
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "{SELECT_RECORD} WHERE account_name = ? AND file_type = ?"
        ))
        .bind(account_name)
        .bind(file_type)
        .fetch_optional(&self.pool)
        .await?;

        row.map(record_from_row).transpose()
    }

    async fn save(
        &self,
        account_name: &str,
        file_type: &str,
        predicted_category: Category,
        confidence_score: f64,
        user_corrected_category: Option<Category>,
    ) -> Result<(), StorageError> {
        let now = Utc::now();

        // Single statement: SQLite applies the insert-or-increment atomically.
        sqlx::query(
            r#"
            INSERT INTO ai_categorizations
                (account_name, file_type, predicted_category, confidence_score,
                 user_corrected_category, usage_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT(account_name, file_type) DO UPDATE SET
                predicted_category = excluded.predicted_category,
                confidence_score = excluded.confidence_score,
                user_corrected_category = excluded.user_corrected_category,
                usage_count = ai_categorizations.usage_count + 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(account_name)
        .bind(file_type)
        .bind(predicted_category.as_str())
        .bind(confidence_score)
        .bind(user_corrected_category.map(Category::as_str))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
