//! Postgres ledger backend

use crate::backend::LedgerBackend;
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::record::StockRecord;
use crate::visitor::VisitorHash;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

const SELECT_STOCK: &str =
    "SELECT symbol, likes, visitor_hashes, created_at, updated_at FROM stocks WHERE symbol = $1";

// Insert-or-conditionally-update in one statement. The row lock taken by
// ON CONFLICT makes the hash check and the increment a single atomic step;
// when the visitor is already present nothing is returned.
const ADD_LIKE_IF_ABSENT: &str = r#"
    INSERT INTO stocks (symbol, likes, visitor_hashes)
    VALUES ($1, 1, ARRAY[$2::TEXT])
    ON CONFLICT (symbol) DO UPDATE SET
        likes = stocks.likes + 1,
        visitor_hashes = array_append(stocks.visitor_hashes, $2::TEXT),
        updated_at = NOW()
    WHERE NOT ($2::TEXT = ANY(stocks.visitor_hashes))
    RETURNING symbol, likes, visitor_hashes, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    symbol: String,
    likes: i64,
    visitor_hashes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        Self {
            symbol: row.symbol,
            likes: row.likes,
            visitor_hashes: row.visitor_hashes.into_iter().collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// sqlx-backed ledger over the `stocks` table
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Connect, run migrations and verify the connection
    pub async fn connect(config: &LedgerConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Connected to Postgres ledger (pool size {})", config.max_connections);

        Ok(Self { pool })
    }

    /// Wrap an existing pool; migrations are the caller's concern
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let row = sqlx::query_as::<_, StockRow>(SELECT_STOCK)
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(StockRecord::from))
    }
}

#[async_trait::async_trait]
impl LedgerBackend for PostgresLedger {
    async fn find(&self, symbol: &str) -> Result<Option<StockRecord>> {
        self.fetch(symbol).await
    }

    async fn find_or_create(&self, symbol: &str) -> Result<StockRecord> {
        sqlx::query("INSERT INTO stocks (symbol) VALUES ($1) ON CONFLICT (symbol) DO NOTHING")
            .bind(symbol)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, StockRow>(SELECT_STOCK)
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn add_like_if_absent(
        &self,
        symbol: &str,
        visitor: &VisitorHash,
    ) -> Result<StockRecord> {
        let updated = sqlx::query_as::<_, StockRow>(ADD_LIKE_IF_ABSENT)
            .bind(symbol)
            .bind(visitor.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row.into()),
            None => {
                debug!("Visitor {} already liked {}", visitor.short(), symbol);
                let row = sqlx::query_as::<_, StockRow>(SELECT_STOCK)
                    .bind(symbol)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(row.into())
            }
        }
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM stocks").execute(&self.pool).await?;

        info!("Cleared {} ledger records", result.rows_affected());

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
