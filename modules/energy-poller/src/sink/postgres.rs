// Postgres history with an explicit schema (see migrations/). Key columns are
// typed; all other flattened fields are kept in a JSONB object.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::{PollError, Result};
use crate::row::{FieldValue, FlattenedRow, RUN_TIME_FIELD};
use crate::traits::HistorySink;

/// Version written with each row. Bump alongside a migration that changes the row layout.
pub const SCHEMA_VERSION: i32 = 1;

const KEY_COLUMNS: [&str; 4] = ["trading_date", "grid_zone_id", "grid_zone_name", RUN_TIME_FIELD];

pub struct PgSink {
    pool: PgPool,
}

/// A row from the energy_readings table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StoredReading {
    trading_date: Option<String>,
    grid_zone_id: Option<String>,
    grid_zone_name: Option<String>,
    run_time: Option<String>,
    fields: Value,
    schema_version: i32,
}

impl StoredReading {
    fn into_row(self) -> Result<FlattenedRow> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(PollError::Schema(format!(
                "stored row has schema version {}, this build understands up to {}",
                self.schema_version, SCHEMA_VERSION
            )));
        }

        let mut row = FlattenedRow::new();
        for (name, value) in KEY_COLUMNS.iter().zip([
            self.trading_date,
            self.grid_zone_id,
            self.grid_zone_name,
            self.run_time,
        ]) {
            row.insert(*name, value.map(FieldValue::Text).unwrap_or(FieldValue::Null));
        }

        if let Value::Object(fields) = self.fields {
            for (name, value) in fields {
                row.insert(name, FieldValue::from_json(&value));
            }
        }
        Ok(row)
    }
}

/// Split a flattened row into key column values and the JSONB remainder.
fn split_row(row: &FlattenedRow) -> ([Option<String>; 4], Value) {
    let keys = KEY_COLUMNS.map(|name| {
        row.get(name)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
    });

    let fields: Map<String, Value> = row
        .iter()
        .filter(|(name, _)| !KEY_COLUMNS.contains(name))
        .map(|(name, value)| (name.to_string(), value.to_json()))
        .collect();

    (keys, Value::Object(fields))
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HistorySink for PgSink {
    fn describe(&self) -> String {
        "postgres:energy_readings".to_string()
    }

    async fn last_row(&self) -> Result<Option<FlattenedRow>> {
        let stored = sqlx::query_as::<_, StoredReading>(
            r#"
            SELECT trading_date, grid_zone_id, grid_zone_name, run_time, fields, schema_version
            FROM energy_readings
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        stored.map(StoredReading::into_row).transpose()
    }

    async fn append(&self, row: &FlattenedRow) -> Result<()> {
        let ([trading_date, grid_zone_id, grid_zone_name, run_time], fields) = split_row(row);

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO energy_readings
                (trading_date, grid_zone_id, grid_zone_name, run_time, fields, schema_version)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&trading_date)
        .bind(&grid_zone_id)
        .bind(&grid_zone_name)
        .bind(&run_time)
        .bind(&fields)
        .bind(SCHEMA_VERSION)
        .fetch_one(&self.pool)
        .await?;

        info!(id, trading_date = trading_date.as_deref().unwrap_or(""), "Inserted energy reading");
        Ok(())
    }
}
