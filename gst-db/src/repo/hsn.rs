use sqlx::{Pool, Postgres, Row};

use gst_core::{GstError, GstResult, HSNRateEntry};

pub struct HsnRateRepository {
    pool: Pool<Postgres>,
}

impl HsnRateRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn replace_all(&self, entries: &[HSNRateEntry]) -> GstResult<()> {
        sqlx::query("TRUNCATE hsn_rates")
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("truncate_hsn_rates", e))?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO hsn_rates (code, description, gst_rate, condition_desc)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&entry.code)
            .bind(&entry.description)
            .bind(entry.gst_rate)
            .bind(&entry.condition_desc)
            .execute(&self.pool)
            .await
            .map_err(|e| GstError::context("insert_hsn_rate", e))?;
        }
        Ok(())
    }

    /// Loaded once at boot into an in-memory lookup; the master list is
    /// small enough that every validator run against the database would be
    /// wasteful per-line-item traffic.
    pub async fn load_all(&self) -> GstResult<Vec<HSNRateEntry>> {
        let rows = sqlx::query("SELECT code, description, gst_rate, condition_desc FROM hsn_rates")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GstError::context("load_hsn_rates", e))?;
        Ok(rows
            .iter()
            .map(|row| HSNRateEntry {
                code: row.get("code"),
                description: row.get("description"),
                gst_rate: row.get("gst_rate"),
                condition_desc: row.get("condition_desc"),
            })
            .collect())
    }
}
