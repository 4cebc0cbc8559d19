use futures::StreamExt;
use solar_client::{
    db::solar_plant_queries::{fetch_by_id, fetch_filtered, insert_batch},
    DataFilter, NewSolarPlantData, SolarPlantData,
};
use sqlx::{postgres::PgPool, Postgres, Transaction};

use crate::pipeline::{EnvelopeStream, PipelineError};
use crate::store::{SolarStore, StoreError};

pub struct PgSolarStore {
    pool: PgPool,
    batch_size: usize,
}

impl PgSolarStore {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
        }
    }

    async fn write_all(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        mut input: EnvelopeStream<NewSolarPlantData>,
    ) -> Result<u64, PipelineError> {
        let mut buffer: Vec<NewSolarPlantData> = Vec::with_capacity(self.batch_size);
        let mut inserted = 0u64;

        while let Some(item) = input.next().await {
            buffer.push(item?.payload);
            if buffer.len() >= self.batch_size {
                inserted += self.flush_batch(tx, &buffer).await?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            inserted += self.flush_batch(tx, &buffer).await?;
        }

        Ok(inserted)
    }

    async fn flush_batch(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        batch: &[NewSolarPlantData],
    ) -> Result<u64, PipelineError> {
        insert_batch(&mut **tx, batch)
            .await
            .map_err(|e| PipelineError::Sink(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SolarStore for PgSolarStore {
    async fn insert_all(&self, input: EnvelopeStream<NewSolarPlantData>) -> Result<u64, PipelineError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PipelineError::Sink(format!("failed to open transaction: {e}")))?;

        match self.write_all(&mut tx, input).await {
            Ok(inserted) => {
                tx.commit()
                    .await
                    .map_err(|e| PipelineError::Sink(format!("commit failed: {e}")))?;
                metrics::counter!("solar_rows_ingested_total").increment(inserted);
                Ok(inserted)
            }
            Err(e) => {
                tracing::error!(error = %e, "ingestion failed, rolling back transaction");
                metrics::counter!("solar_ingest_failures_total").increment(1);
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn find(&self, filter: &DataFilter) -> Result<Vec<SolarPlantData>, StoreError> {
        Ok(fetch_filtered(&self.pool, filter).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<SolarPlantData>, StoreError> {
        Ok(fetch_by_id(&self.pool, id).await?)
    }
}
