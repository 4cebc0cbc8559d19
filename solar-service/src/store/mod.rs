pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgSolarStore;

use solar_client::{DataFilter, DbError, NewSolarPlantData, SolarPlantData};

use crate::pipeline::{EnvelopeStream, PipelineError};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Persistence gateway used by the HTTP handlers and the ingestion pipeline.
///
/// Every call borrows its own connection (or transaction) for the duration of
/// the call and releases it before returning.
#[async_trait::async_trait]
pub trait SolarStore: Send + Sync {
    /// Insert every reading from `input` inside a single transaction.
    ///
    /// Any error, upstream or from the database, rolls the whole call back.
    async fn insert_all(&self, input: EnvelopeStream<NewSolarPlantData>) -> Result<u64, PipelineError>;

    async fn find(&self, filter: &DataFilter) -> Result<Vec<SolarPlantData>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<SolarPlantData>, StoreError>;
}
