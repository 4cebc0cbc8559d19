use std::sync::Arc;

use solar_client::domain::NewSolarPlantData;

use crate::pipeline::{EnvelopeStream, PipelineError, Sink};
use crate::store::SolarStore;

/// Terminal pipeline stage: hands the cleaned stream to a [`SolarStore`] as
/// one transactional insert.
pub struct SolarStoreSink {
    store: Arc<dyn SolarStore>,
}

impl SolarStoreSink {
    pub fn new(store: Arc<dyn SolarStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Sink<NewSolarPlantData> for SolarStoreSink {
    async fn run(&self, input: EnvelopeStream<NewSolarPlantData>) -> Result<u64, PipelineError> {
        self.store.insert_all(input).await
    }
}
