use std::sync::Mutex;

use futures::StreamExt;
use solar_client::{DataFilter, NewSolarPlantData, SolarPlantData};

use crate::pipeline::{EnvelopeStream, PipelineError};
use crate::store::{SolarStore, StoreError};

/// In-memory store with the same transactional contract as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<SolarPlantData>>,
    fail_after: Option<usize>,
    find_calls: Mutex<usize>,
}

impl MemoryStore {
    /// A store whose next ingestion fails once `n` rows have been staged.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    pub fn with_rows(rows: Vec<SolarPlantData>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<SolarPlantData> {
        self.rows.lock().unwrap().clone()
    }

    pub fn find_calls(&self) -> usize {
        *self.find_calls.lock().unwrap()
    }

    fn matches(filter: &DataFilter, row: &SolarPlantData) -> bool {
        if filter.id.is_some_and(|id| id != row.id) {
            return false;
        }
        if let Some(start) = filter.start {
            if !row.timestamp.is_some_and(|ts| ts >= start) {
                return false;
            }
        }
        if let Some(end) = filter.end {
            if !row.timestamp.is_some_and(|ts| ts <= end) {
                return false;
            }
        }
        true
    }
}

#[async_trait::async_trait]
impl SolarStore for MemoryStore {
    async fn insert_all(&self, mut input: EnvelopeStream<NewSolarPlantData>) -> Result<u64, PipelineError> {
        let mut staged: Vec<NewSolarPlantData> = Vec::new();
        while let Some(item) = input.next().await {
            if self.fail_after.is_some_and(|n| staged.len() >= n) {
                return Err(PipelineError::Sink("simulated insert failure".to_string()));
            }
            staged.push(item?.payload);
        }

        let mut rows = self.rows.lock().unwrap();
        let mut next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        let inserted = staged.len() as u64;
        for reading in staged {
            next_id += 1;
            rows.push(reading.into_stored(next_id));
        }
        Ok(inserted)
    }

    async fn find(&self, filter: &DataFilter) -> Result<Vec<SolarPlantData>, StoreError> {
        *self.find_calls.lock().unwrap() += 1;
        let mut found: Vec<SolarPlantData> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| Self::matches(filter, row))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn get(&self, id: i32) -> Result<Option<SolarPlantData>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }
}
