use std::{path::Path, sync::Arc};

use crate::{
    pipeline::{IngestReport, Pipeline, PipelineError},
    sinks::SolarStoreSink,
    sources::SolarCsvFileSource,
    store::SolarStore,
    transform::SolarReadingCleaning,
};

/// Read, clean and persist one CSV file as a single all-or-nothing unit.
pub async fn ingest_csv_file(store: Arc<dyn SolarStore>, path: &Path) -> Result<IngestReport, PipelineError> {
    tracing::info!(path = %path.display(), "loading solar plant CSV");

    let pipeline = Pipeline {
        source: SolarCsvFileSource::new(path),
        transform: Arc::new(SolarReadingCleaning),
        sink: SolarStoreSink::new(store),
    };

    match pipeline.run().await {
        Ok(report) => {
            tracing::info!(
                path = %path.display(),
                rows_read = report.rows_read,
                rows_dropped = report.rows_dropped,
                rows_inserted = report.rows_inserted,
                "solar plant CSV loaded"
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "solar plant CSV load failed");
            Err(e)
        }
    }
}
