use std::{fs::File, path::PathBuf};

use csv::StringRecord;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// One CSV record with source column names, before cleaning.
///
/// `timestamp` and `id` are kept as raw text; the cleaning transform decides
/// whether the row survives.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub timestamp: String,
    pub id: String,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub total_cloud_cover: Option<f64>,
    pub dew_point: Option<f64>,
    pub global_radiation: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    pub avg_wind_direction: Option<f64>,
}

/// CSV file source for solar plant weather readings.
///
/// Expected header columns (by name, any order):
/// - TIMESTAMP
/// - ID
/// - TEMP
/// - HUMIDITY
/// - TOTAL_CLOUD_COVER
/// - DEW_POINT
/// - GLOBAL_RADIATION
/// - AVG_WIND_SPEED
/// - AVG_WIND_DIRECTION
pub struct SolarCsvFileSource {
    path: PathBuf,
}

impl SolarCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

const REQUIRED_COLUMNS: [&str; 9] = [
    "TIMESTAMP",
    "ID",
    "TEMP",
    "HUMIDITY",
    "TOTAL_CLOUD_COVER",
    "DEW_POINT",
    "GLOBAL_RADIATION",
    "AVG_WIND_SPEED",
    "AVG_WIND_DIRECTION",
];

/// Cell values read as "missing", matching the usual CSV tooling defaults.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when the (trimmed) cell is empty or one of the NA markers.
pub fn is_na_marker(s: &str) -> bool {
    NA_MARKERS.contains(&s.trim())
}

fn parse_optional_f64(name: &str, s: &str) -> Result<Option<f64>, PipelineError> {
    let trimmed = s.trim();
    if is_na_marker(trimmed) {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| PipelineError::Source(format!("invalid {name} '{trimmed}': {e}")))
}

fn check_headers(headers: &StringRecord) -> Result<(), PipelineError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Source(format!(
            "CSV header is missing column(s): {}",
            missing.join(", ")
        )))
    }
}

fn record_to_raw_reading(record: &StringRecord, headers: &StringRecord) -> Result<RawReading, PipelineError> {
    let get = |name: &str| -> &str {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
    };
    let float = |name: &str| parse_optional_f64(name, get(name));

    Ok(RawReading {
        timestamp: get("TIMESTAMP").trim().to_string(),
        id: get("ID").trim().to_string(),
        temp: float("TEMP")?,
        humidity: float("HUMIDITY")?,
        total_cloud_cover: float("TOTAL_CLOUD_COVER")?,
        dew_point: float("DEW_POINT")?,
        global_radiation: float("GLOBAL_RADIATION")?,
        avg_wind_speed: float("AVG_WIND_SPEED")?,
        avg_wind_direction: float("AVG_WIND_DIRECTION")?,
    })
}

#[async_trait::async_trait]
impl Source<RawReading> for SolarCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<RawReading> {
        // Blocking CSV reader driven from the stream's task.
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = File::open(&path).map_err(|e| {
                PipelineError::Source(format!("failed to open CSV file '{}': {e}", path.display()))
            })?;
            // Short rows are padded with missing values instead of failing the file.
            let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();
            check_headers(&headers)?;

            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record: {e}"
                )))?;

                let reading = match record_to_raw_reading(&record, &headers) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("solar_csv_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };

                metrics::counter!("solar_csv_rows_read_total").increment(1);
                yield Envelope::new(reading);
            }
        };

        Box::pin(s)
    }
}
