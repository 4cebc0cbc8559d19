pub mod error;

use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use solar_client::{DataFilter, SolarPlantData};
use time::{macros::format_description, Date, PrimitiveDateTime, Time};

pub use error::ApiError;

use crate::{ingest::ingest_csv_file, store::SolarStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SolarStore>,
    /// Server-local file read by `POST /load-data`.
    pub csv_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn SolarStore>, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            csv_path: Arc::new(csv_path.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/load-data", post(load_data))
        .route("/data", get(get_filtered_data))
        .route("/data/:id", get(get_data_by_id))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DataParams {
    pub id: Option<i32>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}

/// Parse a `YYYY-MM-DD` query value into midnight of that day. Month and day
/// may be given without zero padding (`2024-1-5`).
///
/// Absent and empty values mean "no bound".
fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<PrimitiveDateTime>, ApiError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    Date::parse(value, format_description!("[year]-[month padding:none]-[day padding:none]"))
        .map(|d| Some(PrimitiveDateTime::new(d, Time::MIDNIGHT)))
        .map_err(|_| ApiError::BadRequest(format!("Invalid {name} format. Use YYYY-MM-DD.")))
}

impl DataParams {
    pub fn to_filter(&self) -> Result<DataFilter, ApiError> {
        let mut filter = DataFilter::default();

        if let Some(id) = self.id {
            filter = filter.with_id(id);
        }
        if let Some(start) = parse_date_param("start_timestamp", self.start_timestamp.as_deref())? {
            filter = filter.from(start);
        }
        if let Some(end) = parse_date_param("end_timestamp", self.end_timestamp.as_deref())? {
            filter = filter.until(end);
        }

        Ok(filter)
    }
}

async fn load_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    ingest_csv_file(state.store.clone(), &state.csv_path).await?;

    Ok(Json(json!({
        "message": "Data cleaned and loaded into the database successfully"
    })))
}

async fn get_filtered_data(
    State(state): State<AppState>,
    params: Result<Query<DataParams>, QueryRejection>,
) -> Result<Json<Vec<SolarPlantData>>, ApiError> {
    metrics::counter!("http_data_requests_total").increment(1);

    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let filter = params.to_filter()?;

    let rows = state.store.find(&filter).await?;
    if rows.is_empty() {
        metrics::counter!("http_data_not_found_total").increment(1);
        return Err(ApiError::NotFound("No data found for the given filters".to_string()));
    }

    tracing::info!(rows = rows.len(), ?filter, "served solar plant data");
    Ok(Json(rows.into_iter().map(SolarPlantData::sanitized).collect()))
}

async fn get_data_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SolarPlantData>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match state.store.get(id).await? {
        Some(row) => Ok(Json(row.sanitized())),
        None => Err(ApiError::NotFound(format!("No data found for id {id}"))),
    }
}
