use crate::pipeline::{Envelope, PipelineError, Transform};
use crate::sources::{is_na_marker, RawReading};
use solar_client::domain::NewSolarPlantData;
use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
};

const DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
    format_description!("[year]/[month]/[day] [hour]:[minute]"),
];

/// Coerce a source timestamp; anything unrecognised yields `None`.
///
/// Zoned RFC 3339 values are shifted to UTC and stored without the zone. A
/// bare `YYYY-MM-DD` means midnight.
pub fn coerce_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = ts.to_offset(UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }

    if let Some(ts) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(raw, *fmt).ok())
    {
        return Some(ts);
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
}

/// Clean one raw CSV row.
///
/// Rules:
/// - the timestamp must coerce to a date-time;
/// - the source `ID` must be present (not empty and not an NA marker).
///
/// Rows breaking either rule are dropped (`None`); survivors get their columns
/// renamed to the storage names.
pub fn clean_reading(raw: RawReading) -> Option<NewSolarPlantData> {
    if is_na_marker(&raw.id) {
        return None;
    }
    let timestamp = coerce_timestamp(&raw.timestamp)?;

    Some(NewSolarPlantData {
        temperature_c: raw.temp,
        humidity_percent: raw.humidity,
        cloud_cover_percent: raw.total_cloud_cover,
        dew_point_c: raw.dew_point,
        global_radiation_w_m2: raw.global_radiation,
        avg_wind_speed: raw.avg_wind_speed,
        avg_wind_direction: raw.avg_wind_direction,
        timestamp,
    })
}

#[derive(Clone, Default)]
pub struct SolarReadingCleaning;

#[async_trait::async_trait]
impl Transform<RawReading, NewSolarPlantData> for SolarReadingCleaning {
    async fn apply(
        &self,
        input: Envelope<RawReading>,
    ) -> Result<Option<Envelope<NewSolarPlantData>>, PipelineError> {
        let received_at = input.received_at;
        match clean_reading(input.payload) {
            Some(payload) => Ok(Some(Envelope { payload, received_at })),
            None => {
                metrics::counter!("solar_csv_rows_dropped_total").increment(1);
                Ok(None)
            }
        }
    }
}
