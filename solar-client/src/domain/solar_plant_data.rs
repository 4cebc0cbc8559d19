use time::PrimitiveDateTime;

#[cfg(feature = "serde")]
time::serde::format_description!(
    iso_timestamp,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);

/// A stored weather reading from the `solar_plant_data` table.
///
/// Float columns are nullable and may hold NaN or infinities when the source
/// file carried them; call [`SolarPlantData::sanitized`] before handing a row
/// to an encoder that cannot represent those values.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolarPlantData {
    pub id: i32,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub cloud_cover_percent: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub global_radiation_w_m2: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    pub avg_wind_direction: Option<f64>,
    #[cfg_attr(feature = "serde", serde(with = "iso_timestamp::option"))]
    pub timestamp: Option<PrimitiveDateTime>,
}

impl SolarPlantData {
    /// Replace every NaN or infinite float with `None`.
    pub fn sanitized(self) -> Self {
        Self {
            temperature_c: finite(self.temperature_c),
            humidity_percent: finite(self.humidity_percent),
            cloud_cover_percent: finite(self.cloud_cover_percent),
            dew_point_c: finite(self.dew_point_c),
            global_radiation_w_m2: finite(self.global_radiation_w_m2),
            avg_wind_speed: finite(self.avg_wind_speed),
            avg_wind_direction: finite(self.avg_wind_direction),
            ..self
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Insert shape for `solar_plant_data`; `id` is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSolarPlantData {
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub cloud_cover_percent: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub global_radiation_w_m2: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    pub avg_wind_direction: Option<f64>,
    pub timestamp: PrimitiveDateTime,
}

impl NewSolarPlantData {
    /// The row as it reads back after insertion under `id`.
    pub fn into_stored(self, id: i32) -> SolarPlantData {
        SolarPlantData {
            id,
            temperature_c: self.temperature_c,
            humidity_percent: self.humidity_percent,
            cloud_cover_percent: self.cloud_cover_percent,
            dew_point_c: self.dew_point_c,
            global_radiation_w_m2: self.global_radiation_w_m2,
            avg_wind_speed: self.avg_wind_speed,
            avg_wind_direction: self.avg_wind_direction,
            timestamp: Some(self.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading() -> SolarPlantData {
        NewSolarPlantData {
            temperature_c: Some(21.5),
            humidity_percent: Some(f64::NAN),
            cloud_cover_percent: Some(f64::INFINITY),
            dew_point_c: Some(f64::NEG_INFINITY),
            global_radiation_w_m2: Some(410.0),
            avg_wind_speed: None,
            avg_wind_direction: Some(180.0),
            timestamp: datetime!(2024-01-15 12:30:00),
        }
        .into_stored(7)
    }

    #[test]
    fn sanitized_nulls_non_finite_floats_only() {
        let row = reading().sanitized();

        assert_eq!(row.id, 7);
        assert_eq!(row.temperature_c, Some(21.5));
        assert_eq!(row.humidity_percent, None);
        assert_eq!(row.cloud_cover_percent, None);
        assert_eq!(row.dew_point_c, None);
        assert_eq!(row.global_radiation_w_m2, Some(410.0));
        assert_eq!(row.avg_wind_speed, None);
        assert_eq!(row.avg_wind_direction, Some(180.0));
        assert_eq!(row.timestamp, Some(datetime!(2024-01-15 12:30:00)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_timestamp_as_iso_and_nulls_as_null() {
        let json = serde_json::to_value(reading().sanitized()).unwrap();

        assert_eq!(json["timestamp"], "2024-01-15T12:30:00");
        assert!(json["humidity_percent"].is_null());
        assert_eq!(json["temperature_c"], 21.5);
    }
}
