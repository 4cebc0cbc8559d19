use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::db::{DataFilter, DbError};
use crate::domain::{NewSolarPlantData, SolarPlantData};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        temperature_c,
        humidity_percent,
        cloud_cover_percent,
        dew_point_c,
        global_radiation_w_m2,
        avg_wind_speed,
        avg_wind_direction,
        "timestamp"
    FROM solar_plant_data"#;

/// Create `solar_plant_data` if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS solar_plant_data (
            id                    SERIAL PRIMARY KEY,
            temperature_c         DOUBLE PRECISION,
            humidity_percent      DOUBLE PRECISION,
            cloud_cover_percent   DOUBLE PRECISION,
            dew_point_c           DOUBLE PRECISION,
            global_radiation_w_m2 DOUBLE PRECISION,
            avg_wind_speed        DOUBLE PRECISION,
            avg_wind_direction    DOUBLE PRECISION,
            "timestamp"           TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Every stored row, ordered by id.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<SolarPlantData>, DbError> {
    fetch_filtered(pool, &DataFilter::default()).await
}

pub async fn fetch_by_id(pool: &PgPool, id: i32) -> Result<Option<SolarPlantData>, DbError> {
    let row = sqlx::query_as::<_, SolarPlantData>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Rows matching every constraint in `filter`, ordered by id.
pub async fn fetch_filtered(
    pool: &PgPool,
    filter: &DataFilter,
) -> Result<Vec<SolarPlantData>, DbError> {
    let mut builder = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
    filter.push_where(&mut builder);
    builder.push(" ORDER BY id");

    let rows = builder
        .build_query_as::<SolarPlantData>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn count_rows(pool: &PgPool) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM solar_plant_data")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Multi-row insert on `conn`, typically an open transaction.
///
/// Returns the number of rows written.
pub async fn insert_batch(
    conn: &mut PgConnection,
    batch: &[NewSolarPlantData],
) -> Result<u64, DbError> {
    if batch.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        r#"INSERT INTO solar_plant_data (temperature_c, humidity_percent, cloud_cover_percent, dew_point_c, global_radiation_w_m2, avg_wind_speed, avg_wind_direction, "timestamp") "#,
    );

    builder.push_values(batch, |mut b, r| {
        b.push_bind(r.temperature_c)
            .push_bind(r.humidity_percent)
            .push_bind(r.cloud_cover_percent)
            .push_bind(r.dew_point_c)
            .push_bind(r.global_radiation_w_m2)
            .push_bind(r.avg_wind_speed)
            .push_bind(r.avg_wind_direction)
            .push_bind(r.timestamp);
    });

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
