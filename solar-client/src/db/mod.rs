pub mod filter;
pub mod solar_plant_queries;

pub use filter::DataFilter;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
