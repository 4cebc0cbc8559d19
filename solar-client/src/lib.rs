pub mod db;
pub mod domain;

pub use db::{DataFilter, DbError};
pub use domain::{NewSolarPlantData, SolarPlantData};
