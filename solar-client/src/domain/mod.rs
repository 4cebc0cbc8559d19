pub mod solar_plant_data;

pub use solar_plant_data::{NewSolarPlantData, SolarPlantData};
