pub mod solar_csv_file;

pub use solar_csv_file::{is_na_marker, RawReading, SolarCsvFileSource};
