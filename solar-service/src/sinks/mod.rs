pub mod store;

pub use store::SolarStoreSink;
