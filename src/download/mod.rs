pub mod error;
pub mod nasa_power;
