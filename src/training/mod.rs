pub mod dataset;
pub mod derive;
pub mod error;
pub mod trainer;
