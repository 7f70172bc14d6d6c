pub mod catalog;
pub mod climate;
pub mod observation;
pub mod prediction;
