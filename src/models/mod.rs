pub mod result;
pub mod series;
pub mod ticker;
