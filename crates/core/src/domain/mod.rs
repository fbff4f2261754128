pub mod dataset;
pub mod demographics;
pub mod district;
pub mod features;
pub mod scheme;
pub mod series;
