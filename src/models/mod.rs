//! Data models for the clima application
//!
//! - Location: the queried coordinate
//! - Climate: daily records and the fixed variable set
//! - DateRange: the requested period and its bounds
//! - Catalog: variable descriptions exported next to the data

pub mod catalog;
pub mod climate;
pub mod date_range;
pub mod location;

pub use catalog::{VariableDescription, build_catalog};
pub use climate::{ClimateRecord, ClimateVariable, DATE_KEY_FORMAT};
pub use date_range::DateRange;
pub use location::Coordinate;
