//! `clima` - NASA POWER daily climate data downloader
//!
//! Pick a coordinate and a period, fetch the daily series from NASA POWER,
//! look at the table and download it as an Excel workbook together with a
//! sheet describing each variable.

pub mod config;
pub mod error;
pub mod export;
pub mod location_resolver;
pub mod models;
pub mod power;
pub mod session;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::ClimaConfig;
pub use error::ClimaError;
pub use export::{ExportedWorkbook, export_workbook};
pub use location_resolver::{LocationResolver, NetworkLocator};
pub use models::{ClimateRecord, ClimateVariable, Coordinate, DateRange, VariableDescription};
pub use power::{ClimateSource, PowerClient};
pub use session::{Session, SessionController, SessionState, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimaError>;
