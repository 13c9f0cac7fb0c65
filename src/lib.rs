// Numbers API - Core Library
// Integer → English words, plus the record store and API built around it

pub mod words;       // Number → English words converter
pub mod validation;  // Boundary validation for incoming numbers
pub mod db;          // Conversion records + audit trail (SQLite)
pub mod config;      // Environment configuration + logging setup

#[cfg(feature = "server")]
pub mod api;         // REST API (Axum)

// Re-export commonly used types
pub use words::{convert, convert_value, Band, ConversionError, MAX_MAGNITUDE};
pub use validation::{parse_input_number, validate_input_number, ValidationError};
pub use db::{
    Conversion, Event, ImportRow, ImportSummary,
    setup_database, create_conversion, get_all_conversions, get_conversion,
    delete_conversion, count_conversions, insert_event, get_events_for_entity,
    load_csv, import_numbers,
};
pub use config::{AppConfig, init_logging};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
