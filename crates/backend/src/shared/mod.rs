pub mod config;
pub mod data;
pub mod dynamic_fields;
pub mod format;
