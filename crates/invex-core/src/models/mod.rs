//! Data models: page records, the typed invoice view and configuration.

pub mod config;
pub mod invoice;
pub mod record;
