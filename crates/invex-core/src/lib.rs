//! Core library for fixed-layout vendor invoice extraction.
//!
//! This crate provides:
//! - Page text input (JSON line arrays or form-feed separated text)
//! - A configurable rule table: generic `label: value` pairs, named custom
//!   fields and product line anchors
//! - Per-page record accumulation with last-match-wins field semantics
//! - Value sanitizing into numbers, calendar dates and text
//! - A typed invoice view with decimal amounts

pub mod error;
pub mod invoice;
pub mod models;
pub mod pages;
pub mod sanitize;

pub use error::{ConfigError, ExtractionError, InvexError, Result, SourceError};
pub use invoice::rules::{CustomFieldRule, ProductRule, RuleTable};
pub use invoice::{DocumentReport, ExtractionResult, InvoiceParser, PageOutcome};
pub use models::config::InvexConfig;
pub use models::invoice::{Invoice, Purchase};
pub use models::record::{DateValue, FinalRecord, RawLineItem, RawRecord, Value, ValueMap};
pub use pages::{Document, Page, PageFormat};
pub use sanitize::{resanitize, sanitize_record};
