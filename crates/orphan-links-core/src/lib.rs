//! # Orphan Links Core
//!
//! Storage-agnostic analysis pipeline for Orphan Links: orphan detection
//! by inbound-link counting, keyword extraction, sentence relevance scoring,
//! and ranked internal-link suggestions.
//!
//! This crate contains no sqlx, filesystem I/O, or HTTP. The host content
//! system and persistence are reached through the ports in [`store`].
//!
//! ## Pipeline
//!
//! ```text
//! ContentSource ──▶ OrphanScanner ──▶ LinkRepository (page records)
//!       │
//!       └──▶ SuggestionEngine ──▶ keywords ─▶ segment ─▶ relevance (phrase)
//!                    │
//!                    └──▶ LinkRepository (suggestion sets)
//! ```

pub mod engine;
pub mod error;
pub mod keywords;
pub mod links;
pub mod models;
pub mod orphans;
pub mod phrase;
pub mod relevance;
pub mod scanner;
pub mod segment;
pub mod service;
pub mod settings;
pub mod store;

pub use error::AnalysisError;
pub use service::LinkService;
pub use settings::AnalysisSettings;
