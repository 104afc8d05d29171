//! # Orphan Links
//!
//! Finds orphaned documents (published pages no other page links to) and
//! suggests sentences in other documents where a link to them would fit.
//!
//! The analysis itself lives in `orphan-links-core`. This crate supplies the
//! SQLite storage, the `olm` CLI, and the JSON HTTP API around it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ olm import  │──▶│   SQLite     │◀──│ orphan-links-core│
//! │ (JSON docs) │   │ documents +  │   │ scan / suggest / │
//! └─────────────┘   │ link state   │   │ report           │
//!                   └──────┬───────┘   └──────────────────┘
//!                          │
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!           ┌──────────┐       ┌──────────┐
//!           │   CLI    │       │   HTTP   │
//!           │  (olm)   │       │  (axum)  │
//!           └──────────┘       └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of both storage ports |
//! | [`app`] | Service construction over the SQLite store |
//! | [`import`] | JSON document import |
//! | [`progress`] | Scan progress on stderr |
//! | [`scan`] | `olm scan` |
//! | [`suggest`] | `olm suggest`, `olm suggestions`, `olm review` |
//! | [`orphans`] | `olm orphans`, `olm report` |
//! | [`server`] | JSON HTTP API |

pub mod app;
pub mod config;
pub mod db;
pub mod import;
pub mod migrate;
pub mod orphans;
pub mod progress;
pub mod scan;
pub mod server;
pub mod sqlite_store;
pub mod suggest;
