//! # ztpinv-core
//!
//! The lease-ingestion → vendor-classification → inventory-emission pipeline.
//!
//! * **[`lease`]**: schema resolution, parsing and per-device resolution of lease sources.
//! * **[`vendors`]**: the layered vendor classifier and its OUI tables.
//! * **[`inventory`]**: grouping and atomic rendering of the inventory artifact.
//! * **[`pipeline`]**: the orchestrator tying the stages together, with bounded retries.
//! * **[`ztp`]**: profile assignment for the most recently leased device.
//! * **[`query`]**: read-only views of the artifacts for the HTTP surface.

pub mod inventory;
pub mod lease;
pub mod pipeline;
pub mod query;
pub mod vendors;
pub mod ztp;
