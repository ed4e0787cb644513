//! # ztpinv-common
//!
//! Types shared by every crate in the workspace.
//!
//! * **[`config`]**: the explicit run configuration handed to the pipeline.
//! * **[`error`]**: the pipeline error taxonomy.
//! * **[`network`]**: MAC address normalization, IPv4 validation and DHCP pool arithmetic.

pub mod config;
pub mod error;
pub mod network;
