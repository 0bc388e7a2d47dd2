//! Girder - dependency verification and risk analysis for infrastructure graphs.
//!
//! This crate answers three questions about resources in a directed
//! dependency graph:
//!
//! - **What breaks if this fails?** — blast radius, SPOF detection, and
//!   cascading-failure modeling ([`analyzer`], [`cascade`])
//! - **What does this depend on, and how risky is that?** — composite risk
//!   and dependency-health scoring ([`risk`], [`analyzer`])
//! - **Is a claimed dependency real?** — multi-source evidence aggregation
//!   into a confidence score ([`verify`])
//!
//! The engine consumes a graph through the [`graph::GraphAccess`] port and
//! optional evidence sources through the `girder-evidence` provider port;
//! it owns no storage and issues no writes beyond the idempotent edge
//! confirmation performed after a successful verification.

#![forbid(unsafe_code)]

pub mod analyzer;
pub mod cascade;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod risk;
pub mod verify;

pub use error::{Error, Result};
