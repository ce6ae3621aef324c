//! Lantern Core - Domain model for hidden-service reconnaissance
//!
//! This crate provides the foundational primitives:
//! - Scan targets and URL canonicalization
//! - Structured findings emitted by the crawl engine
//! - Persisted scanner settings (proxy endpoints, timeout, probe paths)

pub mod findings;
pub mod settings;
pub mod target;

pub use findings::*;
pub use settings::*;
pub use target::*;
