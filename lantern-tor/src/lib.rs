//! Lantern Tor Layer
//!
//! Provides Tor-based networking and the crawl engine:
//! - SOCKS5h proxy client (DNS resolution via Tor)
//! - Single-attempt page fetches with classified outcomes
//! - HTML title and same-origin link extraction
//! - Bounded-depth breadth-first crawl with robots and common-path probes

pub mod crawl;
pub mod extract;
pub mod fetch;
pub mod proxy;

pub use crawl::*;
pub use extract::*;
pub use fetch::*;
pub use proxy::*;
