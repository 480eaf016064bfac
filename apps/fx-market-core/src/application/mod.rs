//! Application Layer - Port definitions.
//!
//! The interfaces the domain and the stream client depend on, so the
//! clock, socket and token endpoint can be swapped for test doubles.

/// Port interfaces for external systems (clock, socket, token endpoint).
pub mod ports;
