//! Module organisation for transport integration tests.
//!
//! Splits tests by concern:
//! - `interleaving`: fragments of several messages arriving mixed together
//! - `rejection`: malformed, unexpected and excess fragments
//! - `eviction`: aborted sends and reassembly timeouts

pub mod eviction;
pub mod interleaving;
pub mod rejection;
