//! Per-domain state tracking
//!
//! This module holds the state records owned by the fetch components, one per
//! domain key, for the lifetime of the process.

mod domain_state;

pub use domain_state::DomainPacingState;
