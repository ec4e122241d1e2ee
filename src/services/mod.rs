//! Services
//!
//! Business logic of the relay.

pub mod remote;
