//! Outbound adapters implementing the domain's store ports.

pub mod documents;
pub mod persistence;
