//! RPC inbound adapter.
//!
//! The RPC surface keeps the message contracts of the original stub-generated
//! interface (single-candidate add, list, batch delete with proto-style
//! absent-field conventions) while borrowing the HTTP transport plumbing:
//! every method is a POST under the `/rpc` scope carrying JSON messages.

pub mod users;
