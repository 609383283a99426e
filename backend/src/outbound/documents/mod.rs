//! Redis document adapter for per-user property records.
//!
//! Implements the domain's `PropertyStore` port over Redis via `bb8-redis`
//! connection pooling. Each property record is stored as one JSON document
//! under a key derived from the caller-supplied user identifier, which gives
//! the port its upsert-by-key semantics for free.

mod redis_property_store;

pub use redis_property_store::RedisPropertyStore;
