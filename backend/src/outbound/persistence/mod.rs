//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the domain's `UserStore` port over PostgreSQL via the Diesel
//! ORM with async support through `diesel-async` and `bb8` connection
//! pooling. The adapter only translates between Diesel rows and domain
//! types; no registry logic lives here. Row structs and the schema
//! definition are internal implementation details, never exposed to the
//! domain layer.

mod diesel_user_store;
mod models;
mod pool;
mod schema;

pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
