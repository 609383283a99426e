//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. The `diesel print-schema` command can regenerate them from a
//! live database when migrations change.

diesel::table! {
    /// Registered users.
    ///
    /// `name` and `email` carry unique constraints; `id` is assigned by a
    /// sequence starting at 1.
    users (id) {
        /// Primary key: server-assigned sequential identifier.
        id -> BigInt,
        /// Registered name, unique across all users.
        name -> Varchar,
        /// Contact email, unique across all users.
        email -> Varchar,
        /// Calendar date of birth.
        birthdate -> Date,
    }
}
