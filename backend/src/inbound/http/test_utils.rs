//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::ports::{InMemoryPropertyStore, InMemoryUserStore};
use crate::domain::{NewUser, RegistryService};

use super::state::HttpState;

/// Fresh state backed by in-memory stores.
pub(crate) fn test_state() -> HttpState {
    HttpState::new(
        Arc::new(RegistryService::new(Arc::new(InMemoryUserStore::new()))),
        Arc::new(InMemoryPropertyStore::new()),
    )
}

pub(crate) fn candidate(name: &str, email: &str) -> NewUser {
    NewUser::try_from_parts(
        name,
        email,
        NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
    )
    .expect("valid candidate")
}

/// Seed the canonical two-user fixture: Alice Smith (id 1), Bob Johnson (id 2).
pub(crate) async fn seed_alice_and_bob(state: &HttpState) {
    let outcome = state
        .registry
        .add_users(vec![
            candidate("Alice Smith", "alice@example.com"),
            candidate("Bob Johnson", "bob@example.com"),
        ])
        .await
        .expect("seed batch runs");
    assert!(outcome.failed().is_empty(), "seed must not conflict");
}
